//! HTML history page

use qg_core::ReportRow;
use std::fmt::Write;

const COLUMNS: [&str; 9] = [
    "Project",
    "New Reliability Rating",
    "New Security Rating",
    "New Maintainability Rating",
    "Bugs",
    "Code Smells",
    "Critical Violations",
    "Uncovered Lines",
    "Result",
];

/// Escapes text for use in element content and quoted attributes
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a user's report history as a table, one row per report
pub fn render_history(user: &str, rows: &[ReportRow]) -> String {
    let user = escape_html(user);
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<html>
  <head>
    <title>Report for {user}</title>
    <link href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css" rel="stylesheet">
  </head>
  <body>
    <div class="container mx-auto">
      <h2 class="text-2xl mb-4">Report for {user}</h2>
      <table class="table-auto w-full">
        <thead>
          <tr>
"#
    );
    for column in COLUMNS {
        let _ = writeln!(html, r#"            <th class="px-4 py-2">{}</th>"#, column);
    }
    html.push_str("          </tr>\n        </thead>\n        <tbody>\n");

    for row in rows {
        html.push_str("          <tr>\n");
        let result = row.result.as_str();
        let cells = [
            row.project.as_str(),
            row.new_reliability_rating.as_str(),
            row.new_security_rating.as_str(),
            row.new_maintainability_rating.as_str(),
            row.bugs.as_str(),
            row.code_smells.as_str(),
            row.critical_violations.as_str(),
            row.uncovered_lines.as_str(),
            result,
        ];
        for cell in cells {
            let _ = writeln!(
                html,
                r#"            <td class="border px-4 py-2">{}</td>"#,
                escape_html(cell)
            );
        }
        html.push_str("          </tr>\n");
    }

    html.push_str("        </tbody>\n      </table>\n    </div>\n  </body>\n</html>\n");
    html
}
