//! Quality gate scoring
//!
//! A report passes the gate when all six metric fields carry the rating
//! `OK`. The comparison is an exact, case-sensitive string equality on the
//! submitted value. Older deployments compared the file-extension suffix
//! of each value against `OK` instead; that check is not reproduced here,
//! so `"OK"` is accepted and values such as `"main.OK"` are not.

use crate::report::{MetricField, Report, Verdict};
use serde::{Deserialize, Serialize};

/// Number of metric fields that must be `OK` for a report to pass
pub const REQUIRED_OK: usize = 6;

/// Parsed form of a single metric value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rating {
    Ok,
    Unrecognized(String),
}

impl Rating {
    pub fn parse(raw: &str) -> Self {
        if raw == "OK" {
            Rating::Ok
        } else {
            Rating::Unrecognized(raw.to_string())
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Rating::Ok)
    }
}

/// Outcome of scoring one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub total_ok: usize,
    /// Metric fields that were not `OK`, in field order
    pub failing: Vec<MetricField>,
}

/// Scores the metric fields of a report
pub fn evaluate(report: &Report) -> Evaluation {
    let mut total_ok = 0;
    let mut failing = Vec::new();

    for field in MetricField::ALL {
        if Rating::parse(report.metric(field)).is_ok() {
            total_ok += 1;
        } else {
            failing.push(field);
        }
    }

    let verdict = if total_ok >= REQUIRED_OK {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    Evaluation {
        verdict,
        total_ok,
        failing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_ok() -> Report {
        Report {
            user: "alice".to_string(),
            project: "p1".to_string(),
            new_reliability_rating: "OK".to_string(),
            new_security_rating: "OK".to_string(),
            new_maintainability_rating: "OK".to_string(),
            bugs: "OK".to_string(),
            code_smells: "OK".to_string(),
            critical_violations: "OK".to_string(),
            uncovered_lines: "3%".to_string(),
        }
    }

    fn set(report: &mut Report, field: MetricField, value: &str) {
        let slot = match field {
            MetricField::NewReliabilityRating => &mut report.new_reliability_rating,
            MetricField::NewSecurityRating => &mut report.new_security_rating,
            MetricField::NewMaintainabilityRating => &mut report.new_maintainability_rating,
            MetricField::Bugs => &mut report.bugs,
            MetricField::CodeSmells => &mut report.code_smells,
            MetricField::CriticalViolations => &mut report.critical_violations,
        };
        *slot = value.to_string();
    }

    #[test]
    fn test_all_ok_passes() {
        let eval = evaluate(&all_ok());
        assert_eq!(eval.verdict, Verdict::Pass);
        assert_eq!(eval.total_ok, 6);
        assert!(eval.failing.is_empty());
    }

    #[test]
    fn test_any_single_failure_fails() {
        for field in MetricField::ALL {
            let mut report = all_ok();
            set(&mut report, field, "WARN");
            let eval = evaluate(&report);
            assert_eq!(eval.verdict, Verdict::Fail, "{} should fail the gate", field);
            assert_eq!(eval.total_ok, 5);
            assert_eq!(eval.failing, vec![field]);
        }
    }

    #[test]
    fn test_uncovered_lines_is_not_scored() {
        for value in ["", "OK", "100%", "WARN", "x.OK"] {
            let mut report = all_ok();
            report.uncovered_lines = value.to_string();
            assert_eq!(evaluate(&report).verdict, Verdict::Pass);

            report.bugs = "ERROR".to_string();
            assert_eq!(evaluate(&report).verdict, Verdict::Fail);
        }
    }

    #[test]
    fn test_ok_is_exact_equality() {
        assert!(Rating::parse("OK").is_ok());
        // legacy suffix matching is not honoured
        assert!(!Rating::parse("main.OK").is_ok());
        assert!(!Rating::parse(".OK").is_ok());
        assert!(!Rating::parse("ok").is_ok());
        assert!(!Rating::parse(" OK").is_ok());
        assert_eq!(Rating::parse(""), Rating::Unrecognized(String::new()));

        let mut report = all_ok();
        report.bugs = "report.OK".to_string();
        assert_eq!(evaluate(&report).verdict, Verdict::Fail);
    }

    #[test]
    fn test_empty_report_fails() {
        let eval = evaluate(&Report::default());
        assert_eq!(eval.verdict, Verdict::Fail);
        assert_eq!(eval.total_ok, 0);
        assert_eq!(eval.failing.len(), 6);
    }
}
