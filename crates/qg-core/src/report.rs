//! Report model

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A submitted code inspection report for one user/project pair.
///
/// Every field is opaque text taken verbatim from the submitter. Fields
/// missing from a JSON payload, or sent as `null`, deserialize as empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    #[serde(deserialize_with = "null_as_empty")]
    pub user: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub project: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub new_reliability_rating: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub new_security_rating: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub new_maintainability_rating: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub bugs: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub code_smells: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub critical_violations: String,
    /// Informational only, never scored
    #[serde(deserialize_with = "null_as_empty")]
    pub uncovered_lines: String,
}

/// JSON `null` is treated like a missing field
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Report {
    /// Value of a scored metric field
    pub fn metric(&self, field: MetricField) -> &str {
        match field {
            MetricField::NewReliabilityRating => &self.new_reliability_rating,
            MetricField::NewSecurityRating => &self.new_security_rating,
            MetricField::NewMaintainabilityRating => &self.new_maintainability_rating,
            MetricField::Bugs => &self.bugs,
            MetricField::CodeSmells => &self.code_smells,
            MetricField::CriticalViolations => &self.critical_violations,
        }
    }
}

/// The six report fields that take part in scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    NewReliabilityRating,
    NewSecurityRating,
    NewMaintainabilityRating,
    Bugs,
    CodeSmells,
    CriticalViolations,
}

impl MetricField {
    pub const ALL: [MetricField; 6] = [
        MetricField::NewReliabilityRating,
        MetricField::NewSecurityRating,
        MetricField::NewMaintainabilityRating,
        MetricField::Bugs,
        MetricField::CodeSmells,
        MetricField::CriticalViolations,
    ];

    /// Column / JSON key for this field
    pub fn name(&self) -> &'static str {
        match self {
            MetricField::NewReliabilityRating => "new_reliability_rating",
            MetricField::NewSecurityRating => "new_security_rating",
            MetricField::NewMaintainabilityRating => "new_maintainability_rating",
            MetricField::Bugs => "bugs",
            MetricField::CodeSmells => "code_smells",
            MetricField::CriticalViolations => "critical_violations",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gate outcome, stored as `PASS` / `FAIL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown verdict: {0:?}")]
pub struct UnknownVerdict(pub String);

impl FromStr for Verdict {
    type Err = UnknownVerdict;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(Verdict::Pass),
            "FAIL" => Ok(Verdict::Fail),
            other => Err(UnknownVerdict(other.to_string())),
        }
    }
}

impl TryFrom<String> for Verdict {
    type Error = UnknownVerdict;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One stored report as returned by a per-user listing.
///
/// The row id and the `user` column are not echoed back.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ReportRow {
    pub project: String,
    pub new_reliability_rating: String,
    pub new_security_rating: String,
    pub new_maintainability_rating: String,
    pub bugs: String,
    pub code_smells: String,
    pub critical_violations: String,
    pub uncovered_lines: String,
    #[sqlx(try_from = "String")]
    pub result: Verdict,
}
