//! Report request/response models

use qg_core::{MetricField, Submission, Verdict};
use serde::{Deserialize, Serialize};

pub const SAVED_MESSAGE: &str = "Report saved successfully!";

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReportResponse {
    pub message: String,
    pub id: i64,
    pub result: Verdict,
    pub total_ok: usize,
    pub failing: Vec<MetricField>,
}

impl From<Submission> for SubmitReportResponse {
    fn from(submission: Submission) -> Self {
        Self {
            message: SAVED_MESSAGE.to_string(),
            id: submission.id,
            result: submission.evaluation.verdict,
            total_ok: submission.evaluation.total_ok,
            failing: submission.evaluation.failing,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub format: Option<String>,
}
