//! Quality Gate Core
//!
//! This crate scores code inspection reports into a PASS/FAIL verdict and
//! keeps an append-only, per-user history of them in SQLite.

pub mod report;
pub mod scoring;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use report::{MetricField, Report, ReportRow, Verdict};
pub use scoring::{evaluate, Evaluation, Rating, REQUIRED_OK};
pub use store::{ReportStore, StoreConfig};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Storage(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Result of a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub evaluation: Evaluation,
}

impl Submission {
    pub fn verdict(&self) -> Verdict {
        self.evaluation.verdict
    }
}

/// Submission and history entry point
#[derive(Debug, Clone)]
pub struct QualityGate {
    store: ReportStore,
}

impl QualityGate {
    pub fn new(store: ReportStore) -> Self {
        Self { store }
    }

    /// Opens the store described by `config` and makes sure its table exists
    pub async fn open(config: &StoreConfig) -> CoreResult<Self> {
        let store = ReportStore::open(config).await?;
        store.initialize().await?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Validates, scores and persists a report
    pub async fn submit(&self, report: &Report) -> CoreResult<Submission> {
        validate(report)?;

        let evaluation = evaluate(report);
        debug!(total_ok = evaluation.total_ok, "scored report");

        let id = self.store.submit_report(report, evaluation.verdict).await?;
        info!(
            id,
            user = %report.user,
            project = %report.project,
            verdict = %evaluation.verdict,
            total_ok = evaluation.total_ok,
            "report saved"
        );

        Ok(Submission { id, evaluation })
    }

    /// Stored reports for `user`, oldest first
    pub async fn history(&self, user: &str) -> CoreResult<Vec<ReportRow>> {
        self.store.list_reports(user).await
    }
}

fn validate(report: &Report) -> CoreResult<()> {
    if report.user.trim().is_empty() {
        return Err(CoreError::InvalidReport("user must not be empty".to_string()));
    }
    Ok(())
}
