//! SQLite report store

use crate::report::{Report, ReportRow, Verdict};
use crate::CoreResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub use sqlx::Error as StorageError;

const CREATE_REPORTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user TEXT,
    project TEXT,
    new_reliability_rating TEXT,
    new_security_rating TEXT,
    new_maintainability_rating TEXT,
    bugs TEXT,
    code_smells TEXT,
    critical_violations TEXT,
    uncovered_lines TEXT,
    result TEXT
)
"#;

const CREATE_USER_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_reports_user ON reports (user)";

const INSERT_REPORT: &str = r#"
INSERT INTO reports (
    user, project, new_reliability_rating, new_security_rating,
    new_maintainability_rating, bugs, code_smells,
    critical_violations, uncovered_lines, result
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_BY_USER: &str = r#"
SELECT project, new_reliability_rating, new_security_rating,
       new_maintainability_rating, bugs, code_smells,
       critical_violations, uncovered_lines, result
FROM reports
WHERE user = ?
ORDER BY id ASC
"#;

/// Store location and pool sizing
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the database file, created if absent
    pub data_dir: PathBuf,
    /// Database file name inside `data_dir`
    pub file_name: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a caller waits for a free connection before erroring
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./database"),
            file_name: "database.sqlite".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Append-only report storage backed by a bounded connection pool
#[derive(Debug, Clone)]
pub struct ReportStore {
    pool: SqlitePool,
}

impl ReportStore {
    /// Creates the data directory if needed and connects to the database
    /// file, creating the file on first use. Does not create the table;
    /// call [`ReportStore::initialize`] for that.
    pub async fn open(config: &StoreConfig) -> CoreResult<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        let path = config.database_path();
        let store = Self::connect(&path, config.max_connections, config.acquire_timeout).await?;
        info!("Opened report database at {}", path.display());
        Ok(store)
    }

    pub async fn connect(
        path: &Path,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> CoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Ensures the reports table exists. Safe to call on every start.
    pub async fn initialize(&self) -> CoreResult<()> {
        sqlx::query(CREATE_REPORTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_USER_INDEX).execute(&self.pool).await?;
        debug!("reports table ready");
        Ok(())
    }

    /// Appends one report with its verdict and returns the new row id
    pub async fn submit_report(&self, report: &Report, verdict: Verdict) -> CoreResult<i64> {
        let done = sqlx::query(INSERT_REPORT)
            .bind(&report.user)
            .bind(&report.project)
            .bind(&report.new_reliability_rating)
            .bind(&report.new_security_rating)
            .bind(&report.new_maintainability_rating)
            .bind(&report.bugs)
            .bind(&report.code_smells)
            .bind(&report.critical_violations)
            .bind(&report.uncovered_lines)
            .bind(verdict.as_str())
            .execute(&self.pool)
            .await?;

        Ok(done.last_insert_rowid())
    }

    /// All reports for `user` in insertion order; empty when none match
    pub async fn list_reports(&self, user: &str) -> CoreResult<Vec<ReportRow>> {
        let rows = sqlx::query_as::<_, ReportRow>(SELECT_BY_USER)
            .bind(user)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Waits for checked-out connections and closes the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report(user: &str, project: &str, bugs: &str) -> Report {
        Report {
            user: user.to_string(),
            project: project.to_string(),
            new_reliability_rating: "OK".to_string(),
            new_security_rating: "OK".to_string(),
            new_maintainability_rating: "OK".to_string(),
            bugs: bugs.to_string(),
            code_smells: "OK".to_string(),
            critical_violations: "OK".to_string(),
            uncovered_lines: "12".to_string(),
        }
    }

    async fn open_store(dir: &TempDir) -> ReportStore {
        let store = ReportStore::open(&StoreConfig::new(dir.path().join("database")))
            .await
            .unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_open_creates_data_dir_and_file() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("nested").join("database"));
        let store = ReportStore::open(&config).await.unwrap();
        store.initialize().await.unwrap();

        assert!(config.data_dir.is_dir());
        assert!(config.database_path().is_file());
        store.close().await;
    }

    #[tokio::test]
    async fn test_round_trip_keeps_stored_verdict() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        // stored verdict is echoed as-is even though the fields would pass
        let submitted = report("alice", "p1", "OK");
        store.submit_report(&submitted, Verdict::Fail).await.unwrap();

        let rows = store.list_reports("alice").await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.project, "p1");
        assert_eq!(row.new_reliability_rating, "OK");
        assert_eq!(row.new_security_rating, "OK");
        assert_eq!(row.new_maintainability_rating, "OK");
        assert_eq!(row.bugs, "OK");
        assert_eq!(row.code_smells, "OK");
        assert_eq!(row.critical_violations, "OK");
        assert_eq!(row.uncovered_lines, "12");
        assert_eq!(row.result, Verdict::Fail);
    }

    #[tokio::test]
    async fn test_listing_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let mut ids = Vec::new();
        for i in 0..5 {
            let id = store
                .submit_report(&report("bob", &format!("proj-{}", i), "OK"), Verdict::Pass)
                .await
                .unwrap();
            ids.push(id);
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let projects: Vec<String> = store
            .list_reports("bob")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.project)
            .collect();
        assert_eq!(projects, vec!["proj-0", "proj-1", "proj-2", "proj-3", "proj-4"]);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.submit_report(&report("a", "pa", "OK"), Verdict::Pass).await.unwrap();
        store.submit_report(&report("b", "pb", "OK"), Verdict::Pass).await.unwrap();

        let rows = store.list_reports("b").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].project, "pb");
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        assert!(store.list_reports("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hostile_values_are_bound_not_interpolated() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let hostile = "x'); DROP TABLE reports; --";
        store
            .submit_report(&report(hostile, hostile, hostile), Verdict::Fail)
            .await
            .unwrap();

        let rows = store.list_reports(hostile).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bugs, hostile);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_across_reopen() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("database"));

        let store = ReportStore::open(&config).await.unwrap();
        store.initialize().await.unwrap();
        store.submit_report(&report("carol", "p", "OK"), Verdict::Pass).await.unwrap();
        store.initialize().await.unwrap();
        store.close().await;

        let reopened = ReportStore::open(&config).await.unwrap();
        reopened.initialize().await.unwrap();
        let rows = reopened.list_reports("carol").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result, Verdict::Pass);
    }

    #[tokio::test]
    async fn test_insert_without_table_surfaces_error() {
        let dir = TempDir::new().unwrap();
        let store = ReportStore::open(&StoreConfig::new(dir.path())).await.unwrap();

        let err = store
            .submit_report(&report("dave", "p", "OK"), Verdict::Pass)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::CoreError::Storage(_)));
        assert!(err.to_string().contains("reports"));
    }
}
