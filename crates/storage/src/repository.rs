//! Repository Implementation

use crate::record::{ClassificationRecord, NewClassification};
use crate::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS classification_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp_ms INTEGER NOT NULL,
    filename TEXT,
    is_sample_data INTEGER NOT NULL DEFAULT 0,
    classification TEXT NOT NULL,
    confidence REAL NOT NULL,
    notes TEXT
)";

const SELECT_COLUMNS: &str = "SELECT id, timestamp_ms, filename, is_sample_data, classification, confidence, notes
    FROM classification_results
    ORDER BY timestamp_ms DESC, id DESC";

/// Retry policy for connecting and reading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts before giving up
    pub max_attempts: u32,
    /// Pause between attempts (ms)
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

/// Classification history repository backed by SQLite
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl Repository {
    /// Connect to a database URL, creating the file and schema if missing
    pub async fn connect(url: &str, retry: RetryPolicy) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = with_retry(&retry, "connect", || {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options.clone())
        })
        .await?;

        let repo = Self { pool, retry };
        repo.create_schema().await?;
        info!("Connected classification repository at {}", url);
        Ok(repo)
    }

    /// Private in-memory database, kept on a single long-lived connection
    pub async fn in_memory(retry: RetryPolicy) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool, retry };
        repo.create_schema().await?;
        info!("Created in-memory classification repository");
        Ok(repo)
    }

    async fn create_schema(&self) -> Result<(), StorageError> {
        with_retry(&self.retry, "create schema", || async {
            sqlx::query(CREATE_TABLE).execute(&self.pool).await
        })
        .await?;
        Ok(())
    }

    /// Insert a classification and return its ID
    pub async fn insert_classification(&self, new: NewClassification) -> Result<i64, StorageError> {
        if !new.confidence.is_finite() {
            return Err(StorageError::InvalidRecord(format!(
                "confidence {} is not finite",
                new.confidence
            )));
        }

        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query(
            "INSERT INTO classification_results
                (timestamp_ms, filename, is_sample_data, classification, confidence, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(timestamp_ms)
        .bind(&new.filename)
        .bind(new.is_sample_data)
        .bind(&new.classification)
        .bind(new.confidence)
        .bind(&new.notes)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted classification with ID {}", id);
        Ok(id)
    }

    /// Store a classification, reporting success instead of failing
    pub async fn save_classification(
        &self,
        filename: Option<&str>,
        is_sample_data: bool,
        classification: &str,
        confidence: f64,
        notes: Option<&str>,
    ) -> bool {
        let new = NewClassification {
            filename: filename.map(str::to_string),
            is_sample_data,
            classification: classification.to_string(),
            confidence,
            notes: notes.map(str::to_string),
        };

        match self.insert_classification(new).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Error saving classification result: {}", e);
                false
            }
        }
    }

    /// Fetch a single record
    pub async fn get_classification(&self, id: i64) -> Result<ClassificationRecord, StorageError> {
        let row = sqlx::query(
            "SELECT id, timestamp_ms, filename, is_sample_data, classification, confidence, notes
             FROM classification_results WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(record_from_row(&row)?)
    }

    /// All records, newest first. Empty after repeated failures.
    pub async fn all_classifications(&self) -> Vec<ClassificationRecord> {
        self.read_records(None).await
    }

    /// Most recent records, newest first. Empty after repeated failures.
    pub async fn recent_classifications(&self, limit: usize) -> Vec<ClassificationRecord> {
        self.read_records(Some(limit)).await
    }

    async fn read_records(&self, limit: Option<usize>) -> Vec<ClassificationRecord> {
        let result = with_retry(&self.retry, "read classifications", || self.query_records(limit)).await;

        match result {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to retrieve classification results: {}", e);
                Vec::new()
            }
        }
    }

    async fn query_records(&self, limit: Option<usize>) -> Result<Vec<ClassificationRecord>, StorageError> {
        let limited = format!("{} LIMIT ?", SELECT_COLUMNS);
        let rows = match limit {
            Some(limit) => {
                sqlx::query(&limited)
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => sqlx::query(SELECT_COLUMNS).fetch_all(&self.pool).await?,
        };

        rows.iter()
            .map(|row| record_from_row(row).map_err(StorageError::from))
            .collect()
    }

    /// Delete every record
    pub async fn clear_history(&self) -> bool {
        match sqlx::query("DELETE FROM classification_results")
            .execute(&self.pool)
            .await
        {
            Ok(result) => {
                info!("Cleared {} classification records", result.rows_affected());
                true
            }
            Err(e) => {
                warn!("Error clearing classification history: {}", e);
                false
            }
        }
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM classification_results")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &SqliteRow) -> Result<ClassificationRecord, sqlx::Error> {
    Ok(ClassificationRecord {
        id: row.try_get("id")?,
        timestamp_ms: row.try_get("timestamp_ms")?,
        filename: row.try_get("filename")?,
        is_sample_data: row.try_get("is_sample_data")?,
        classification: row.try_get("classification")?,
        confidence: row.try_get("confidence")?,
        notes: row.try_get("notes")?,
    })
}

async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<StorageError>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let err: StorageError = e.into();
                if attempt >= attempts {
                    warn!("{} failed after {} attempts: {}", what, attempts, err);
                    return Err(err);
                }
                warn!(
                    "{} failed, retrying in {}ms (attempt {}/{}): {}",
                    what, policy.delay_ms, attempt, attempts, err
                );
                tokio::time::sleep(Duration::from_millis(policy.delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
