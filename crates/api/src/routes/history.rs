//! Classification History Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{ClassificationRecord, StorageError};
use tracing::error;

use crate::error::ApiError;
use crate::AppState;

const MAX_LIMIT: usize = 500;

/// Query parameters for the history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Most recent records to return; all when absent
    pub limit: Option<usize>,
}

/// Stored record plus its display strings
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: ClassificationRecord,
    pub date: String,
    pub source: String,
    pub display_classification: String,
    pub display_confidence: String,
}

impl From<ClassificationRecord> for HistoryEntry {
    fn from(record: ClassificationRecord) -> Self {
        Self {
            date: record.formatted_timestamp(),
            source: record.source_label(),
            display_classification: record.display_classification(),
            display_confidence: record.display_confidence(),
            record,
        }
    }
}

/// Response for history endpoint
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<HistoryEntry>,
    pub count: usize,
}

/// Response for clearing the history
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// Get classification history, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let records = match params.limit {
        Some(limit) => {
            state
                .repository
                .recent_classifications(limit.min(MAX_LIMIT))
                .await
        }
        None => state.repository.all_classifications().await,
    };

    let data: Vec<HistoryEntry> = records.into_iter().map(HistoryEntry::from).collect();
    Json(HistoryResponse {
        count: data.len(),
        data,
    })
}

/// Get one stored classification by ID
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<HistoryEntry>, ApiError> {
    match state.repository.get_classification(id).await {
        Ok(record) => Ok(Json(HistoryEntry::from(record))),
        Err(StorageError::NotFound) => {
            Err(ApiError::NotFound(format!("Classification {} not found", id)))
        }
        Err(e) => {
            error!("Error fetching classification {}: {}", id, e);
            Err(ApiError::Internal("Error reading history".to_string()))
        }
    }
}

/// Delete every stored classification
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, ApiError> {
    if state.repository.clear_history().await {
        Ok(Json(ClearResponse { cleared: true }))
    } else {
        Err(ApiError::Internal("Error clearing history".to_string()))
    }
}
