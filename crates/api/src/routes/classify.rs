//! Classification Routes

use axum::{extract::State, Json};
use inference_engine::{ClassProbability, ClassificationOutcome, ClassificationService, TargetClass};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Filename stored for the bundled example signal
pub const SAMPLE_FILENAME: &str = "Sample Data";

/// Request body for classifying uploaded text
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// Delimited numeric table, one signal per row
    pub csv: String,
    /// Original file name, kept in the history
    pub filename: Option<String>,
    pub notes: Option<String>,
    /// Row to classify instead of the configured default
    pub row_index: Option<usize>,
}

/// Request body for classifying the bundled sample
#[derive(Debug, Default, Deserialize)]
pub struct SampleRequest {
    pub notes: Option<String>,
}

/// One feature before and after standardization
#[derive(Debug, Serialize)]
pub struct FeatureEntry {
    pub name: &'static str,
    pub value: f64,
    pub standardized: f64,
}

/// Normalized amplitude against sample index
#[derive(Debug, Serialize)]
pub struct SignalTrace {
    pub time: Vec<usize>,
    pub amplitude: Vec<f64>,
}

/// Response for both classification endpoints
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub classification: TargetClass,
    /// Percentage, 0 to 100
    pub confidence: f64,
    pub probabilities: Vec<ClassProbability>,
    pub features: Vec<FeatureEntry>,
    pub signal: SignalTrace,
    pub row_index: usize,
    pub missing_samples: usize,
    pub latency_ms: u64,
    /// Whether the result reached the history database
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ClassifyResponse {
    fn new(outcome: ClassificationOutcome, saved: bool) -> Self {
        let features = outcome
            .features
            .named()
            .zip(outcome.standardized.values())
            .map(|((name, value), &standardized)| FeatureEntry {
                name,
                value,
                standardized,
            })
            .collect();

        Self {
            classification: outcome.prediction.label,
            confidence: outcome.prediction.confidence,
            probabilities: outcome.prediction.probabilities,
            features,
            signal: SignalTrace {
                time: outcome.time,
                amplitude: outcome.amplitude,
            },
            row_index: outcome.row_index,
            missing_samples: outcome.missing_samples,
            latency_ms: outcome.latency_ms,
            saved,
            warning: (!saved).then(|| "Failed to save classification result".to_string()),
        }
    }
}

/// Where the signal for one request comes from
enum Source {
    Text { csv: String, row_index: Option<usize> },
    Sample { path: String },
}

/// Classify an uploaded table and record it in the history
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let outcome = run_pipeline(
        &state,
        Source::Text {
            csv: request.csv,
            row_index: request.row_index,
        },
    )
    .await?;

    let saved = state
        .repository
        .save_classification(
            request.filename.as_deref(),
            false,
            outcome.label().as_str(),
            outcome.confidence(),
            request.notes.as_deref(),
        )
        .await;

    Ok(Json(finish(outcome, saved)))
}

/// Classify the bundled example signal and record it in the history
pub async fn classify_sample(
    State(state): State<Arc<AppState>>,
    request: Option<Json<SampleRequest>>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let notes = request.and_then(|Json(r)| r.notes);
    let path = state.config.sample_data_path.clone();

    let outcome = run_pipeline(&state, Source::Sample { path })
        .await
        .map_err(sample_unavailable)?;

    let saved = state
        .repository
        .save_classification(
            Some(SAMPLE_FILENAME),
            true,
            outcome.label().as_str(),
            outcome.confidence(),
            notes.as_deref(),
        )
        .await;

    Ok(Json(finish(outcome, saved)))
}

async fn run_pipeline(state: &AppState, source: Source) -> Result<ClassificationOutcome, ApiError> {
    let service: ClassificationService = state.service.clone();

    // Feature extraction and the forest are CPU bound
    let joined = tokio::task::spawn_blocking(move || match source {
        Source::Text {
            csv,
            row_index: Some(row),
        } => service.classify_text_row(&csv, row),
        Source::Text { csv, row_index: None } => service.classify_text(&csv),
        Source::Sample { path } => service.classify_file(path),
    })
    .await;

    let result = match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => Err(ApiError::Internal(format!("Classification task failed: {}", e))),
    };

    match result {
        Ok(outcome) => {
            counter!("microdoppler_classifications_total", "class" => outcome.label().as_str())
                .increment(1);
            histogram!("microdoppler_classification_latency_ms").record(outcome.latency_ms as f64);
            Ok(outcome)
        }
        Err(e) => {
            counter!("microdoppler_classification_failures_total", "kind" => e.kind()).increment(1);
            Err(e)
        }
    }
}

/// A missing or unreadable sample file is reported as 404; other failures pass through
fn sample_unavailable(err: ApiError) -> ApiError {
    match err {
        ApiError::SourceUnavailable(_) => {
            ApiError::NotFound("Sample data is not available".to_string())
        }
        other => other,
    }
}

fn finish(outcome: ClassificationOutcome, saved: bool) -> ClassifyResponse {
    if saved {
        info!(
            "Recorded {} classification ({:.2}%)",
            outcome.label(),
            outcome.confidence()
        );
    } else {
        warn!("Classification result was not saved to history");
        counter!("microdoppler_history_save_failures_total").increment(1);
    }
    ClassifyResponse::new(outcome, saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_only_unreadable_sample_is_not_found() {
        let missing = sample_unavailable(ApiError::SourceUnavailable("gone".to_string()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let crashed = sample_unavailable(ApiError::Internal("task panicked".to_string()));
        assert!(matches!(crashed, ApiError::Internal(_)));
        assert_eq!(crashed.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let rejected = sample_unavailable(ApiError::Validation("bad".to_string()));
        assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
