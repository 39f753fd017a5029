//! Microdoppler Classification API Server
//!
//! REST API for classifying radar micro-Doppler signals as drone or bird and
//! browsing the classification history.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inference_engine::{ClassificationService, ModelBundle};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use storage::Repository;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;

pub use config::AppConfig;
pub use error::ApiError;
pub use rate_limit::RateLimitConfig;

/// Application state shared across handlers
pub struct AppState {
    /// Ingest, extract and classify pipeline
    pub service: ClassificationService,
    /// History repository
    pub repository: Repository,
    /// Effective configuration
    pub config: AppConfig,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        service: ClassificationService,
        repository: Repository,
        config: AppConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            service,
            repository,
            config,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
    pub database: DatabaseStatus,
}

/// Loaded model summary
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub trees: usize,
    pub seed: u64,
    pub degenerate_features: Vec<usize>,
}

/// History database status
#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub status: String,
    pub records: Option<i64>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let classify_routes = Router::new()
        .route("/api/v1/classify", post(routes::classify::classify))
        .route("/api/v1/classify/sample", post(routes::classify::classify_sample));

    let classify_routes = match rate_limit::create_governor_config(&state.config.rate_limit) {
        Some(config) => classify_routes.layer(GovernorLayer { config }),
        None => classify_routes,
    };

    // JSON framing around the table text
    let body_limit = usize::try_from(state.config.reader.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(64 * 1024);

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/v1/history",
            get(routes::history::get_history).delete(routes::history::clear_history),
        )
        .route("/api/v1/history/:id", get(routes::history::get_entry))
        .route("/metrics", get(metrics_handler))
        .merge(classify_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let bundle = state.service.bundle();
    let records = state.repository.count().await;
    let database = match records {
        Ok(n) => DatabaseStatus {
            status: "ok".to_string(),
            records: Some(n),
        },
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            DatabaseStatus {
                status: "unavailable".to_string(),
                records: None,
            }
        }
    };

    let response = HealthResponse {
        status: if database.records.is_some() {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            trees: bundle.classifier().forest().tree_count(),
            seed: bundle.classifier().forest().config().seed,
            degenerate_features: bundle.scaler().degenerate_columns().to_vec(),
        },
        database,
    };

    Json(response)
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(
    config: &config::LoggingConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Fit the model, open the history database, and serve until Ctrl-C
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus exporter unavailable: {}", e);
            None
        }
    };

    let bundle = ModelBundle::bootstrap(config.model.clone())?;
    let service = ClassificationService::new(bundle, config.ingest.clone(), config.reader.clone());
    let repository = Repository::connect(&config.database.url, config.database.retry.clone()).await?;

    let addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(service, repository.clone(), config, metrics));
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    repository.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
