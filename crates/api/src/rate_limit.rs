//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Classification requests run the whole pipeline, so they are rate limited per
//! client IP with tower_governor. Requires the service to be built with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tracing::warn;

/// Governor config keyed by peer IP, reporting quota in X-RateLimit-* headers
pub type ClassifyGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Apply the limiter at all
    pub enabled: bool,
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Requests that can be made immediately
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 2,
            burst_size: 5,
        }
    }
}

/// Build the governor config, or `None` when disabled or the quota is invalid
pub fn create_governor_config(config: &RateLimitConfig) -> Option<Arc<ClassifyGovernorConfig>> {
    if !config.enabled {
        return None;
    }

    let governor = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish();

    if governor.is_none() {
        warn!(
            "Invalid rate limit (per_second={}, burst_size={}), limiter disabled",
            config.per_second, config.burst_size
        );
    }
    governor.map(Arc::new)
}
