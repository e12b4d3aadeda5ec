// API server configuration, loaded from environment variables

use std::env;

use awardbench_core::AssemblerConfig;
use axum::http::HeaderValue;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Socket address to listen on
    pub bind_addr: String,

    /// Prefix for paper routes; empty mounts them at the root
    /// Example: API_PREFIX="/v1" results in routes like /v1/api/paper/status
    pub api_prefix: String,

    /// Only needed when the leaderboard UI is served from a different origin
    pub cors_origins: Vec<HeaderValue>,

    pub assembler: AssemblerConfig,
}

impl ApiConfig {
    /// Environment variables:
    /// - `AWARDBENCH_BIND_ADDR`: Listen address (default: 0.0.0.0:5000)
    /// - `API_PREFIX`: Route prefix (default: empty)
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origins (default: none)
    /// - everything [`AssemblerConfig::from_env`] reads
    pub fn from_env() -> Self {
        let bind_addr = env::var("AWARDBENCH_BIND_ADDR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let api_prefix = env::var("API_PREFIX").unwrap_or_default();

        let cors_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        Self {
            bind_addr,
            api_prefix,
            cors_origins,
            assembler: AssemblerConfig::from_env(),
        }
    }
}

/// Parse a comma-separated origin list, skipping blanks and invalid values
pub fn parse_origins(value: &str) -> Vec<HeaderValue> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}
