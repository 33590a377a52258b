//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development. All variables carry the `SWITCHBOARD_` prefix.

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_WS_CAPACITY: usize = 1000;
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 3600;
/// IANA timezone the business operates in.
pub const DEFAULT_BUSINESS_TIMEZONE: &str = "Asia/Kolkata";
/// Bounded retry for transient transaction conflicts.
pub const DEFAULT_ASSIGN_RETRY_LIMIT: u32 = 3;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, CORS, webhook auth, and engine knobs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host interface to bind.
    pub bind_host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Shared secret expected in the `x-webhook-secret` header.
    /// When unset, webhook authentication is disabled (dev mode).
    pub webhook_secret: Option<String>,

    /// Broadcast channel capacity for dashboard events.
    pub ws_capacity: usize,

    /// IANA timezone used for business-date bucketing.
    pub business_timezone: String,

    /// How many times a transient transaction conflict is retried before
    /// surfacing as a server error.
    pub assign_retry_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            webhook_secret: None,
            ws_capacity: DEFAULT_WS_CAPACITY,
            business_timezone: DEFAULT_BUSINESS_TIMEZONE.to_string(),
            assign_retry_limit: DEFAULT_ASSIGN_RETRY_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `SWITCHBOARD_API_BIND`: bind interface (default: 0.0.0.0)
    /// - `PORT` / `SWITCHBOARD_API_PORT`: bind port (default: 3000)
    /// - `SWITCHBOARD_CORS_ORIGINS`: comma-separated origins, empty = allow all
    /// - `SWITCHBOARD_CORS_MAX_AGE`: preflight cache seconds (default: 3600)
    /// - `SWITCHBOARD_WEBHOOK_SECRET`: shared secret for the lead webhook
    /// - `SWITCHBOARD_WS_CAPACITY`: event buffer size (default: 1000)
    /// - `SWITCHBOARD_BUSINESS_TIMEZONE`: IANA zone (default: Asia/Kolkata)
    /// - `SWITCHBOARD_ASSIGN_RETRY_LIMIT`: transient retry bound (default: 3)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host =
            std::env::var("SWITCHBOARD_API_BIND").unwrap_or(defaults.bind_host);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("SWITCHBOARD_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = std::env::var("SWITCHBOARD_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("SWITCHBOARD_CORS_MAX_AGE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let webhook_secret = std::env::var("SWITCHBOARD_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let ws_capacity = std::env::var("SWITCHBOARD_WS_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ws_capacity);

        let business_timezone = std::env::var("SWITCHBOARD_BUSINESS_TIMEZONE")
            .unwrap_or(defaults.business_timezone);

        let assign_retry_limit = std::env::var("SWITCHBOARD_ASSIGN_RETRY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.assign_retry_limit);

        Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            webhook_secret,
            ws_capacity,
            business_timezone,
            assign_retry_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.cors_origins.is_empty());
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.assign_retry_limit, 3);
    }
}
