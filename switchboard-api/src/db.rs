//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres. Route handlers
//! check a connection out of the pool, open an explicit transaction, and
//! hand it to the engine; all row locking happens inside that transaction.

use deadpool_postgres::{Config, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;

use crate::error::{ApiError, ApiResult, ErrorCode};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "switchboard".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SWITCHBOARD_DB_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SWITCHBOARD_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("SWITCHBOARD_DB_NAME")
                .unwrap_or_else(|_| "switchboard".to_string()),
            user: std::env::var("SWITCHBOARD_DB_USER")
                .unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("SWITCHBOARD_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SWITCHBOARD_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("SWITCHBOARD_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Cloneable handle to the connection pool.
#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool,
}

impl DbClient {
    /// Build a client (and its pool) from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self {
            pool: config.create_pool()?,
        })
    }

    /// Check a connection out of the pool.
    pub async fn conn(&self) -> ApiResult<Object> {
        self.pool.get().await.map_err(|e| {
            ApiError::new(
                ErrorCode::ConnectionPoolExhausted,
                format!("Failed to get database connection: {}", e),
            )
        })
    }
}
