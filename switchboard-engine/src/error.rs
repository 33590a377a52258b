//! Error types for engine operations

use switchboard_core::{CallerId, LeadId};
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Errors produced by the assignment engine.
///
/// `Transient` marks conflicts the transport should retry with a fresh
/// transaction; everything else is surfaced as-is.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Transient transaction conflict: {reason}")]
    Transient { reason: String },

    #[error("Caller {caller_id} is not assignable: {reason}")]
    CallerNotAssignable { caller_id: CallerId, reason: String },

    #[error("Lead not found: {0}")]
    LeadNotFound(LeadId),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Database error: {reason}")]
    Db { reason: String },
}

impl EngineError {
    /// Whether the enclosing transaction should be retried from scratch.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Transient { .. })
    }
}

impl From<tokio_postgres::Error> for EngineError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db) = err.as_db_error() {
            // Serialization failures and deadlocks roll the whole
            // transaction back; the caller retries with a fresh one.
            if db.code() == &SqlState::T_R_SERIALIZATION_FAILURE
                || db.code() == &SqlState::T_R_DEADLOCK_DETECTED
            {
                return EngineError::Transient {
                    reason: db.message().to_string(),
                };
            }
        }
        EngineError::Db {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::EntityIdType;

    #[test]
    fn test_transient_classification() {
        let err = EngineError::Transient {
            reason: "deadlock detected".to_string(),
        };
        assert!(err.is_transient());

        let err = EngineError::CallerNotAssignable {
            caller_id: CallerId::nil(),
            reason: "paused".to_string(),
        };
        assert!(!err.is_transient());
    }
}
