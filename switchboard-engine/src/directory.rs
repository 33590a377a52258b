//! Read-only caller directory
//!
//! Bulk candidate queries for the selection walk. Candidate ordering is
//! pinned to `(created_at, id)` - a stable total key - so round robin
//! advances deterministically; set-based iteration would make rotation
//! nondeterministic and unfair.

use switchboard_core::{CallerId, EntityIdType};
use tokio_postgres::{Row, Transaction};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The slice of a caller profile the selection walk needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerCandidate {
    pub caller_id: CallerId,
    /// 0 means unlimited.
    pub daily_limit: i32,
}

fn candidate_from_row(row: &Row) -> CallerCandidate {
    CallerCandidate {
        caller_id: CallerId::new(row.get::<_, Uuid>(0)),
        daily_limit: row.get(1),
    }
}

/// Active callers bound to the given normalized state, in stable order.
pub async fn candidates_for_state(
    tx: &Transaction<'_>,
    state: &str,
) -> EngineResult<Vec<CallerCandidate>> {
    let rows = tx
        .query(
            "SELECT c.id, c.daily_limit \
             FROM callers c \
             JOIN caller_states cs ON cs.caller_id = c.id \
             WHERE c.status = 'active' AND cs.state = $1 \
             ORDER BY c.created_at, c.id",
            &[&state],
        )
        .await?;
    Ok(rows.iter().map(candidate_from_row).collect())
}

/// All active callers, in the same stable order.
pub async fn candidates_global(tx: &Transaction<'_>) -> EngineResult<Vec<CallerCandidate>> {
    let rows = tx
        .query(
            "SELECT id, daily_limit FROM callers \
             WHERE status = 'active' \
             ORDER BY created_at, id",
            &[],
        )
        .await?;
    Ok(rows.iter().map(candidate_from_row).collect())
}

/// Display name of a caller, for event emission.
pub async fn name_of(tx: &Transaction<'_>, caller_id: CallerId) -> EngineResult<Option<String>> {
    let row = tx
        .query_opt("SELECT name FROM callers WHERE id = $1", &[&caller_id.as_uuid()])
        .await?;
    Ok(row.map(|r| r.get(0)))
}

/// Resolve a manual-reassignment target, requiring it to be active.
pub async fn assignable(
    tx: &Transaction<'_>,
    caller_id: CallerId,
) -> EngineResult<CallerCandidate> {
    let row = tx
        .query_opt(
            "SELECT id, daily_limit, status FROM callers WHERE id = $1",
            &[&caller_id.as_uuid()],
        )
        .await?;
    match row {
        None => Err(EngineError::CallerNotAssignable {
            caller_id,
            reason: "caller does not exist".to_string(),
        }),
        Some(row) => {
            let status: String = row.get(2);
            if status != "active" {
                return Err(EngineError::CallerNotAssignable {
                    caller_id,
                    reason: format!("caller is {}", status),
                });
            }
            Ok(candidate_from_row(&row))
        }
    }
}
