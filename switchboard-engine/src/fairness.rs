//! Persistent round-robin pointer store
//!
//! One row per routing key holding the last caller that received a lead
//! under that key. `lock_and_read` takes a row-level exclusive lock that is
//! held until the enclosing transaction commits - two concurrent
//! assignments sharing a routing key serialize here.

use switchboard_core::{CallerId, EntityIdType, RoutingKey, Timestamp};
use tokio_postgres::Transaction;
use uuid::Uuid;

use crate::error::EngineResult;

/// Lock the pointer row for `key`, creating it empty if absent, and return
/// the previous last-assigned caller.
pub async fn lock_and_read(
    tx: &Transaction<'_>,
    key: &RoutingKey,
) -> EngineResult<Option<CallerId>> {
    let key = key.to_string();
    tx.execute(
        "INSERT INTO rr_pointers (key, last_caller_id) VALUES ($1, NULL) \
         ON CONFLICT (key) DO NOTHING",
        &[&key],
    )
    .await?;
    let row = tx
        .query_one(
            "SELECT last_caller_id FROM rr_pointers WHERE key = $1 FOR UPDATE",
            &[&key],
        )
        .await?;
    Ok(row.get::<_, Option<Uuid>>(0).map(CallerId::new))
}

/// Advance the pointer under the already-held lock.
pub async fn write(
    tx: &Transaction<'_>,
    key: &RoutingKey,
    caller_id: CallerId,
    now: Timestamp,
) -> EngineResult<()> {
    tx.execute(
        "UPDATE rr_pointers SET last_caller_id = $2, updated_at = $3 WHERE key = $1",
        &[&key.to_string(), &caller_id.as_uuid(), &now],
    )
    .await?;
    Ok(())
}
