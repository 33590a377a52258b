//! Per-caller daily assignment counters
//!
//! One row per (caller, business date). Row granularity keeps different
//! callers from blocking each other; the only cross-caller serialization
//! point is the fairness pointer. Counters reset implicitly at business
//! date rollover - the previous day's row is retained, never mutated.

use chrono::NaiveDate;
use switchboard_core::{CallerId, EntityIdType};
use tokio_postgres::Transaction;

use crate::error::EngineResult;

/// Lock the (caller, date) counter row, creating it at zero if absent, and
/// return the current count.
pub async fn lock_and_read(
    tx: &Transaction<'_>,
    caller_id: CallerId,
    business_date: NaiveDate,
) -> EngineResult<i64> {
    tx.execute(
        "INSERT INTO daily_counters (caller_id, business_date, count) VALUES ($1, $2, 0) \
         ON CONFLICT (caller_id, business_date) DO NOTHING",
        &[&caller_id.as_uuid(), &business_date],
    )
    .await?;
    let row = tx
        .query_one(
            "SELECT count FROM daily_counters \
             WHERE caller_id = $1 AND business_date = $2 FOR UPDATE",
            &[&caller_id.as_uuid(), &business_date],
        )
        .await?;
    Ok(row.get(0))
}

/// Increment under the already-held lock.
pub async fn increment(
    tx: &Transaction<'_>,
    caller_id: CallerId,
    business_date: NaiveDate,
) -> EngineResult<()> {
    tx.execute(
        "UPDATE daily_counters SET count = count + 1 \
         WHERE caller_id = $1 AND business_date = $2",
        &[&caller_id.as_uuid(), &business_date],
    )
    .await?;
    Ok(())
}

/// Decrement under the already-held lock, clamping at zero.
///
/// Used only by same-day manual reassignment; historical days are never
/// retroactively adjusted.
pub async fn decrement(
    tx: &Transaction<'_>,
    caller_id: CallerId,
    business_date: NaiveDate,
) -> EngineResult<()> {
    tx.execute(
        "UPDATE daily_counters SET count = GREATEST(count - 1, 0) \
         WHERE caller_id = $1 AND business_date = $2",
        &[&caller_id.as_uuid(), &business_date],
    )
    .await?;
    Ok(())
}
