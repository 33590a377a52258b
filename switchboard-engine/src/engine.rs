//! Transactional assignment engine
//!
//! Consumes a validated lead and an open transaction, selects an eligible
//! caller under state routing, daily caps, and round-robin fairness, and
//! writes the lead, assignment row, fairness pointer, and daily counter as
//! one unit. There is no retry loop in here - the transport retries the
//! whole transaction on transient conflicts, and the natural key on leads
//! makes those retries (and webhook redeliveries) safe.

use std::sync::Arc;

use tokio_postgres::{Row, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use switchboard_core::{
    normalize_state, Assignment, AssignmentId, AssignmentOutcome, AssignmentReason,
    AssignmentStatus, CallerId, EntityIdType, Lead, LeadId, NewLead, RoutingKey, Timestamp,
};

use crate::calendar::{BusinessCalendar, Clock};
use crate::counters;
use crate::directory::{self, CallerCandidate};
use crate::error::{EngineError, EngineResult};
use crate::fairness;

/// Rotate `candidates` so the element immediately after `last` comes first.
///
/// If `last` is absent from the list (pointer is advisory - the referenced
/// caller may have been paused or rebound since), the order degenerates to
/// the unrotated stable order.
pub fn rotate_after(candidates: &[CallerCandidate], last: Option<CallerId>) -> Vec<CallerCandidate> {
    let Some(last) = last else {
        return candidates.to_vec();
    };
    match candidates.iter().position(|c| c.caller_id == last) {
        Some(idx) => {
            let mut rotated = Vec::with_capacity(candidates.len());
            rotated.extend_from_slice(&candidates[idx + 1..]);
            rotated.extend_from_slice(&candidates[..=idx]);
            rotated
        }
        None => candidates.to_vec(),
    }
}

/// What the selection walk decided.
enum Selection {
    Chosen {
        candidate: CallerCandidate,
        key: RoutingKey,
        reason: AssignmentReason,
    },
    Exhausted {
        reason: AssignmentReason,
    },
}

/// The orchestrator. Holds the business calendar and the injected clock;
/// all persistent state lives in row-locked tables, so N engine workers
/// coordinate through the database alone.
pub struct AssignmentEngine {
    calendar: BusinessCalendar,
    clock: Arc<dyn Clock>,
}

impl AssignmentEngine {
    pub fn new(calendar: BusinessCalendar, clock: Arc<dyn Clock>) -> Self {
        Self { calendar, clock }
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// The current business date.
    pub fn today(&self) -> chrono::NaiveDate {
        self.calendar.business_date(self.clock.now())
    }

    /// Record a lead and decide its caller inside the open transaction.
    ///
    /// If the lead's natural key `(phone, source_timestamp)` already
    /// exists, the previously committed outcome is returned unchanged
    /// (`duplicate: true`) - counters and pointers are not touched.
    pub async fn assign(
        &self,
        tx: &Transaction<'_>,
        new_lead: &NewLead,
    ) -> EngineResult<(Lead, AssignmentOutcome)> {
        let now = self.clock.now();
        info!(phone = %new_lead.phone, state = ?new_lead.state, "assign start");

        let lead = match insert_lead(tx, new_lead, now).await? {
            Some(lead) => lead,
            None => {
                // Natural-key hit: webhook redelivery or transport retry.
                let lead =
                    load_lead_by_natural_key(tx, &new_lead.phone, new_lead.source_timestamp)
                        .await?;
                let outcome = self.committed_outcome(tx, &lead).await?;
                info!(
                    lead_id = %lead.lead_id,
                    caller_id = ?outcome.caller_id,
                    "assign duplicate, returning prior outcome"
                );
                return Ok((lead, outcome));
            }
        };

        let outcome = self.decide_and_persist(tx, &lead, now).await?;
        Ok((lead, outcome))
    }

    /// Manually move a lead, or re-run auto-selection when `target` is
    /// absent. The previous assignment row is superseded; same-day counter
    /// effects are balanced, historical days are left alone.
    pub async fn reassign(
        &self,
        tx: &Transaction<'_>,
        lead_id: LeadId,
        target: Option<CallerId>,
    ) -> EngineResult<(Lead, AssignmentOutcome)> {
        let now = self.clock.now();
        let today = self.calendar.business_date(now);

        let lead = load_lead(tx, lead_id)
            .await?
            .ok_or(EngineError::LeadNotFound(lead_id))?;
        let previous = current_assignment(tx, lead_id, true).await?;

        info!(lead_id = %lead_id, target = ?target, "reassign start");

        // Resolve the new caller before touching counters so the walk (if
        // any) observes the pre-reassignment cap state. Pointer locks are
        // acquired here, counter locks below - same order as assign.
        let resolved = match target {
            Some(caller_id) => {
                let candidate = directory::assignable(tx, caller_id).await?;
                Selection::Chosen {
                    candidate,
                    key: RoutingKey::Global, // unused for manual; no pointer write
                    reason: AssignmentReason::ManualReassign,
                }
            }
            None => self.select(tx, lead.state.as_deref(), today).await?,
        };

        if let Some(previous) = &previous {
            tx.execute(
                "UPDATE assignments SET status = 'superseded' WHERE id = $1",
                &[&previous.assignment_id.as_uuid()],
            )
            .await?;
            if let (Some(prev_caller), AssignmentStatus::Assigned) =
                (previous.caller_id, previous.status)
            {
                if self.calendar.business_date(previous.assigned_at) == today {
                    counters::lock_and_read(tx, prev_caller, today).await?;
                    counters::decrement(tx, prev_caller, today).await?;
                    debug!(caller_id = %prev_caller, "decremented same-day counter");
                }
            }
        }

        let outcome = match resolved {
            Selection::Chosen {
                candidate,
                key,
                reason,
            } => {
                if reason == AssignmentReason::ManualReassign {
                    // Manual override bypasses cap and routing; still lock
                    // the counter row before mutating it.
                    counters::lock_and_read(tx, candidate.caller_id, today).await?;
                } else {
                    fairness::write(tx, &key, candidate.caller_id, now).await?;
                }
                counters::increment(tx, candidate.caller_id, today).await?;
                let assignment = insert_assignment(
                    tx,
                    lead_id,
                    Some(candidate.caller_id),
                    AssignmentStatus::Assigned,
                    reason,
                    now,
                )
                .await?;
                let caller_name = directory::name_of(tx, candidate.caller_id).await?;
                info!(
                    lead_id = %lead_id,
                    caller_id = %candidate.caller_id,
                    reason = %reason,
                    "reassign complete"
                );
                outcome_from(&assignment, caller_name, false)
            }
            Selection::Exhausted { reason } => {
                let assignment = insert_assignment(
                    tx,
                    lead_id,
                    None,
                    AssignmentStatus::Unassigned,
                    reason,
                    now,
                )
                .await?;
                warn!(lead_id = %lead_id, reason = %reason, "reassign left lead unassigned");
                outcome_from(&assignment, None, false)
            }
        };
        Ok((lead, outcome))
    }

    /// Run selection for a fresh lead and persist the decision.
    async fn decide_and_persist(
        &self,
        tx: &Transaction<'_>,
        lead: &Lead,
        now: Timestamp,
    ) -> EngineResult<AssignmentOutcome> {
        let today = self.calendar.business_date(now);
        let selection = self.select(tx, lead.state.as_deref(), today).await?;

        match selection {
            Selection::Chosen {
                candidate,
                key,
                reason,
            } => {
                counters::increment(tx, candidate.caller_id, today).await?;
                fairness::write(tx, &key, candidate.caller_id, now).await?;
                let assignment = insert_assignment(
                    tx,
                    lead.lead_id,
                    Some(candidate.caller_id),
                    AssignmentStatus::Assigned,
                    reason,
                    now,
                )
                .await?;
                let caller_name = directory::name_of(tx, candidate.caller_id).await?;
                info!(
                    lead_id = %lead.lead_id,
                    caller_id = %candidate.caller_id,
                    key = %key,
                    reason = %reason,
                    "assign complete"
                );
                Ok(outcome_from(&assignment, caller_name, false))
            }
            Selection::Exhausted { reason } => {
                // The lead is still persisted, with a null-caller row.
                let assignment = insert_assignment(
                    tx,
                    lead.lead_id,
                    None,
                    AssignmentStatus::Unassigned,
                    reason,
                    now,
                )
                .await?;
                warn!(lead_id = %lead.lead_id, reason = %reason, "assign unassigned");
                Ok(outcome_from(&assignment, None, false))
            }
        }
    }

    /// The selection algorithm: state-scoped round robin with deferred cap
    /// evaluation, then global fallback.
    ///
    /// Lock ordering is state pointer before global pointer; the state
    /// pointer is only locked when state candidates actually exist. Cap
    /// checks happen per walked candidate (locking only the counters the
    /// walk reaches), not eagerly for the whole candidate set.
    async fn select(
        &self,
        tx: &Transaction<'_>,
        raw_state: Option<&str>,
        today: chrono::NaiveDate,
    ) -> EngineResult<Selection> {
        if let Some(state) = normalize_state(raw_state) {
            let candidates = directory::candidates_for_state(tx, &state).await?;
            if !candidates.is_empty() {
                let key = RoutingKey::State(state);
                let last = fairness::lock_and_read(tx, &key).await?;
                if let Some(candidate) = walk(tx, &candidates, last, today).await? {
                    return Ok(Selection::Chosen {
                        candidate,
                        key,
                        reason: AssignmentReason::StateRoundRobin,
                    });
                }
                debug!(key = %key, "every state candidate at cap, falling back to global");
            }
        }

        let candidates = directory::candidates_global(tx).await?;
        if candidates.is_empty() {
            return Ok(Selection::Exhausted {
                reason: AssignmentReason::UnassignedNoEligible,
            });
        }
        let key = RoutingKey::Global;
        let last = fairness::lock_and_read(tx, &key).await?;
        if let Some(candidate) = walk(tx, &candidates, last, today).await? {
            return Ok(Selection::Chosen {
                candidate,
                key,
                reason: AssignmentReason::GlobalRoundRobin,
            });
        }
        Ok(Selection::Exhausted {
            reason: AssignmentReason::UnassignedCapReached,
        })
    }

    /// Reconstruct the outcome previously committed for `lead`.
    async fn committed_outcome(
        &self,
        tx: &Transaction<'_>,
        lead: &Lead,
    ) -> EngineResult<AssignmentOutcome> {
        let assignment = current_assignment(tx, lead.lead_id, false)
            .await?
            .ok_or_else(|| EngineError::Db {
                reason: format!("lead {} has no current assignment row", lead.lead_id),
            })?;
        let caller_name = match assignment.caller_id {
            Some(caller_id) => directory::name_of(tx, caller_id).await?,
            None => None,
        };
        Ok(outcome_from(&assignment, caller_name, true))
    }
}

/// Walk the rotated candidate list; the first uncapped candidate wins.
///
/// Each step locks exactly one counter row. The pointer is NOT advanced
/// here - unassigned outcomes must leave it unchanged, so fairness is not
/// spent on capacity failures.
async fn walk(
    tx: &Transaction<'_>,
    candidates: &[CallerCandidate],
    last: Option<CallerId>,
    today: chrono::NaiveDate,
) -> EngineResult<Option<CallerCandidate>> {
    for candidate in rotate_after(candidates, last) {
        let count = counters::lock_and_read(tx, candidate.caller_id, today).await?;
        if candidate.daily_limit == 0 || count < i64::from(candidate.daily_limit) {
            return Ok(Some(candidate));
        }
        debug!(caller_id = %candidate.caller_id, count, "candidate at daily cap, skipping");
    }
    Ok(None)
}

// ============================================================================
// ROW ACCESS
// ============================================================================

fn lead_from_row(row: &Row) -> Lead {
    Lead {
        lead_id: LeadId::new(row.get::<_, Uuid>("id")),
        name: row.get("name"),
        phone: row.get("phone"),
        source_timestamp: row.get("source_timestamp"),
        lead_source: row.get("lead_source"),
        city: row.get("city"),
        state: row.get("state"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
    }
}

fn assignment_from_row(row: &Row) -> EngineResult<Assignment> {
    let reason: String = row.get("reason");
    let status: String = row.get("status");
    Ok(Assignment {
        assignment_id: AssignmentId::new(row.get::<_, Uuid>("id")),
        lead_id: LeadId::new(row.get::<_, Uuid>("lead_id")),
        caller_id: row.get::<_, Option<Uuid>>("caller_id").map(CallerId::new),
        assigned_at: row.get("assigned_at"),
        reason: reason.parse().map_err(|e| EngineError::Db {
            reason: format!("{}", e),
        })?,
        status: status.parse().map_err(|e| EngineError::Db {
            reason: format!("{}", e),
        })?,
    })
}

fn outcome_from(
    assignment: &Assignment,
    caller_name: Option<String>,
    duplicate: bool,
) -> AssignmentOutcome {
    AssignmentOutcome {
        lead_id: assignment.lead_id,
        caller_id: assignment.caller_id,
        caller_name,
        status: assignment.status,
        reason: assignment.reason,
        assigned_at: assignment.assigned_at,
        duplicate,
    }
}

const LEAD_COLUMNS: &str =
    "id, name, phone, source_timestamp, lead_source, city, state, metadata, created_at";

/// Insert the lead, returning `None` when the natural key already exists.
async fn insert_lead(
    tx: &Transaction<'_>,
    new_lead: &NewLead,
    now: Timestamp,
) -> EngineResult<Option<Lead>> {
    let lead_id = LeadId::new_v4();
    let sql = format!(
        "INSERT INTO leads ({LEAD_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (phone, source_timestamp) DO NOTHING \
         RETURNING {LEAD_COLUMNS}"
    );
    let row = tx
        .query_opt(
            sql.as_str(),
            &[
                &lead_id.as_uuid(),
                &new_lead.name,
                &new_lead.phone,
                &new_lead.source_timestamp,
                &new_lead.lead_source,
                &new_lead.city,
                &new_lead.state,
                &new_lead.metadata,
                &now,
            ],
        )
        .await?;
    Ok(row.map(|r| lead_from_row(&r)))
}

async fn load_lead(tx: &Transaction<'_>, lead_id: LeadId) -> EngineResult<Option<Lead>> {
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1");
    let row = tx.query_opt(sql.as_str(), &[&lead_id.as_uuid()]).await?;
    Ok(row.map(|r| lead_from_row(&r)))
}

async fn load_lead_by_natural_key(
    tx: &Transaction<'_>,
    phone: &str,
    source_timestamp: Timestamp,
) -> EngineResult<Lead> {
    let sql = format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE phone = $1 AND source_timestamp = $2"
    );
    let row = tx
        .query_one(sql.as_str(), &[&phone, &source_timestamp])
        .await?;
    Ok(lead_from_row(&row))
}

/// The lead's single non-superseded assignment row, optionally locked.
async fn current_assignment(
    tx: &Transaction<'_>,
    lead_id: LeadId,
    lock: bool,
) -> EngineResult<Option<Assignment>> {
    let suffix = if lock { " FOR UPDATE" } else { "" };
    let sql = format!(
        "SELECT id, lead_id, caller_id, assigned_at, reason, status \
         FROM assignments WHERE lead_id = $1 AND status <> 'superseded'{suffix}"
    );
    let row = tx.query_opt(sql.as_str(), &[&lead_id.as_uuid()]).await?;
    row.map(|r| assignment_from_row(&r)).transpose()
}

async fn insert_assignment(
    tx: &Transaction<'_>,
    lead_id: LeadId,
    caller_id: Option<CallerId>,
    status: AssignmentStatus,
    reason: AssignmentReason,
    now: Timestamp,
) -> EngineResult<Assignment> {
    let assignment_id = AssignmentId::new_v4();
    tx.execute(
        "INSERT INTO assignments (id, lead_id, caller_id, assigned_at, reason, status) \
         VALUES ($1, $2, $3, $4, $5, $6)",
        &[
            &assignment_id.as_uuid(),
            &lead_id.as_uuid(),
            &caller_id.map(|c| c.as_uuid()),
            &now,
            &reason.as_str(),
            &status.as_str(),
        ],
    )
    .await?;
    Ok(Assignment {
        assignment_id,
        lead_id,
        caller_id,
        assigned_at: now,
        reason,
        status,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(n: u128, limit: i32) -> CallerCandidate {
        CallerCandidate {
            caller_id: CallerId::new(Uuid::from_u128(n)),
            daily_limit: limit,
        }
    }

    fn ids(candidates: &[CallerCandidate]) -> Vec<u128> {
        candidates.iter().map(|c| c.caller_id.as_uuid().as_u128()).collect()
    }

    #[test]
    fn test_rotate_after_no_pointer() {
        let list = [candidate(1, 0), candidate(2, 0), candidate(3, 0)];
        assert_eq!(ids(&rotate_after(&list, None)), vec![1, 2, 3]);
    }

    #[test]
    fn test_rotate_after_middle() {
        let list = [candidate(1, 0), candidate(2, 0), candidate(3, 0)];
        let last = Some(CallerId::new(Uuid::from_u128(1)));
        assert_eq!(ids(&rotate_after(&list, last)), vec![2, 3, 1]);
    }

    #[test]
    fn test_rotate_after_last_element_wraps() {
        let list = [candidate(1, 0), candidate(2, 0), candidate(3, 0)];
        let last = Some(CallerId::new(Uuid::from_u128(3)));
        assert_eq!(ids(&rotate_after(&list, last)), vec![1, 2, 3]);
    }

    #[test]
    fn test_rotate_after_stale_pointer_degenerates() {
        // Pointer references a caller no longer in the candidate set.
        let list = [candidate(1, 0), candidate(2, 0)];
        let last = Some(CallerId::new(Uuid::from_u128(99)));
        assert_eq!(ids(&rotate_after(&list, last)), vec![1, 2]);
    }

    #[test]
    fn test_rotate_after_single_candidate() {
        let list = [candidate(7, 0)];
        let last = Some(CallerId::new(Uuid::from_u128(7)));
        assert_eq!(ids(&rotate_after(&list, last)), vec![7]);
    }

    #[test]
    fn test_rotate_after_empty() {
        assert!(rotate_after(&[], None).is_empty());
        assert!(rotate_after(&[], Some(CallerId::new(Uuid::from_u128(1)))).is_empty());
    }
}
