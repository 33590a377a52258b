//! Shared helpers for engine integration tests.
//!
//! These tests need a scratch PostgreSQL database, configured via the
//! `SWITCHBOARD_TEST_DB_*` environment variables (host/port/name/user/
//! password). Every test resets the schema, so point this at a throwaway
//! database.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use uuid::Uuid;

use switchboard_core::{CallerId, EntityIdType, NewLead, Timestamp};
use switchboard_engine::{AssignmentEngine, BusinessCalendar, ManualClock};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn test_pool() -> Pool {
    let mut cfg = Config::new();
    cfg.host = Some(env_or("SWITCHBOARD_TEST_DB_HOST", "localhost"));
    cfg.port = Some(
        env_or("SWITCHBOARD_TEST_DB_PORT", "5432")
            .parse()
            .expect("valid test db port"),
    );
    cfg.dbname = Some(env_or("SWITCHBOARD_TEST_DB_NAME", "switchboard_test"));
    cfg.user = Some(env_or("SWITCHBOARD_TEST_DB_USER", "postgres"));
    cfg.password = Some(env_or("SWITCHBOARD_TEST_DB_PASSWORD", ""));
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .expect("failed to create test pool")
}

/// Apply the schema and wipe all rows.
pub async fn reset_database(pool: &Pool) {
    let client = pool.get().await.expect("test db connection");
    client
        .batch_execute(switchboard_engine::SCHEMA_SQL)
        .await
        .expect("apply schema");
    client
        .batch_execute(
            "TRUNCATE assignments, leads, daily_counters, rr_pointers, caller_states, callers",
        )
        .await
        .expect("truncate tables");
}

/// Engine + manual clock over a fixed business timezone.
pub struct TestHarness {
    pub pool: Pool,
    pub engine: AssignmentEngine,
    pub clock: Arc<ManualClock>,
}

/// A mid-day instant so clock adjustments within a test stay on one
/// business date unless a test advances past midnight on purpose.
pub fn midday() -> Timestamp {
    DateTime::parse_from_rfc3339("2025-06-15T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub async fn harness() -> TestHarness {
    let pool = test_pool();
    reset_database(&pool).await;
    let clock = Arc::new(ManualClock::new(midday()));
    let calendar = BusinessCalendar::from_name("Asia/Kolkata").expect("test timezone");
    let engine = AssignmentEngine::new(calendar, clock.clone());
    TestHarness {
        pool,
        engine,
        clock,
    }
}

impl TestHarness {
    /// Advance the manual clock past the Kolkata midnight following the
    /// current instant.
    pub fn roll_to_next_business_date(&self) {
        self.clock.advance(Duration::hours(24));
    }
}

/// Insert a caller with explicit creation instants so the stable
/// `(created_at, id)` candidate order matches insertion order.
pub async fn create_caller(
    pool: &Pool,
    name: &str,
    states: &[&str],
    daily_limit: i32,
    created_offset_secs: i64,
) -> CallerId {
    let client = pool.get().await.expect("test db connection");
    let caller_id = CallerId::new_v4();
    let created_at = midday() - Duration::days(30) + Duration::seconds(created_offset_secs);
    client
        .execute(
            "INSERT INTO callers (id, name, languages, daily_limit, status, created_at, updated_at) \
             VALUES ($1, $2, '{}', $3, 'active', $4, $4)",
            &[&caller_id.as_uuid(), &name, &daily_limit, &created_at],
        )
        .await
        .expect("insert caller");
    for state in states {
        client
            .execute(
                "INSERT INTO caller_states (caller_id, state) VALUES ($1, $2)",
                &[&caller_id.as_uuid(), state],
            )
            .await
            .expect("insert caller state");
    }
    caller_id
}

pub async fn pause_caller(pool: &Pool, caller_id: CallerId) {
    let client = pool.get().await.expect("test db connection");
    client
        .execute(
            "UPDATE callers SET status = 'paused' WHERE id = $1",
            &[&caller_id.as_uuid()],
        )
        .await
        .expect("pause caller");
}

pub fn lead_payload(phone: &str, ts: &str, state: Option<&str>) -> NewLead {
    NewLead {
        name: Some(format!("Lead {}", phone)),
        phone: phone.to_string(),
        source_timestamp: DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
        lead_source: Some("sheet".to_string()),
        city: None,
        state: state.map(|s| s.to_string()),
        metadata: None,
    }
}

/// Run one assignment in its own committed transaction, as an ingestion
/// worker would.
pub async fn assign_committed(
    harness: &TestHarness,
    lead: &NewLead,
) -> (switchboard_core::Lead, switchboard_core::AssignmentOutcome) {
    let mut conn = harness.pool.get().await.expect("test db connection");
    let tx = conn.transaction().await.expect("begin");
    let result = harness.engine.assign(&tx, lead).await.expect("assign");
    tx.commit().await.expect("commit");
    result
}

pub async fn reassign_committed(
    harness: &TestHarness,
    lead_id: switchboard_core::LeadId,
    target: Option<CallerId>,
) -> (switchboard_core::Lead, switchboard_core::AssignmentOutcome) {
    let mut conn = harness.pool.get().await.expect("test db connection");
    let tx = conn.transaction().await.expect("begin");
    let result = harness
        .engine
        .reassign(&tx, lead_id, target)
        .await
        .expect("reassign");
    tx.commit().await.expect("commit");
    result
}

pub async fn counter_value(pool: &Pool, caller_id: CallerId, date: chrono::NaiveDate) -> i64 {
    let client = pool.get().await.expect("test db connection");
    let row = client
        .query_opt(
            "SELECT count FROM daily_counters WHERE caller_id = $1 AND business_date = $2",
            &[&caller_id.as_uuid(), &date],
        )
        .await
        .expect("query counter");
    row.map(|r| r.get(0)).unwrap_or(0)
}

pub async fn pointer_value(pool: &Pool, key: &str) -> Option<CallerId> {
    let client = pool.get().await.expect("test db connection");
    let row = client
        .query_opt(
            "SELECT last_caller_id FROM rr_pointers WHERE key = $1",
            &[&key],
        )
        .await
        .expect("query pointer");
    row.and_then(|r| r.get::<_, Option<Uuid>>(0)).map(CallerId::new)
}

/// Number of current (non-superseded) assignment rows for a lead.
pub async fn current_assignment_rows(pool: &Pool, lead_id: switchboard_core::LeadId) -> i64 {
    let client = pool.get().await.expect("test db connection");
    let row = client
        .query_one(
            "SELECT count(*) FROM assignments WHERE lead_id = $1 AND status <> 'superseded'",
            &[&lead_id.as_uuid()],
        )
        .await
        .expect("count assignments");
    row.get(0)
}
