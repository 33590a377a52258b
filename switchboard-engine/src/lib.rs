//! Switchboard Engine - Transactional Lead Assignment
//!
//! The core of the routing service: given an incoming lead and an open
//! PostgreSQL transaction, select an eligible caller under state routing,
//! daily caps, and round-robin fairness, and commit the lead together with
//! its assignment, fairness pointer, and per-caller counter as one
//! indivisible unit.
//!
//! All coordination between concurrent workers happens through row-level
//! locks in the database; there is no in-process shared mutable state.

pub mod calendar;
pub mod counters;
pub mod directory;
pub mod engine;
pub mod error;
pub mod fairness;

pub use calendar::{BusinessCalendar, Clock, ManualClock, SystemClock};
pub use directory::CallerCandidate;
pub use engine::{rotate_after, AssignmentEngine};
pub use error::{EngineError, EngineResult};

/// Logical schema for the tables the engine owns. Integration tests apply
/// this to a scratch database.
pub const SCHEMA_SQL: &str = include_str!("../schema.sql");
