//! Enum types for switchboard entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CALLER ENUMS
// ============================================================================

/// Status of a caller (human sales agent).
///
/// A paused caller receives no new assignments but keeps all historical
/// ones. Deleting a caller is modeled as a transition to `Paused` so
/// past assignments stay referentially intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CallerStatus {
    #[default]
    Active,
    Paused,
}

impl CallerStatus {
    /// Database / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerStatus::Active => "active",
            CallerStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for CallerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CallerStatus::Active),
            "paused" => Ok(CallerStatus::Paused),
            other => Err(UnknownVariant::new("caller_status", other)),
        }
    }
}

// ============================================================================
// ASSIGNMENT ENUMS
// ============================================================================

/// Status of an assignment row.
///
/// Exactly one non-`Superseded` row exists per lead at any time; manual
/// reassignment flips the previous row to `Superseded` and inserts a new
/// current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Unassigned,
    Superseded,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Unassigned => "unassigned",
            AssignmentStatus::Superseded => "superseded",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(AssignmentStatus::Assigned),
            "unassigned" => Ok(AssignmentStatus::Unassigned),
            "superseded" => Ok(AssignmentStatus::Superseded),
            other => Err(UnknownVariant::new("assignment_status", other)),
        }
    }
}

/// Why a lead landed on a particular caller, or on nobody.
///
/// Closed set; the wire representation is stable and consumed by the
/// dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentReason {
    /// Chosen by round robin among callers bound to the lead's state.
    StateRoundRobin,
    /// Chosen by round robin among all active callers (global fallback).
    GlobalRoundRobin,
    /// Operator explicitly moved the lead to a caller.
    ManualReassign,
    /// Every candidate had exhausted its daily cap.
    UnassignedCapReached,
    /// No active caller exists at all.
    UnassignedNoEligible,
}

impl AssignmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentReason::StateRoundRobin => "state_round_robin",
            AssignmentReason::GlobalRoundRobin => "global_round_robin",
            AssignmentReason::ManualReassign => "manual_reassign",
            AssignmentReason::UnassignedCapReached => "unassigned_cap_reached",
            AssignmentReason::UnassignedNoEligible => "unassigned_no_eligible",
        }
    }

    /// Whether this reason pairs with an `Unassigned` status.
    pub fn is_unassigned(&self) -> bool {
        matches!(
            self,
            AssignmentReason::UnassignedCapReached | AssignmentReason::UnassignedNoEligible
        )
    }
}

impl fmt::Display for AssignmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentReason {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "state_round_robin" => Ok(AssignmentReason::StateRoundRobin),
            "global_round_robin" => Ok(AssignmentReason::GlobalRoundRobin),
            "manual_reassign" => Ok(AssignmentReason::ManualReassign),
            "unassigned_cap_reached" => Ok(AssignmentReason::UnassignedCapReached),
            "unassigned_no_eligible" => Ok(AssignmentReason::UnassignedNoEligible),
            other => Err(UnknownVariant::new("assignment_reason", other)),
        }
    }
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// Error returned when a stored string does not match any enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_round_trip() {
        for reason in [
            AssignmentReason::StateRoundRobin,
            AssignmentReason::GlobalRoundRobin,
            AssignmentReason::ManualReassign,
            AssignmentReason::UnassignedCapReached,
            AssignmentReason::UnassignedNoEligible,
        ] {
            let parsed: AssignmentReason = reason.as_str().parse().expect("round trip");
            assert_eq!(parsed, reason);
        }
    }

    #[test]
    fn test_reason_serde_matches_as_str() {
        let json = serde_json::to_string(&AssignmentReason::UnassignedCapReached).unwrap();
        assert_eq!(json, "\"unassigned_cap_reached\"");
    }

    #[test]
    fn test_unassigned_reasons() {
        assert!(AssignmentReason::UnassignedCapReached.is_unassigned());
        assert!(AssignmentReason::UnassignedNoEligible.is_unassigned());
        assert!(!AssignmentReason::StateRoundRobin.is_unassigned());
        assert!(!AssignmentReason::ManualReassign.is_unassigned());
    }

    #[test]
    fn test_unknown_variant() {
        let err = "banana".parse::<CallerStatus>().unwrap_err();
        assert_eq!(err.kind, "caller_status");
        assert_eq!(err.value, "banana");
    }
}
