//! Routing keys for round-robin fairness pointers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize a raw lead state for routing purposes.
///
/// Trims whitespace and lowercases so `"Maharashtra"` and `"maharashtra "`
/// share a fairness pointer. Returns `None` for absent or blank input,
/// which routes the lead globally.
pub fn normalize_state(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

/// Identifies which fairness pointer governs a selection.
///
/// Stringified as `state:<lowercased_state_name>` or the literal `global`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RoutingKey {
    /// Per-state rotation; the payload is an already-normalized state name.
    State(String),
    /// The single global rotation shared by all active callers.
    Global,
}

impl RoutingKey {
    /// Build the key for a raw (possibly unnormalized) lead state.
    pub fn for_state(raw: Option<&str>) -> Self {
        match normalize_state(raw) {
            Some(state) => RoutingKey::State(state),
            None => RoutingKey::Global,
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingKey::State(state) => write!(f, "state:{}", state),
            RoutingKey::Global => f.write_str("global"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_state() {
        assert_eq!(
            normalize_state(Some("Maharashtra")),
            Some("maharashtra".to_string())
        );
        assert_eq!(
            normalize_state(Some("  maharashtra  ")),
            Some("maharashtra".to_string())
        );
        assert_eq!(normalize_state(Some("   ")), None);
        assert_eq!(normalize_state(Some("")), None);
        assert_eq!(normalize_state(None), None);
    }

    #[test]
    fn test_routing_key_display() {
        assert_eq!(RoutingKey::for_state(Some("Karnataka ")).to_string(), "state:karnataka");
        assert_eq!(RoutingKey::for_state(None).to_string(), "global");
        assert_eq!(RoutingKey::for_state(Some("  ")).to_string(), "global");
    }

    #[test]
    fn test_equivalent_spellings_share_a_key() {
        assert_eq!(
            RoutingKey::for_state(Some("Maharashtra")),
            RoutingKey::for_state(Some("maharashtra "))
        );
    }
}
