//! Domain types for fleetgate.
//!
//! An [`Instance`] is an opaque identity (name + address) for a remotely
//! managed service endpoint. A [`StatusSnapshot`] is one observation of
//! that endpoint's state, refreshed externally once per polling iteration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Unique identifier for an instance within a fleet (its configured name).
pub type InstanceId = String;

// ── Instance ──────────────────────────────────────────────────────

/// A remotely managed service endpoint being awaited into a target
/// condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    /// Fleet-unique name, e.g. "author" or "api-1".
    pub name: InstanceId,
    /// Listen address (host:port) of the status endpoint.
    pub address: String,
}

impl Instance {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
        }
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

// ── Status snapshot ───────────────────────────────────────────────

/// One observation of an instance's operational state.
///
/// `components` is an ordered map so that two snapshots with the same
/// flags always hash to the same [`fingerprint`](Self::fingerprint).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StatusSnapshot {
    /// Whether the status endpoint answered at all.
    pub reachable: bool,
    /// Coarse lifecycle phase reported by the instance, e.g. "starting",
    /// "ready", "stopping".
    pub state: String,
    /// Sub-component readiness flags, e.g. {"db": true, "queue": false}.
    pub components: BTreeMap<String, bool>,
}

impl StatusSnapshot {
    /// A snapshot for an instance that answered its status endpoint.
    pub fn reachable(state: &str, components: BTreeMap<String, bool>) -> Self {
        Self {
            reachable: true,
            state: state.to_string(),
            components,
        }
    }

    /// A snapshot for an instance known to be down (used by sources that
    /// report absence as data rather than as a fetch error).
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            state: String::new(),
            components: BTreeMap::new(),
        }
    }

    /// Structural hash over every observable field, used for change
    /// detection by the stability checks.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Whether every reported component is up.
    pub fn all_components_up(&self) -> bool {
        self.components.values().all(|up| *up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(state: &str, flags: &[(&str, bool)]) -> StatusSnapshot {
        let components = flags
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        StatusSnapshot::reachable(state, components)
    }

    #[test]
    fn fingerprint_stable_for_equal_snapshots() {
        let a = snapshot("ready", &[("db", true), ("queue", true)]);
        let b = snapshot("ready", &[("queue", true), ("db", true)]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_on_state_change() {
        let a = snapshot("starting", &[("db", true)]);
        let b = snapshot("ready", &[("db", true)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_on_component_flip() {
        let a = snapshot("ready", &[("db", true)]);
        let b = snapshot("ready", &[("db", false)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn unreachable_differs_from_reachable() {
        let up = snapshot("ready", &[]);
        let down = StatusSnapshot::unreachable();
        assert!(!down.reachable);
        assert_ne!(up.fingerprint(), down.fingerprint());
    }

    #[test]
    fn all_components_up() {
        assert!(snapshot("ready", &[("db", true), ("queue", true)]).all_components_up());
        assert!(!snapshot("ready", &[("db", true), ("queue", false)]).all_components_up());
        assert!(snapshot("ready", &[]).all_components_up());
    }

    #[test]
    fn instance_display() {
        let inst = Instance::new("author", "127.0.0.1:4502");
        assert_eq!(inst.to_string(), "author (127.0.0.1:4502)");
    }
}
