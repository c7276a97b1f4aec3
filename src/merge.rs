//! Config Tier Merger
//!
//! Combines the common, role, and role-group configuration tiers into one
//! resolved key/value set per role group. Precedence on key collision, high
//! to low: role-group > role > common.
//!
//! Raw `configOverrides` are deliberately NOT merged here. They bypass
//! validation entirely and are applied by the renderer as the final step,
//! so an override can replace a value the validator accepted. That two-stage
//! precedence is part of the engine's contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provenance of a resolved configuration value
///
/// Recorded per key for diagnostics and precedence auditing.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValueSource {
    /// Raw `configOverrides` entry applied at render time, never validated
    ExplicitOverride,
    /// Role-group tier config (highest merge precedence)
    RoleGroupConfig,
    /// Role tier config
    RoleConfig,
    /// Cluster-wide common tier config
    CommonConfig,
    /// Value implied by another property's expansion link
    ExpandedDefault,
    /// Version-gated catalog default injected for a required property
    SchemaDefault,
}

/// One merged key/value pair with its winning tier
#[derive(Clone, Debug, PartialEq)]
pub struct MergedEntry {
    /// External property name as written in the spec
    pub key: String,
    /// The winning raw value
    pub value: String,
    /// The tier that supplied the winning value
    pub source: ValueSource,
}

/// An insertion-ordered key/value set produced by the tier merge
///
/// First-seen key order is contractual: the renderer emits lines in this
/// order so repeated resolutions produce byte-identical artifacts and
/// minimal diffs. A later insert for an existing key replaces the value in
/// place without moving the key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedConfig {
    entries: Vec<MergedEntry>,
}

impl MergedConfig {
    /// Create an empty merged config
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing any existing value for the key
    ///
    /// The key keeps its original position; value and source are updated.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, source: ValueSource) {
        let key = key.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.value = value.into();
                entry.source = source;
            }
            None => self.entries.push(MergedEntry {
                key,
                value: value.into(),
                source,
            }),
        }
    }

    /// Look up the value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Whether the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Iterate entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &MergedEntry> {
        self.entries.iter()
    }

    /// Number of merged keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the merge produced no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge the three configuration tiers for one role group
///
/// Keys are inserted lowest tier first so higher tiers override in place;
/// key order within a tier follows the spec's map order (BTreeMap, so
/// deterministic).
pub fn merge(
    common: &BTreeMap<String, String>,
    role: &BTreeMap<String, String>,
    role_group: &BTreeMap<String, String>,
) -> MergedConfig {
    let mut merged = MergedConfig::new();
    for (key, value) in common {
        merged.insert(key, value, ValueSource::CommonConfig);
    }
    for (key, value) in role {
        merged.insert(key, value, ValueSource::RoleConfig);
    }
    for (key, value) in role_group {
        merged.insert(key, value, ValueSource::RoleGroupConfig);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Story: role-group config wins over role config wins over common
    #[test]
    fn story_precedence_role_group_over_role_over_common() {
        let merged = merge(
            &map(&[("x", "1"), ("only.common", "c")]),
            &map(&[("x", "role"), ("only.role", "r")]),
            &map(&[("x", "2")]),
        );

        assert_eq!(merged.get("x"), Some("2"));
        assert_eq!(merged.get("only.common"), Some("c"));
        assert_eq!(merged.get("only.role"), Some("r"));
        assert_eq!(merged.len(), 3);
    }

    /// Story: the winning tier is recorded for provenance
    #[test]
    fn story_winning_tier_is_recorded() {
        let merged = merge(
            &map(&[("x", "1"), ("y", "1")]),
            &map(&[("y", "2")]),
            &map(&[("z", "3")]),
        );

        let sources: Vec<_> = merged.iter().map(|e| (e.key.as_str(), e.source)).collect();
        assert_eq!(
            sources,
            vec![
                ("x", ValueSource::CommonConfig),
                ("y", ValueSource::RoleConfig),
                ("z", ValueSource::RoleGroupConfig),
            ]
        );
    }

    /// Story: an overridden key keeps its first-seen position
    ///
    /// Re-resolving must not shuffle lines in the rendered artifact just
    /// because a higher tier overrode a value.
    #[test]
    fn story_override_keeps_first_seen_order() {
        let merged = merge(
            &map(&[("a", "1"), ("b", "1"), ("c", "1")]),
            &map(&[]),
            &map(&[("b", "2")]),
        );

        let keys: Vec<_> = merged.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(merged.get("b"), Some("2"));
    }

    /// Story: merging empty tiers yields an empty set
    #[test]
    fn story_empty_tiers_merge_to_empty() {
        let merged = merge(&map(&[]), &map(&[]), &map(&[]));
        assert!(merged.is_empty());
    }
}
