//! Unit Registry: named, reusable value-shape validators
//!
//! A unit is a named regex with illustrative examples, e.g. "port" or
//! "memory". Property definitions reference units by name; the catalog
//! loader rejects dangling references, so an unknown unit at validation
//! time is answered with a plain `false` rather than a panic.
//!
//! Matching is always a full-string match: patterns are anchored when the
//! unit is constructed.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Serializable unit definition, as supplied at process startup
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefinition {
    /// Unit name referenced by property datatypes
    pub name: String,
    /// Regex the raw value must fully match
    pub pattern: String,
    /// Illustrative example values, in documentation order
    #[serde(default)]
    pub examples: Vec<String>,
}

/// A compiled unit validator
#[derive(Clone, Debug)]
pub struct Unit {
    name: String,
    pattern: Regex,
    examples: Vec<String>,
}

impl Unit {
    /// Compile a unit from a name and pattern
    ///
    /// The pattern is anchored so validation is a full-string match, never
    /// a substring search. An unparsable pattern is a catalog authoring
    /// error surfaced at load time.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        examples: Vec<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let anchored = format!("^(?:{pattern})$");
        let pattern = Regex::new(&anchored).map_err(|e| CatalogError::InvalidUnitPattern {
            unit: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name,
            pattern,
            examples,
        })
    }

    /// The unit's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Illustrative example values for diagnostics and documentation
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Check a raw value against this unit's pattern (full-string match)
    pub fn matches(&self, raw: &str) -> bool {
        self.pattern.is_match(raw)
    }
}

/// Registry of units, looked up by name
///
/// Pure and stateless after construction; shared read-only across
/// concurrent resolution calls.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    units: BTreeMap<String, Unit>,
}

impl UnitRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register a set of unit definitions
    pub fn load(definitions: Vec<UnitDefinition>) -> Result<Self, CatalogError> {
        let mut registry = Self::new();
        for def in definitions {
            registry.register(Unit::new(def.name, &def.pattern, def.examples)?);
        }
        Ok(registry)
    }

    /// Register a unit, replacing any previous unit with the same name
    pub fn register(&mut self, unit: Unit) {
        self.units.insert(unit.name().to_string(), unit);
    }

    /// Look up a unit by name
    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    /// Whether a unit with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Validate a raw value against the named unit
    ///
    /// Returns `false` for an unregistered unit name. Callers must treat an
    /// unregistered unit as a catalog integrity error at load time; this
    /// method never panics.
    pub fn validate(&self, unit_name: &str, raw: &str) -> bool {
        match self.units.get(unit_name) {
            Some(unit) => unit.matches(raw),
            None => false,
        }
    }

    /// The unit set the Spark property schema uses
    ///
    /// Patterns follow what the managed software actually accepts: ports are
    /// 0-65535, memory sizes are a count plus optional binary suffix,
    /// durations carry an explicit time suffix.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtin = [
            (
                "port",
                r"([0-9]{1,4}|[1-5][0-9]{4}|6[0-4][0-9]{3}|65[0-4][0-9]{2}|655[0-2][0-9]|6553[0-5])",
                vec!["7077", "18080"],
            ),
            (
                "memory",
                r"[0-9]+([kmgtp]b?|b)?",
                vec!["512m", "2g", "1024"],
            ),
            ("directory", r"(/[\w.-]+)+/?", vec!["/tmp/spark-events"]),
            ("password", r"[a-zA-Z]\w{5,40}", vec!["mysecret1"]),
            ("duration", r"[0-9]+(ms|s|m|h|d)", vec!["30s", "5m"]),
            (
                "uri",
                r"[a-zA-Z][a-zA-Z0-9+.-]*://[^\s]+",
                vec!["hdfs://namenode:9000/logs"],
            ),
        ];
        for (name, pattern, examples) in builtin {
            let examples = examples.into_iter().map(String::from).collect();
            // Patterns are static and known-good; a failure here is a bug.
            let unit = Unit::new(name, pattern, examples)
                .unwrap_or_else(|e| panic!("builtin unit '{name}' must compile: {e}"));
            registry.register(unit);
        }
        registry
    }
}
