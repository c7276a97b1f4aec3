//! Validator: datatype, range, and unit checks plus property expansion
//!
//! Takes one merged key/value set and a role, consults the property catalog
//! and unit registry, and produces resolved properties plus diagnostics.
//!
//! The validator is deliberately permissive: unknown keys and values with
//! datatype violations still pass through to rendering (the catalog cannot
//! be exhaustive, and enforcement policy belongs to the caller). The one
//! fatal diagnostic is a required property with no value and no applicable
//! default - rendering an incomplete required configuration would break the
//! managed software in ways a diagnostic cannot describe.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Datatype, PropertyCatalog, PropertyDefinition};
use crate::crd::SparkRole;
use crate::merge::{MergedConfig, ValueSource};
use crate::unit::UnitRegistry;
use crate::version::Version;

/// A configuration value after validation, with provenance
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedProperty {
    /// External name this value was supplied or injected under
    pub key: String,
    /// The resolved raw value
    pub value: String,
    /// Where the value came from
    pub source: ValueSource,
    /// Catalog id of the matched definition; `None` for pass-through keys
    pub definition: Option<String>,
}

/// A resolution-time finding for one role group
///
/// Serializable so the reconciliation caller can surface diagnostics as
/// status conditions. Only [`Diagnostic::MissingRequiredProperty`] is fatal,
/// and only for its own role group.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Diagnostic {
    /// The key matches no catalog binding; the value passes through unchanged
    UnknownProperty {
        /// The unmatched external name
        key: String,
    },
    /// The property exists but has no entry for this role
    PropertyNotApplicable {
        /// The external name
        key: String,
        /// The role the value was configured for
        role: SparkRole,
    },
    /// The value violates its datatype, range, or unit; rendered as-given
    InvalidValue {
        /// The external name
        key: String,
        /// The offending value
        value: String,
        /// What was violated
        reason: String,
    },
    /// A required property has no value and no default for the target version
    MissingRequiredProperty {
        /// Catalog id of the missing property
        property: String,
        /// The role it is required for
        role: SparkRole,
    },
}

impl Diagnostic {
    /// Whether this diagnostic aborts the role group's resolution
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingRequiredProperty { .. })
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProperty { key } => {
                write!(f, "unknown property '{key}', passed through unvalidated")
            }
            Self::PropertyNotApplicable { key, role } => {
                write!(f, "property '{key}' is not applicable to role '{role}'")
            }
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value '{value}' for '{key}': {reason}")
            }
            Self::MissingRequiredProperty { property, role } => write!(
                f,
                "required property '{property}' has no value and no default for role '{role}'"
            ),
        }
    }
}

/// Validates merged configuration against a property catalog
///
/// Pure: holds only shared read-only references and the parsed target
/// version. One instance serves all role groups of a resolution call.
pub struct ConfigValidator<'a> {
    catalog: &'a PropertyCatalog,
    units: &'a UnitRegistry,
    version: Version,
}

impl<'a> ConfigValidator<'a> {
    /// Create a validator for one target version
    pub fn new(catalog: &'a PropertyCatalog, units: &'a UnitRegistry, version: Version) -> Self {
        Self {
            catalog,
            units,
            version,
        }
    }

    /// Validate one role group's merged configuration
    ///
    /// Runs in four phases, in order:
    /// 1. Each explicit key is matched against the catalog and checked.
    /// 2. Expansion links add implied properties (transitively) unless the
    ///    target is already present with any value.
    /// 3. Required properties still missing get their version-gated default.
    /// 4. A required property with no applicable default becomes a fatal
    ///    [`Diagnostic::MissingRequiredProperty`].
    ///
    /// Phase order matters: an expansion-implied value satisfies a
    /// requirement without re-triggering the default, and expansion never
    /// overrides an explicitly supplied value.
    pub fn validate(
        &self,
        merged: &MergedConfig,
        role: SparkRole,
    ) -> (Vec<ResolvedProperty>, Vec<Diagnostic>) {
        let mut resolved: Vec<ResolvedProperty> = Vec::with_capacity(merged.len());
        let mut diagnostics = Vec::new();

        for entry in merged.iter() {
            match self.catalog.find_by_external_name(&entry.key) {
                None => {
                    diagnostics.push(Diagnostic::UnknownProperty {
                        key: entry.key.clone(),
                    });
                    resolved.push(ResolvedProperty {
                        key: entry.key.clone(),
                        value: entry.value.clone(),
                        source: entry.source,
                        definition: None,
                    });
                }
                Some(def) => {
                    if self.catalog.role_requirement(def, role).is_none() {
                        diagnostics.push(Diagnostic::PropertyNotApplicable {
                            key: entry.key.clone(),
                            role,
                        });
                    }
                    if let Some(reason) = self.check_value(def, &entry.value) {
                        diagnostics.push(Diagnostic::InvalidValue {
                            key: entry.key.clone(),
                            value: entry.value.clone(),
                            reason,
                        });
                    }
                    resolved.push(ResolvedProperty {
                        key: entry.key.clone(),
                        value: entry.value.clone(),
                        source: entry.source,
                        definition: Some(def.id.clone()),
                    });
                }
            }
        }

        self.expand(&mut resolved);
        self.inject_required_defaults(&mut resolved, &mut diagnostics, role);

        debug!(
            role = %role,
            resolved = resolved.len(),
            diagnostics = diagnostics.len(),
            "validated role group configuration"
        );
        (resolved, diagnostics)
    }

    /// Add expansion-implied properties until a fixpoint is reached
    ///
    /// Terminates because expansion links form a DAG (checked at catalog
    /// load) and each pass only adds properties not yet present.
    fn expand(&self, resolved: &mut Vec<ResolvedProperty>) {
        loop {
            let mut additions: Vec<ResolvedProperty> = Vec::new();
            for property in resolved.iter() {
                let Some(id) = &property.definition else {
                    continue;
                };
                let Some(def) = self.catalog.get(id) else {
                    continue;
                };
                for expansion in &def.expands_to {
                    let present = resolved
                        .iter()
                        .chain(additions.iter())
                        .any(|p| p.definition.as_deref() == Some(expansion.target.as_str()));
                    if present {
                        continue;
                    }
                    // Target existence is a load-time catalog invariant.
                    let Some(target) = self.catalog.get(&expansion.target) else {
                        continue;
                    };
                    additions.push(ResolvedProperty {
                        key: target.primary_external_name().to_string(),
                        value: expansion.value.clone(),
                        source: ValueSource::ExpandedDefault,
                        definition: Some(target.id.clone()),
                    });
                }
            }
            if additions.is_empty() {
                break;
            }
            resolved.extend(additions);
        }
    }

    /// Inject catalog defaults for required properties still missing
    fn inject_required_defaults(
        &self,
        resolved: &mut Vec<ResolvedProperty>,
        diagnostics: &mut Vec<Diagnostic>,
        role: SparkRole,
    ) {
        for def in self.catalog.definitions() {
            let Some(requirement) = self.catalog.role_requirement(def, role) else {
                continue;
            };
            if !requirement.required {
                continue;
            }
            let present = resolved
                .iter()
                .any(|p| p.definition.as_deref() == Some(def.id.as_str()));
            if present {
                continue;
            }
            match self.catalog.resolve_default(def, &self.version) {
                Some(default) => resolved.push(ResolvedProperty {
                    key: def.primary_external_name().to_string(),
                    value: default.value.clone(),
                    source: ValueSource::SchemaDefault,
                    definition: Some(def.id.clone()),
                }),
                None => diagnostics.push(Diagnostic::MissingRequiredProperty {
                    property: def.id.clone(),
                    role,
                }),
            }
        }
    }

    /// Check a raw value against the definition's datatype constraints
    ///
    /// Returns the violation reason, or `None` when the value is fine.
    fn check_value(&self, def: &PropertyDefinition, raw: &str) -> Option<String> {
        match &def.datatype {
            Datatype::Integer { min, max, unit } => {
                let parsed: i64 = match raw.parse() {
                    Ok(n) => n,
                    Err(_) => return Some("not an integer".to_string()),
                };
                if let Some(min) = min {
                    if parsed < *min {
                        return Some(format!("below minimum {min}"));
                    }
                }
                if let Some(max) = max {
                    if parsed > *max {
                        return Some(format!("above maximum {max}"));
                    }
                }
                self.check_unit(unit.as_deref(), raw)
            }
            Datatype::String { unit } => self.check_unit(unit.as_deref(), raw),
            Datatype::Bool => {
                if raw == "true" || raw == "false" {
                    None
                } else {
                    Some("expected 'true' or 'false'".to_string())
                }
            }
        }
    }

    fn check_unit(&self, unit: Option<&str>, raw: &str) -> Option<String> {
        let unit = unit?;
        if self.units.validate(unit, raw) {
            None
        } else {
            Some(format!("does not match unit '{unit}'"))
        }
    }
}
