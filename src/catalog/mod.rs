//! Property Catalog: versioned property definitions and catalog loading
//!
//! The catalog is the schema of everything the managed software understands:
//! each property names its external bindings (config file key or environment
//! variable), a datatype with optional unit and range, role applicability,
//! version-gated default and recommended values, and expansion links to
//! properties it implies.
//!
//! Catalogs are loaded once at process startup and shared read-only across
//! all resolution calls. Loading validates catalog integrity; a broken
//! catalog must never reach resolution.

mod spark;

pub use spark::spark_defaults;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crd::SparkRole;
use crate::error::CatalogError;
use crate::unit::UnitRegistry;
use crate::version::Version;

/// Where a bound external name is written at render time
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DestinationKind {
    /// A key in a properties-style config file (`key=value`)
    File,
    /// A shell-style environment assignment (`KEY="value"`)
    EnvironmentVariable,
}

/// A single external name a property is bound to
///
/// One property may carry several bindings (a legacy name next to the
/// current one); every binding receives the resolved value when rendered.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBinding {
    /// The external property name as the managed software reads it
    pub external_name: String,
    /// Destination artifact kind
    pub kind: DestinationKind,
    /// Destination file name
    ///
    /// Required for `File` bindings (enforced at load). Environment
    /// bindings default to the cluster environment artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl PropertyBinding {
    /// Bind a key in the given properties-style config file
    pub fn file(external_name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            external_name: external_name.into(),
            kind: DestinationKind::File,
            file: Some(file.into()),
        }
    }

    /// Bind an environment variable in the default environment artifact
    pub fn env(external_name: impl Into<String>) -> Self {
        Self {
            external_name: external_name.into(),
            kind: DestinationKind::EnvironmentVariable,
            file: None,
        }
    }

    /// The artifact file this binding renders into
    ///
    /// Load-time validation guarantees `File` bindings carry a file name;
    /// environment bindings fall back to the default environment artifact.
    pub fn artifact(&self) -> &str {
        match self.kind {
            DestinationKind::File => self.file.as_deref().unwrap_or(crate::SPARK_DEFAULTS_CONF),
            DestinationKind::EnvironmentVariable => {
                self.file.as_deref().unwrap_or(crate::SPARK_ENV_SH)
            }
        }
    }
}

/// A value that applies within a range of target versions
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionedValue {
    /// First version (inclusive) this value applies to
    pub valid_from: Version,
    /// Last version (inclusive) this value applies to; open-ended when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Version>,
    /// The value itself, always carried as a string
    pub value: String,
}

impl VersionedValue {
    /// A value valid from the given version onward
    pub fn from_version(valid_from: Version, value: impl Into<String>) -> Self {
        Self {
            valid_from,
            valid_until: None,
            value: value.into(),
        }
    }

    /// Whether this value's range contains the target version
    pub fn contains(&self, target: &Version) -> bool {
        self.valid_from <= *target
            && self.valid_until.map_or(true, |until| *target <= until)
    }

    fn overlaps(&self, other: &Self) -> bool {
        let self_open = self.valid_until.map_or(true, |u| other.valid_from <= u);
        let other_open = other.valid_until.map_or(true, |u| self.valid_from <= u);
        self_open && other_open
    }
}

/// Whether a role may or must set a property
///
/// A property carries one entry per role that may use it; a role without an
/// entry cannot meaningfully set the property.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequirement {
    /// The role this entry applies to
    pub role: SparkRole,
    /// Whether the property must resolve to a value for this role
    #[serde(default)]
    pub required: bool,
}

/// An expansion link: setting this property implies a value for another
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expansion {
    /// Id of the implied property
    pub target: String,
    /// The implied value, used unless the target is set explicitly
    pub value: String,
}

/// Datatype of a property, with optional range and unit constraints
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Datatype {
    /// Whole number, optionally bounded and unit-constrained
    Integer {
        /// Inclusive lower bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// Inclusive upper bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        /// Unit the raw value must match
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Free-form string, optionally unit-constrained
    String {
        /// Unit the raw value must match
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Boolean, "true" or "false"
    Bool,
}

impl Datatype {
    /// The unit this datatype references, if any
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Integer { unit, .. } | Self::String { unit } => unit.as_deref(),
            Self::Bool => None,
        }
    }
}

/// A versioned property definition
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    /// Stable catalog-unique id, used by expansion links
    pub id: String,
    /// External name bindings; all receive the resolved value when rendered
    pub bindings: Vec<PropertyBinding>,
    /// Datatype with optional range and unit
    pub datatype: Datatype,
    /// Version-gated default values, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<VersionedValue>,
    /// Version-gated recommended values, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended: Vec<VersionedValue>,
    /// Role applicability; roles absent here cannot use the property
    pub roles: Vec<RoleRequirement>,
    /// Version the managed software introduced this property in
    pub introduced_in: Version,
    /// Properties implied by setting this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expands_to: Vec<Expansion>,
}

impl PropertyDefinition {
    /// The external name diagnostics and injected values are reported under
    pub fn primary_external_name(&self) -> &str {
        self.bindings
            .first()
            .map(|b| b.external_name.as_str())
            .unwrap_or(&self.id)
    }
}

/// The loaded, validated property catalog
///
/// Immutable after load; safely shared by read-only reference across
/// concurrent resolution calls.
#[derive(Clone, Debug)]
pub struct PropertyCatalog {
    definitions: Vec<PropertyDefinition>,
    by_id: HashMap<String, usize>,
    by_external_name: HashMap<String, usize>,
}

impl PropertyCatalog {
    /// Load and validate a set of property definitions
    ///
    /// Fails on the first integrity violation: duplicate bindings for the
    /// same file, unusable bindings, dangling unit or expansion references,
    /// expansion cycles, or values predating their property. Overlapping
    /// version ranges are an authoring smell, not an error; they are
    /// reported once per property via `tracing::warn!`.
    pub fn load(
        definitions: Vec<PropertyDefinition>,
        units: &UnitRegistry,
    ) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::new();
        let mut by_external_name = HashMap::new();
        let mut bound_names: HashSet<(String, String)> = HashSet::new();

        for (index, def) in definitions.iter().enumerate() {
            if by_id.insert(def.id.clone(), index).is_some() {
                return Err(CatalogError::invalid_binding(
                    &def.id,
                    "duplicate property id",
                ));
            }

            if def.bindings.is_empty() {
                return Err(CatalogError::invalid_binding(
                    &def.id,
                    "property declares no bindings",
                ));
            }
            for binding in &def.bindings {
                if binding.kind == DestinationKind::File && binding.file.is_none() {
                    return Err(CatalogError::invalid_binding(
                        &def.id,
                        format!(
                            "file binding '{}' names no destination file",
                            binding.external_name
                        ),
                    ));
                }
                let slot = (binding.external_name.clone(), binding.artifact().to_string());
                if !bound_names.insert(slot) {
                    return Err(CatalogError::DuplicateBinding {
                        external_name: binding.external_name.clone(),
                        file: binding.artifact().to_string(),
                    });
                }
                // First definition wins for name lookup; duplicates across
                // different files are legal and rare.
                by_external_name
                    .entry(binding.external_name.clone())
                    .or_insert(index);
            }

            if let Some(unit) = def.datatype.unit() {
                if !units.contains(unit) {
                    return Err(CatalogError::UnknownUnit {
                        property: def.id.clone(),
                        unit: unit.to_string(),
                    });
                }
            }

            for value in def.defaults.iter().chain(def.recommended.iter()) {
                if value.valid_from < def.introduced_in {
                    return Err(CatalogError::DefaultBeforeIntroduced {
                        property: def.id.clone(),
                        valid_from: value.valid_from.to_string(),
                        introduced_in: def.introduced_in.to_string(),
                    });
                }
            }
            warn_on_overlap(&def.id, "defaults", &def.defaults);
            warn_on_overlap(&def.id, "recommended", &def.recommended);
        }

        for def in &definitions {
            for expansion in &def.expands_to {
                if !by_id.contains_key(&expansion.target) {
                    return Err(CatalogError::UnknownExpansionTarget {
                        property: def.id.clone(),
                        target: expansion.target.clone(),
                    });
                }
            }
        }

        let catalog = Self {
            definitions,
            by_id,
            by_external_name,
        };
        catalog.check_expansion_cycles()?;
        Ok(catalog)
    }

    /// Load a catalog from a YAML definition file
    ///
    /// The document is a sequence of property definitions.
    pub fn from_yaml(input: &str, units: &UnitRegistry) -> crate::Result<Self> {
        let value = crate::yaml::parse_yaml(input)?;
        let definitions: Vec<PropertyDefinition> = serde_json::from_value(value)
            .map_err(|e| crate::Error::serialization(e.to_string()))?;
        Ok(Self::load(definitions, units)?)
    }

    /// Expansion links must form a DAG; a cycle is an authoring error.
    fn check_expansion_cycles(&self) -> Result<(), CatalogError> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            catalog: &PropertyCatalog,
            id: &str,
            states: &mut HashMap<String, State>,
        ) -> Result<(), CatalogError> {
            match states.get(id).copied().unwrap_or(State::Unvisited) {
                State::Done => return Ok(()),
                State::InProgress => {
                    return Err(CatalogError::ExpansionCycle {
                        property: id.to_string(),
                    })
                }
                State::Unvisited => {}
            }
            states.insert(id.to_string(), State::InProgress);
            if let Some(def) = catalog.get(id) {
                for expansion in &def.expands_to {
                    visit(catalog, &expansion.target, states)?;
                }
            }
            states.insert(id.to_string(), State::Done);
            Ok(())
        }

        let mut states = HashMap::new();
        for def in &self.definitions {
            visit(self, &def.id, &mut states)?;
        }
        Ok(())
    }

    /// All property definitions, in declaration order
    pub fn definitions(&self) -> &[PropertyDefinition] {
        &self.definitions
    }

    /// Look up a definition by id
    pub fn get(&self, id: &str) -> Option<&PropertyDefinition> {
        self.by_id.get(id).map(|&i| &self.definitions[i])
    }

    /// Look up a definition by matching any of its external binding names
    pub fn find_by_external_name(&self, name: &str) -> Option<&PropertyDefinition> {
        self.by_external_name.get(name).map(|&i| &self.definitions[i])
    }

    /// The requirement entry for a role, if the property applies to it
    pub fn role_requirement<'a>(
        &self,
        def: &'a PropertyDefinition,
        role: SparkRole,
    ) -> Option<&'a RoleRequirement> {
        def.roles.iter().find(|r| r.role == role)
    }

    /// Resolve the default value for a target version
    ///
    /// Explicit ordered scan: the last declared entry whose range contains
    /// the target wins, so overlapping ranges resolve deterministically.
    pub fn resolve_default<'a>(
        &self,
        def: &'a PropertyDefinition,
        target: &Version,
    ) -> Option<&'a VersionedValue> {
        def.defaults.iter().filter(|v| v.contains(target)).last()
    }

    /// Resolve the recommended value for a target version
    ///
    /// Same scan order as [`Self::resolve_default`].
    pub fn resolve_recommended<'a>(
        &self,
        def: &'a PropertyDefinition,
        target: &Version,
    ) -> Option<&'a VersionedValue> {
        def.recommended.iter().filter(|v| v.contains(target)).last()
    }
}

fn warn_on_overlap(property: &str, which: &str, values: &[VersionedValue]) {
    for (i, a) in values.iter().enumerate() {
        for b in values.iter().skip(i + 1) {
            if a.overlaps(b) {
                warn!(
                    property,
                    which,
                    "overlapping version ranges; the last declared match wins"
                );
                return;
            }
        }
    }
}
