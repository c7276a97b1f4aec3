//! Configuration engine: pipeline orchestration over a whole cluster spec
//!
//! The engine is the crate's public entry point. A reconciliation loop
//! (or a test) hands it a [`SparkClusterSpec`]; it runs merge, validation,
//! and rendering per role group and returns the rendered artifacts plus
//! diagnostics.
//!
//! # Usage
//!
//! ```text
//! let units = UnitRegistry::builtin();
//! let catalog = catalog::spark_defaults(&units)?;
//! let engine = ConfigEngine::new(&catalog, &units);
//! let compiled = engine.compile(&cluster.spec)?;
//! // compiled.file(SparkRole::Master, "default", "spark-env.sh")
//! ```
//!
//! # Concurrency
//!
//! The engine holds only shared read-only references and performs no I/O.
//! Role groups are resolved independently; callers may shard groups across
//! worker tasks and compute them in parallel. Within one group the stages
//! run strictly in sequence, each consuming the previous stage's output.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::PropertyCatalog;
use crate::crd::{SparkClusterSpec, SparkRole};
use crate::merge::merge;
use crate::render::render;
use crate::unit::UnitRegistry;
use crate::validate::{ConfigValidator, Diagnostic};
use crate::version::Version;

/// Resolved output for a single role group
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleGroupConfig {
    /// Rendered artifact contents, keyed by file name
    ///
    /// Empty when resolution hit a fatal diagnostic: an incomplete required
    /// configuration must not be rendered.
    pub files: BTreeMap<String, String>,
    /// Resolution findings for this group, in discovery order
    pub diagnostics: Vec<Diagnostic>,
}

impl RoleGroupConfig {
    /// Whether a fatal diagnostic withheld this group's artifacts
    pub fn has_fatal_diagnostics(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

/// Output of compiling a whole SparkCluster spec
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledClusterConfig {
    /// Per-role-group output, keyed by (role, group name)
    pub groups: BTreeMap<(SparkRole, String), RoleGroupConfig>,
}

impl CompiledClusterConfig {
    /// Look up one role group's output
    pub fn group(&self, role: SparkRole, name: &str) -> Option<&RoleGroupConfig> {
        self.groups.get(&(role, name.to_string()))
    }

    /// Look up one rendered file for a role group
    pub fn file(&self, role: SparkRole, group: &str, file: &str) -> Option<&str> {
        self.group(role, group)
            .and_then(|g| g.files.get(file))
            .map(String::as_str)
    }

    /// Whether any role group hit a fatal diagnostic
    pub fn has_fatal_diagnostics(&self) -> bool {
        self.groups.values().any(RoleGroupConfig::has_fatal_diagnostics)
    }

    /// All diagnostics across role groups, with their group keys
    pub fn diagnostics(&self) -> impl Iterator<Item = (&(SparkRole, String), &Diagnostic)> {
        self.groups
            .iter()
            .flat_map(|(key, group)| group.diagnostics.iter().map(move |d| (key, d)))
    }
}

/// The configuration resolution engine
///
/// A pure function from `(ClusterSpec, PropertyCatalog, UnitRegistry)` to
/// rendered artifacts. Construct once per catalog and share freely; every
/// call is independent and the engine holds no mutable state.
pub struct ConfigEngine<'a> {
    catalog: &'a PropertyCatalog,
    units: &'a UnitRegistry,
}

impl<'a> ConfigEngine<'a> {
    /// Create an engine over a loaded catalog and unit registry
    pub fn new(catalog: &'a PropertyCatalog, units: &'a UnitRegistry) -> Self {
        Self { catalog, units }
    }

    /// Resolve and render every role group of a cluster spec
    ///
    /// Fails only when the spec's target version does not parse; everything
    /// else is reported per role group via diagnostics. A role group with a
    /// fatal diagnostic gets no rendered files; other groups are unaffected.
    pub fn compile(&self, spec: &SparkClusterSpec) -> crate::Result<CompiledClusterConfig> {
        let version: Version = spec.version.parse()?;
        let validator = ConfigValidator::new(self.catalog, self.units, version);

        let mut groups = BTreeMap::new();
        for (role, role_spec) in &spec.roles {
            for (group_name, group_spec) in &role_spec.role_groups {
                let merged = merge(&spec.config, &role_spec.config, &group_spec.config);
                let (resolved, diagnostics) = validator.validate(&merged, *role);

                let fatal = diagnostics.iter().any(Diagnostic::is_fatal);
                let files = if fatal {
                    BTreeMap::new()
                } else {
                    render(&resolved, &group_spec.config_overrides, self.catalog)
                };

                debug!(
                    role = %role,
                    group = %group_name,
                    files = files.len(),
                    fatal,
                    "compiled role group"
                );
                groups.insert(
                    (*role, group_name.clone()),
                    RoleGroupConfig { files, diagnostics },
                );
            }
        }
        Ok(CompiledClusterConfig { groups })
    }
}
