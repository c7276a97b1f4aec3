//! Built-in Spark property catalog
//!
//! The definitions the operator ships for Apache Spark standalone clusters:
//! daemon environment settings (`spark-env.sh`) and application properties
//! (`spark-defaults.conf`). Callers with product-specific schemas load their
//! own YAML instead; tests and the default operator deployment use this set.

use crate::crd::SparkRole;
use crate::error::CatalogError;
use crate::unit::UnitRegistry;
use crate::version::Version;

use super::{
    Datatype, Expansion, PropertyBinding, PropertyCatalog, PropertyDefinition, RoleRequirement,
    VersionedValue,
};

fn v(s: &str) -> Version {
    // Versions below are literals; a typo is caught by the catalog tests.
    s.parse().unwrap_or_else(|_| panic!("builtin version '{s}' must parse"))
}

fn optional(role: SparkRole) -> RoleRequirement {
    RoleRequirement {
        role,
        required: false,
    }
}

fn required(role: SparkRole) -> RoleRequirement {
    RoleRequirement {
        role,
        required: true,
    }
}

/// Build the built-in Spark property catalog
///
/// Fails only if the definitions are inconsistent with the given unit
/// registry; with [`UnitRegistry::builtin`] this always loads.
pub fn spark_defaults(units: &UnitRegistry) -> Result<PropertyCatalog, CatalogError> {
    let definitions = vec![
        PropertyDefinition {
            id: "sparkMasterPort".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_MASTER_PORT")],
            datatype: Datatype::Integer {
                min: Some(0),
                max: Some(65535),
                unit: Some("port".to_string()),
            },
            defaults: vec![VersionedValue::from_version(v("0.6.2"), "7077")],
            recommended: vec![],
            roles: vec![required(SparkRole::Master)],
            introduced_in: v("0.6.2"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkMasterWebuiPort".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_MASTER_WEBUI_PORT")],
            datatype: Datatype::Integer {
                min: Some(0),
                max: Some(65535),
                unit: Some("port".to_string()),
            },
            defaults: vec![VersionedValue::from_version(v("0.6.2"), "8080")],
            recommended: vec![],
            roles: vec![optional(SparkRole::Master)],
            introduced_in: v("0.6.2"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkWorkerPort".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_WORKER_PORT")],
            datatype: Datatype::Integer {
                min: Some(0),
                max: Some(65535),
                unit: Some("port".to_string()),
            },
            defaults: vec![],
            recommended: vec![],
            roles: vec![optional(SparkRole::Worker)],
            introduced_in: v("0.6.2"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkWorkerCores".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_WORKER_CORES")],
            datatype: Datatype::Integer {
                min: Some(1),
                max: None,
                unit: None,
            },
            defaults: vec![],
            recommended: vec![],
            roles: vec![optional(SparkRole::Worker)],
            introduced_in: v("0.6.2"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkWorkerMemory".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_WORKER_MEMORY")],
            datatype: Datatype::String {
                unit: Some("memory".to_string()),
            },
            defaults: vec![],
            recommended: vec![],
            roles: vec![optional(SparkRole::Worker)],
            introduced_in: v("0.6.2"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkDaemonMemory".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_DAEMON_MEMORY")],
            datatype: Datatype::String {
                unit: Some("memory".to_string()),
            },
            defaults: vec![],
            recommended: vec![VersionedValue::from_version(v("0.9.0"), "1g")],
            roles: vec![
                optional(SparkRole::Master),
                optional(SparkRole::Worker),
                optional(SparkRole::HistoryServer),
            ],
            introduced_in: v("0.9.0"),
            expands_to: vec![],
        },
        // The operator supervises daemons itself, so every role must keep
        // its process in the foreground.
        PropertyDefinition {
            id: "sparkNoDaemonize".to_string(),
            bindings: vec![PropertyBinding::env("SPARK_NO_DAEMONIZE")],
            datatype: Datatype::Bool,
            defaults: vec![VersionedValue::from_version(v("2.0.0"), "true")],
            recommended: vec![],
            roles: vec![
                required(SparkRole::Master),
                required(SparkRole::Worker),
                required(SparkRole::HistoryServer),
            ],
            introduced_in: v("2.0.0"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkHistoryLogDirectory".to_string(),
            bindings: vec![PropertyBinding::file(
                "spark.history.fs.logDirectory",
                crate::SPARK_DEFAULTS_CONF,
            )],
            datatype: Datatype::String {
                unit: Some("directory".to_string()),
            },
            defaults: vec![VersionedValue::from_version(v("1.0.0"), "/tmp/spark-events")],
            recommended: vec![],
            roles: vec![required(SparkRole::HistoryServer)],
            introduced_in: v("1.0.0"),
            expands_to: vec![],
        },
        PropertyDefinition {
            id: "sparkEventLogEnabled".to_string(),
            bindings: vec![PropertyBinding::file(
                "spark.eventLog.enabled",
                crate::SPARK_DEFAULTS_CONF,
            )],
            datatype: Datatype::Bool,
            defaults: vec![],
            recommended: vec![],
            roles: vec![optional(SparkRole::Master), optional(SparkRole::Worker)],
            introduced_in: v("1.0.0"),
            expands_to: vec![],
        },
        // Pointing event logs somewhere implies writing them at all.
        PropertyDefinition {
            id: "sparkEventLogDir".to_string(),
            bindings: vec![PropertyBinding::file(
                "spark.eventLog.dir",
                crate::SPARK_DEFAULTS_CONF,
            )],
            datatype: Datatype::String {
                unit: Some("directory".to_string()),
            },
            defaults: vec![],
            recommended: vec![],
            roles: vec![optional(SparkRole::Master), optional(SparkRole::Worker)],
            introduced_in: v("1.0.0"),
            expands_to: vec![Expansion {
                target: "sparkEventLogEnabled".to_string(),
                value: "true".to_string(),
            }],
        },
        PropertyDefinition {
            id: "sparkAuthenticate".to_string(),
            bindings: vec![PropertyBinding::file(
                "spark.authenticate",
                crate::SPARK_DEFAULTS_CONF,
            )],
            datatype: Datatype::Bool,
            defaults: vec![],
            recommended: vec![],
            roles: vec![
                optional(SparkRole::Master),
                optional(SparkRole::Worker),
                optional(SparkRole::HistoryServer),
            ],
            introduced_in: v("1.0.0"),
            expands_to: vec![],
        },
        // A shared secret only works with authentication switched on.
        PropertyDefinition {
            id: "sparkAuthenticateSecret".to_string(),
            bindings: vec![PropertyBinding::file(
                "spark.authenticate.secret",
                crate::SPARK_DEFAULTS_CONF,
            )],
            datatype: Datatype::String {
                unit: Some("password".to_string()),
            },
            defaults: vec![],
            recommended: vec![],
            roles: vec![
                optional(SparkRole::Master),
                optional(SparkRole::Worker),
                optional(SparkRole::HistoryServer),
            ],
            introduced_in: v("1.0.0"),
            expands_to: vec![Expansion {
                target: "sparkAuthenticate".to_string(),
                value: "true".to_string(),
            }],
        },
    ];

    PropertyCatalog::load(definitions, units)
}
