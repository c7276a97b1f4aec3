//! SparkCluster Custom Resource Definition
//!
//! A SparkCluster describes a distributed Spark deployment: a target
//! software version, cluster-wide configuration, and per-role topology.
//! Each role (master, worker, history server) is split into named role
//! groups that share one configuration and replica count.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Specification for a SparkCluster
///
/// Configuration is layered in three tiers, merged by the engine with
/// role-group > role > common precedence:
/// - `config`: cluster-wide (common) properties
/// - `roles[*].config`: per-role properties
/// - `roles[*].roleGroups[*].config`: per-role-group properties
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "spark.dev",
    version = "v1alpha1",
    kind = "SparkCluster",
    plural = "sparkclusters",
    shortname = "sc",
    status = "SparkClusterStatus",
    namespaced,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SparkClusterSpec {
    /// Target Spark version (major.minor.patch)
    ///
    /// Gates which catalog defaults and recommended values apply.
    pub version: String,

    /// Cluster-wide configuration properties (the common tier)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,

    /// Per-role specifications, keyed by role
    pub roles: BTreeMap<SparkRole, RoleSpec>,
}

impl SparkClusterSpec {
    /// Validate the cluster specification
    ///
    /// Catches user errors before any resolution work: an unparsable
    /// version, a cluster without roles, or a role without role groups.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.version.is_empty() {
            return Err(crate::Error::validation("spec.version cannot be empty"));
        }
        self.version.parse::<Version>().map_err(|_| {
            crate::Error::validation(format!(
                "spec.version '{}' is not a valid major.minor.patch version",
                self.version
            ))
        })?;

        if self.roles.is_empty() {
            return Err(crate::Error::validation(
                "spec.roles must declare at least one role",
            ));
        }
        for (role, role_spec) in &self.roles {
            if role_spec.role_groups.is_empty() {
                return Err(crate::Error::validation(format!(
                    "role '{role}' must declare at least one role group"
                )));
            }
        }
        Ok(())
    }
}

/// A functional category of cluster member
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Serialize,
    JsonSchema,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "camelCase")]
pub enum SparkRole {
    /// Cluster coordinator accepting worker registrations
    Master,
    /// Executor host running application tasks
    Worker,
    /// Web UI serving completed application event logs
    HistoryServer,
}

impl SparkRole {
    /// All roles, in resolution order
    pub const ALL: [SparkRole; 3] = [Self::Master, Self::Worker, Self::HistoryServer];
}

impl std::str::FromStr for SparkRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Self::Master),
            "worker" => Ok(Self::Worker),
            "historyServer" => Ok(Self::HistoryServer),
            _ => Err(crate::Error::validation(format!(
                "invalid role: {s}, expected one of: master, worker, historyServer"
            ))),
        }
    }
}

impl std::fmt::Display for SparkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Worker => write!(f, "worker"),
            Self::HistoryServer => write!(f, "historyServer"),
        }
    }
}

/// Per-role specification
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    /// Role-tier configuration properties
    ///
    /// Sits between the common tier and the role-group tier in precedence.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,

    /// Named role groups, each sharing one configuration and replica count
    pub role_groups: BTreeMap<String, RoleGroupSpec>,
}

/// A named subset of a role's members sharing one configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleGroupSpec {
    /// Number of members in this group
    #[serde(default)]
    pub replicas: u16,

    /// Role-group-tier configuration properties (highest merge precedence)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,

    /// Raw per-file overrides, applied after rendering and never validated
    ///
    /// Keyed by destination file name. An override replaces or appends its
    /// exact key in the rendered artifact, taking final precedence over any
    /// computed value. This is the documented escape hatch for arbitrary
    /// configuration properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config_overrides: BTreeMap<String, BTreeMap<String, String>>,
}

/// Current phase of a SparkCluster
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum SparkClusterPhase {
    /// Resource accepted, configuration not yet resolved
    #[default]
    Pending,
    /// All role groups resolved and rolled out
    Running,
    /// Configuration resolution failed for at least one role group
    Failed,
}

/// Status of a condition
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition holds
    True,
    /// Condition does not hold
    False,
    /// Condition cannot be determined
    Unknown,
}

/// A status condition in the Kubernetes style
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type (e.g. "ConfigurationValid")
    #[serde(rename = "type")]
    pub type_: String,
    /// Whether the condition holds
    pub status: ConditionStatus,
    /// Machine-readable reason
    pub reason: String,
    /// Human-readable message
    pub message: String,
}

impl Condition {
    /// Create a new condition
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// Status for a SparkCluster
///
/// Populated by the reconciliation caller from engine diagnostics; the
/// engine itself never writes status.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SparkClusterStatus {
    /// The generation of the spec that was last processed by the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Current phase of the cluster lifecycle
    #[serde(default)]
    pub phase: SparkClusterPhase,

    /// Human-readable message about current state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Conditions representing the cluster state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl SparkClusterStatus {
    /// Set the phase and return self for chaining
    pub fn phase(mut self, phase: SparkClusterPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Set the message and return self for chaining
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Add a condition and return self for chaining
    ///
    /// A new condition replaces any existing condition of the same type.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.retain(|c| c.type_ != condition.type_);
        self.conditions.push(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Test Fixtures
    // =========================================================================

    fn sample_role_spec() -> RoleSpec {
        RoleSpec {
            config: BTreeMap::new(),
            role_groups: BTreeMap::from([(
                "default".to_string(),
                RoleGroupSpec {
                    replicas: 1,
                    ..Default::default()
                },
            )]),
        }
    }

    fn sample_spec() -> SparkClusterSpec {
        SparkClusterSpec {
            version: "3.0.1".to_string(),
            config: BTreeMap::new(),
            roles: BTreeMap::from([
                (SparkRole::Master, sample_role_spec()),
                (SparkRole::Worker, sample_role_spec()),
            ]),
        }
    }

    // =========================================================================
    // Validation Stories
    // =========================================================================

    /// Story: a well-formed spec passes validation
    #[test]
    fn story_valid_spec_passes_validation() {
        assert!(sample_spec().validate().is_ok());
    }

    /// Story: an unparsable version is rejected before resolution starts
    #[test]
    fn story_bad_version_fails_validation() {
        let mut spec = sample_spec();
        spec.version = "latest".to_string();
        let err = spec.validate().expect_err("'latest' is not a version");
        assert!(err.to_string().contains("latest"));
    }

    /// Story: a cluster must declare at least one role
    #[test]
    fn story_empty_roles_fail_validation() {
        let mut spec = sample_spec();
        spec.roles.clear();
        assert!(spec.validate().is_err());
    }

    /// Story: a role without role groups has nothing to configure
    #[test]
    fn story_role_without_groups_fails_validation() {
        let mut spec = sample_spec();
        spec.roles.insert(
            SparkRole::HistoryServer,
            RoleSpec {
                config: BTreeMap::new(),
                role_groups: BTreeMap::new(),
            },
        );
        let err = spec.validate().expect_err("empty role group map");
        assert!(err.to_string().contains("historyServer"));
    }

    // =========================================================================
    // YAML Manifest Stories
    // =========================================================================
    //
    // SparkCluster specs are defined in YAML manifests; these tests pin the
    // external camelCase shape.

    /// Story: user defines a cluster with tiered configuration in YAML
    #[test]
    fn story_yaml_manifest_defines_tiered_configuration() {
        let yaml = r#"
version: "3.0.1"
config:
  spark.authenticate: "true"
roles:
  master:
    roleGroups:
      default:
        replicas: 1
        config:
          SPARK_MASTER_PORT: "7078"
  worker:
    config:
      SPARK_WORKER_CORES: "4"
    roleGroups:
      default:
        replicas: 3
        configOverrides:
          spark-env.sh:
            SPARK_WORKER_MEMORY: "16g"
"#;
        let value = crate::yaml::parse_yaml(yaml).expect("should parse YAML");
        let spec: SparkClusterSpec =
            serde_json::from_value(value).expect("cluster YAML should deserialize");

        assert!(spec.validate().is_ok());
        assert_eq!(spec.config["spark.authenticate"], "true");

        let master = &spec.roles[&SparkRole::Master];
        assert_eq!(master.role_groups["default"].replicas, 1);
        assert_eq!(
            master.role_groups["default"].config["SPARK_MASTER_PORT"],
            "7078"
        );

        let worker = &spec.roles[&SparkRole::Worker];
        assert_eq!(worker.config["SPARK_WORKER_CORES"], "4");
        assert_eq!(
            worker.role_groups["default"].config_overrides["spark-env.sh"]
                ["SPARK_WORKER_MEMORY"],
            "16g"
        );
    }

    /// Story: spec survives a serde roundtrip
    #[test]
    fn story_spec_survives_json_roundtrip() {
        let spec = sample_spec();
        let json = serde_json::to_string(&spec).expect("serialize");
        let back: SparkClusterSpec = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(spec, back);
    }

    /// Story: roles serialize under their camelCase wire names
    #[test]
    fn story_role_wire_names_are_camel_case() {
        assert_eq!(
            serde_json::to_string(&SparkRole::HistoryServer).expect("serialize"),
            "\"historyServer\""
        );
        assert_eq!("worker".parse::<SparkRole>().expect("parse"), SparkRole::Worker);
        assert!("driver".parse::<SparkRole>().is_err());
    }

    // =========================================================================
    // Status Builder Stories
    // =========================================================================

    /// Story: controller builds status fluently from engine diagnostics
    #[test]
    fn story_status_builder_chains() {
        let status = SparkClusterStatus::default()
            .phase(SparkClusterPhase::Failed)
            .message("master/default is missing a required property")
            .condition(Condition::new(
                "ConfigurationValid",
                ConditionStatus::False,
                "MissingRequiredProperty",
                "no value or default for SPARK_MASTER_PORT",
            ));

        assert_eq!(status.phase, SparkClusterPhase::Failed);
        assert_eq!(status.conditions.len(), 1);
    }

    /// Story: a new condition replaces the old one of the same type
    #[test]
    fn story_condition_replacement_by_type() {
        let status = SparkClusterStatus::default()
            .condition(Condition::new(
                "ConfigurationValid",
                ConditionStatus::False,
                "MissingRequiredProperty",
                "missing",
            ))
            .condition(Condition::new(
                "ConfigurationValid",
                ConditionStatus::True,
                "Resolved",
                "all role groups resolved",
            ));

        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, ConditionStatus::True);
    }
}
