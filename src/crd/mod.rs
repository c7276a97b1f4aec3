//! Custom Resource Definitions for the Spark operator
//!
//! The SparkCluster CRD carries the three-tier configuration structure the
//! engine resolves: cluster-wide config, per-role config, and per-role-group
//! config plus raw file overrides.

mod cluster;

pub use cluster::{
    Condition, ConditionStatus, RoleGroupSpec, RoleSpec, SparkCluster, SparkClusterPhase,
    SparkClusterSpec, SparkClusterStatus, SparkRole,
};
