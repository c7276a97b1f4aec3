//! spark-config - hierarchical configuration resolution for Spark cluster operators
//!
//! This crate turns a SparkCluster custom resource into per-role-group
//! configuration artifacts. A reconciliation loop hands it a parsed cluster
//! spec and a target Spark version; it hands back rendered config file
//! contents (`spark-defaults.conf`, `spark-env.sh`) plus validation
//! diagnostics, and never touches the cluster itself.
//!
//! # Architecture
//!
//! Resolution runs as a strict pipeline per role group:
//! 1. Tier merge: common config, role config, and role-group config are
//!    merged with role-group > role > common precedence.
//! 2. Validation: each merged value is checked against the versioned
//!    property catalog (datatype, range, unit) and implied properties are
//!    expanded; required properties without a value fall back to
//!    version-gated schema defaults.
//! 3. Rendering: validated values are grouped by destination artifact and
//!    serialized; raw `configOverrides` are applied last, unvalidated.
//!
//! The engine is a pure function of its inputs: no I/O, no shared mutable
//! state, safe to call concurrently for independent role groups.
//!
//! # Modules
//!
//! - [`crd`] - SparkCluster Custom Resource Definition types
//! - [`catalog`] - versioned property definitions and catalog loading
//! - [`unit`] - named regex validators for value shapes (port, memory, ...)
//! - [`merge`] - configuration tier merging with precedence
//! - [`validate`] - value validation, expansion, and required-property checks
//! - [`render`] - artifact rendering and raw override application
//! - [`engine`] - pipeline orchestration over a whole cluster spec
//! - [`version`] - semantic version parsing and comparison
//! - [`yaml`] - YAML ingestion for catalog and manifest files
//! - [`error`] - error types for the engine

#![deny(missing_docs)]

pub mod catalog;
pub mod crd;
pub mod engine;
pub mod error;
pub mod merge;
pub mod render;
pub mod unit;
pub mod validate;
pub mod version;
pub mod yaml;

pub use catalog::PropertyCatalog;
pub use engine::{CompiledClusterConfig, ConfigEngine};
pub use error::{CatalogError, Error};
pub use unit::UnitRegistry;
pub use validate::Diagnostic;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// File name of the properties-style Spark configuration artifact
///
/// Catalog-less pass-through keys also land here; other destinations are
/// reached explicitly via `configOverrides`.
pub const SPARK_DEFAULTS_CONF: &str = "spark-defaults.conf";

/// File name of the shell-style environment artifact (`KEY="value"` lines)
pub const SPARK_ENV_SH: &str = "spark-env.sh";
