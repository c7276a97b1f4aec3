//! Error types for the configuration engine
//!
//! Two failure classes exist with very different lifetimes:
//! - [`CatalogError`]: fatal, raised while loading a property catalog.
//!   Resolution must never run against a broken catalog.
//! - [`crate::validate::Diagnostic`]: per-role-group resolution findings.
//!   Diagnostics are data, not errors; only a missing required property is
//!   fatal, and only for its own role group.

use thiserror::Error;

/// Fatal catalog authoring errors, detected at load time
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    /// Two property definitions bind the same external name into the same file
    #[error("duplicate binding: '{external_name}' bound twice for file '{file}'")]
    DuplicateBinding {
        /// The colliding external property name
        external_name: String,
        /// The destination file both definitions target
        file: String,
    },

    /// Expansion links between properties form a cycle
    #[error("expansion cycle detected involving property '{property}'")]
    ExpansionCycle {
        /// A property on the cycle
        property: String,
    },

    /// An expansion link names a property id that is not in the catalog
    #[error("property '{property}' expands to unknown property '{target}'")]
    UnknownExpansionTarget {
        /// The property declaring the expansion
        property: String,
        /// The missing expansion target id
        target: String,
    },

    /// A datatype references a unit that is not registered
    #[error("property '{property}' references unregistered unit '{unit}'")]
    UnknownUnit {
        /// The property with the dangling unit reference
        property: String,
        /// The unregistered unit name
        unit: String,
    },

    /// A version string does not parse as major.minor.patch
    #[error("invalid version '{input}': expected major.minor[.patch] with numeric components")]
    InvalidVersion {
        /// The unparsable input
        input: String,
    },

    /// A unit definition carries a pattern that is not a valid regex
    #[error("unit '{unit}' has an invalid pattern: {reason}")]
    InvalidUnitPattern {
        /// The unit being defined
        unit: String,
        /// What the regex engine rejected
        reason: String,
    },

    /// A property's bindings are structurally unusable
    #[error("property '{property}' has an invalid binding: {reason}")]
    InvalidBinding {
        /// The misconfigured property
        property: String,
        /// Description of what is wrong
        reason: String,
    },

    /// A default or recommended value predates the property itself
    #[error(
        "property '{property}' has a value valid from {valid_from} \
         but was only introduced in {introduced_in}"
    )]
    DefaultBeforeIntroduced {
        /// The misconfigured property
        property: String,
        /// The offending validFrom version
        valid_from: String,
        /// The property's introduction version
        introduced_in: String,
    },
}

impl CatalogError {
    /// Create an invalid-version error for the given input
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    /// Create an invalid-binding error with the given reason
    pub fn invalid_binding(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBinding {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for configuration engine operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Property catalog is broken or the target version is unparsable
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Validation error for a SparkCluster spec
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
