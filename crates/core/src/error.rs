//! Error types for the Quarry repository engine
//!
//! This module defines all error kinds used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! The kinds mirror where failures occur and who must see them:
//! - [`IntrospectionError`] and [`DerivationError`] are raised once at
//!   registration time and abort the owning entity/repository - they are
//!   never recovered locally.
//! - [`ExecutionError`] is raised at call time and propagates to the
//!   caller of the repository method; nothing is retried internally.
//! - [`RepositoryError::UnmappedMethod`] is the internal-consistency kind:
//!   derivation makes it unreachable for well-formed registrations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TypeSpec;

/// Result type alias for registration-facade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Schema derivation failures (raised once at startup)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum IntrospectionError {
    /// Two accessors resolved for the same property disagree on type
    #[error("property `{property}` of `{entity}` resolved to conflicting types: {existing} vs {incoming}")]
    TypeMismatch {
        /// Owning entity type name
        entity: String,
        /// Standardized property name
        property: String,
        /// Type recorded by an earlier accessor
        existing: TypeSpec,
        /// Type declared by the conflicting accessor
        incoming: TypeSpec,
    },

    /// No identity field was found on the entity
    #[error("no primary key property found on `{entity}`")]
    MissingPrimaryKey {
        /// Owning entity type name
        entity: String,
    },

    /// The identity field's declared type cannot represent "unassigned"
    #[error("primary key `{property}` of `{entity}` must be optional, got {ty}")]
    PrimaryKeyNotOptional {
        /// Owning entity type name
        entity: String,
        /// Standardized property name
        property: String,
        /// The offending declared type
        ty: TypeSpec,
    },

    /// More than one field is named as the identity field
    #[error("duplicate primary key declaration `{property}` on `{entity}`")]
    DuplicatePrimaryKey {
        /// Owning entity type name
        entity: String,
        /// Standardized property name
        property: String,
    },
}

/// Repository method derivation failures (raised once at startup)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum DerivationError {
    /// Declared id type does not agree with the schema's primary key type
    #[error("repository `{repo}` declares id type {declared}, but the primary key is {expected}")]
    IdTypeMismatch {
        /// Repository interface name
        repo: String,
        /// Primary key type from the entity schema
        expected: TypeSpec,
        /// Id type declared at registration
        declared: TypeSpec,
    },

    /// A count-named method with the wrong shape
    #[error("method `{method}` must take no parameters and return an integer to derive a count query")]
    CountSignature {
        /// Declared method name
        method: String,
    },

    /// A save/update-named method with the wrong shape
    #[error("method `{method}` must take one entity parameter and return void or the entity to derive an upsert query")]
    UpsertSignature {
        /// Declared method name
        method: String,
    },

    /// A remove/delete-named method with the wrong shape
    #[error("method `{method}` must take one entity parameter to derive a delete query")]
    DeleteSignature {
        /// Declared method name
        method: String,
    },

    /// A `find_by` predicate with an empty AND-group
    #[error("method `{method}` produces an empty AND-group in its predicate")]
    MalformedPredicate {
        /// Declared method name
        method: String,
    },

    /// A method name matching no recognized convention
    #[error("unsupported method signature: `{method}`")]
    UnsupportedMethod {
        /// Declared method name
        method: String,
    },
}

/// Query execution failures (raised at call time)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ExecutionError {
    /// Fewer arguments supplied than the predicate binds
    #[error("not enough arguments for `{method}`: expected {expected}, got {supplied}")]
    NotEnoughArguments {
        /// The invoked method
        method: String,
        /// Distinct properties the predicate binds
        expected: usize,
        /// Arguments actually supplied
        supplied: usize,
    },

    /// A property could not be read through its resolved accessor
    #[error("failed to read property `{property}` of `{entity}` while {context}")]
    PropertyRead {
        /// Owning entity type name
        entity: String,
        /// Standardized property name
        property: String,
        /// What the engine was doing when the read failed
        context: String,
    },

    /// An argument of the wrong kind for the derived query
    #[error("invalid argument for `{method}`: {reason}")]
    InvalidArgument {
        /// The invoked method
        method: String,
        /// Why the argument was rejected
        reason: String,
    },

    /// A compiled query kind with no executor behavior
    #[error("operation `{operation}` is not implemented by the index store")]
    Unimplemented {
        /// The unimplemented operation
        operation: String,
    },
}

/// Dispatcher-level failures for one repository call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum RepositoryError {
    /// An ordinary query execution failure, propagated to the caller
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A call signature absent from the compiled mapping.
    ///
    /// Derivation makes this unreachable for well-formed registrations, so
    /// hitting it means the dispatcher and descriptor disagree - an
    /// internal-consistency violation, not a query failure.
    #[error("method `{0}` is not mapped to a derived query")]
    UnmappedMethod(String),
}

/// Umbrella error for the registration facade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum Error {
    /// Entity schema derivation failed
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    /// Repository query derivation failed
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Query execution failed
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Repository dispatch failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
