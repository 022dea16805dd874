//! Core types for the Quarry repository engine
//!
//! This crate defines the foundational types shared by every layer:
//! - Value: runtime representation of a single property value
//! - IndexKey: canonical hashable form of a Value for index buckets
//! - ValueType / TypeSpec: declared property and parameter types
//! - TypeDef / RepoDef: host-supplied declared-type descriptions
//! - Record: runtime property access implemented by entity values
//! - DnfExpr: compiled boolean query expression (OR of ANDs)
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod error;
pub mod expr;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use error::{
    DerivationError, Error, ExecutionError, IntrospectionError, RepositoryError, Result,
};
pub use expr::{AndGroup, DnfExpr};
pub use traits::{same_row, Record, Row};
pub use types::{
    FieldDef, MethodDef, MethodSig, ParamType, RepoDef, ReturnType, TypeDef, TypeSpec, ValueType,
};
pub use value::{IndexKey, Value};
