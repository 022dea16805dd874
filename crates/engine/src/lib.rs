//! # Quarry Engine
//!
//! The runtime surface of the derived-repository engine. This is the only
//! crate hosts need to import. It provides:
//! - [`Registry`] - the registration entry point (analyze → derive → bind)
//! - [`Repository`] - the per-interface dispatcher
//! - [`derive`]/[`RepositoryDescriptor`] - the query compiler, usable on
//!   its own when the host wires stores itself
//!
//! ## Quick Start
//!
//! ```
//! use quarry_engine::{
//!     CallOutcome, FieldDef, MethodSig, ParamType, Registry, RepoDef, ReturnType, TypeDef,
//!     TypeSpec, Value, ValueType,
//! };
//!
//! let entity = TypeDef::new("Tag")
//!     .with_field(FieldDef::new("id", TypeSpec::optional(ValueType::Int)))
//!     .with_field(FieldDef::new("title", TypeSpec::plain(ValueType::Text)));
//!
//! let interface = RepoDef::new("Tags")
//!     .with_method(MethodSig::new("save", vec![ParamType::Entity], ReturnType::Void))
//!     .with_method(MethodSig::new(
//!         "findByTitle",
//!         vec![ParamType::Value(TypeSpec::plain(ValueType::Text))],
//!         ReturnType::Entity,
//!     ));
//!
//! let registry = Registry::new();
//! let tags = registry
//!     .register(&entity, &interface, TypeSpec::optional(ValueType::Int))
//!     .unwrap();
//!
//! // No tag stored yet: a find with zero hits is CallOutcome::None
//! let outcome = tags.call("findByTitle", &[Value::from("a").into()]).unwrap();
//! assert!(matches!(outcome, CallOutcome::None));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod derive;
pub mod registry;
pub mod repository;

// =============================================================================
// Public API - Everything hosts need is re-exported here
// =============================================================================

pub use derive::{derive, QueryDescriptor, RepositoryDescriptor};
pub use registry::Registry;
pub use repository::{CallArg, CallOutcome, Repository};

// Re-export the contract types so hosts don't need quarry-core directly
pub use quarry_core::{
    same_row, AndGroup, DerivationError, DnfExpr, Error, ExecutionError, FieldDef,
    IntrospectionError, MethodDef, MethodSig, ParamType, Record, RepoDef, RepositoryError, Result,
    ReturnType, Row, TypeDef, TypeSpec, Value, ValueType,
};

// Re-export the schema and store surfaces for hosts that wire their own
pub use quarry_schema::{analyze, PropertySchema};
pub use quarry_storage::{IndexStore, QueryOutcome};
