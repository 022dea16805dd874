//! Quarry - a derived-repository engine over an in-memory indexed row store
//!
//! Quarry turns a plain entity type description and a repository interface
//! description into a working repository: method names like
//! `findByTitleAndAuthorOrIsbn` compile into equality queries in
//! disjunctive normal form, executed against per-property inverted
//! indices.
//!
//! # Quick Start
//!
//! ```ignore
//! use quarrydb::{Registry, TypeSpec, Value, ValueType};
//!
//! let registry = Registry::new();
//! let tags = registry.register(&entity, &interface, TypeSpec::optional(ValueType::Int))?;
//!
//! tags.call("save", &[row.into()])?;
//! let hit = tags.call("findByTitle", &[Value::from("a").into()])?;
//! ```
//!
//! # Architecture
//!
//! Registration runs the startup pipeline once per repository: the entity
//! introspector builds a [`PropertySchema`], the query deriver compiles a
//! [`RepositoryDescriptor`], and the dispatcher binds it to a fresh
//! [`IndexStore`]. Execution routes every call through the compiled
//! mapping.
//!
//! Internal layering (core, schema, storage) is re-exported through the
//! engine crate - this facade is all hosts need to import.

// Re-export the public API from quarry-engine
pub use quarry_engine::*;
