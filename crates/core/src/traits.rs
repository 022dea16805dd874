//! Runtime property access for entity values
//!
//! This module defines the [`Record`] trait that entity values implement so
//! the engine can read properties without reflection, and the [`Row`]
//! handle under which entities are stored and returned.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Runtime member access implemented by entity values.
///
/// A record exposes its members the two ways an accessor can be resolved:
/// direct field reads and accessor-method reads. Returning `None` means the
/// record does not expose that member at all - a read failure - which is
/// distinct from `Some(Value::Null)`, a present member holding null.
pub trait Record: fmt::Debug + Send + Sync {
    /// The entity type name this record belongs to
    fn type_name(&self) -> &str;

    /// Read a member by declared field name
    fn field(&self, name: &str) -> Option<Value>;

    /// Read a member through a declared accessor method
    ///
    /// The default implementation exposes no accessor methods.
    fn getter(&self, method: &str) -> Option<Value> {
        let _ = method;
        None
    }
}

/// Shared handle to a stored entity.
///
/// Rows are held and returned by handle; the store never copies an entity.
pub type Row = Arc<dyn Record>;

/// Row identity: two handles are the same row when they point at the same
/// entity allocation.
///
/// This is the reference identity the upsert path keys on - value-equal
/// entities in distinct allocations are distinct rows. Comparison uses the
/// data pointer only, so it is stable even when trait-object vtables differ
/// across codegen units.
pub fn same_row(a: &Row, b: &Row) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}
