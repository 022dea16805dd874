//! Resolved property capabilities
//!
//! A property's get/set capabilities are resolved exactly once while the
//! schema is built, into a tagged variant: direct field access or an
//! accessor method. The engine reads through the resolved capability and
//! never performs a per-call member lookup.

use quarry_core::{Record, TypeSpec, Value};

/// Resolved read capability for one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Getter {
    /// Direct field access under the declared field name
    Field {
        /// Declared field name
        field: String,
    },
    /// Read through a declared accessor method
    Method {
        /// Declared method name
        method: String,
    },
}

impl Getter {
    /// Read the property from a record through this capability.
    ///
    /// `None` means the record does not expose the resolved member - a
    /// read failure, distinct from a present member holding null.
    pub fn read(&self, record: &dyn Record) -> Option<Value> {
        match self {
            Getter::Field { field } => record.field(field),
            Getter::Method { method } => record.getter(method),
        }
    }
}

/// Resolved write capability for one property
///
/// The engine never writes properties; setters are recorded so the schema
/// states the full capability set of each property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setter {
    /// Direct field access under the declared field name
    Field {
        /// Declared field name
        field: String,
    },
    /// Write through a declared accessor method
    Method {
        /// Declared method name
        method: String,
    },
}

/// One introspected property: declared type plus resolved capabilities
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessor {
    ty: TypeSpec,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl PropertyAccessor {
    /// A property with a declared type and no capabilities yet
    pub(crate) fn new(ty: TypeSpec) -> Self {
        Self {
            ty,
            getter: None,
            setter: None,
        }
    }

    pub(crate) fn set_getter(&mut self, getter: Getter) {
        self.getter = Some(getter);
    }

    pub(crate) fn set_setter(&mut self, setter: Setter) {
        self.setter = Some(setter);
    }

    /// The declared property type
    pub fn ty(&self) -> &TypeSpec {
        &self.ty
    }

    /// The resolved read capability, if any
    pub fn getter(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }

    /// The resolved write capability, if any
    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    /// Whether the property can be read
    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Whether the property can be written
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}
