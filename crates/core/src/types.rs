//! Declared-type model for Quarry
//!
//! This module defines the foundational types the host container hands to
//! the engine in place of runtime reflection:
//! - ValueType / TypeSpec: declared property and parameter types
//! - TypeDef / FieldDef / MethodDef: an entity type description
//! - RepoDef / MethodSig: a repository interface description
//!
//! A `TypeSpec` carries an `optional` flag modelling nullability; two specs
//! are *compatible* when their value types match, ignoring optionality.
//! Primary keys are required to be optional (an entity exists before its
//! key is assigned).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared-type tag for a scalar property or parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// UTF-8 string
    Text,
    /// Raw bytes
    Bytes,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
            ValueType::Bytes => "bytes",
        };
        write!(f, "{}", name)
    }
}

/// A declared property or parameter type: a scalar tag plus nullability
///
/// Compatibility ignores `optional`, mirroring the primitive/boxed
/// equivalence of the original engine: `int` and `int?` agree on type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSpec {
    /// The scalar value type
    pub value: ValueType,
    /// Whether the declaration admits null
    pub optional: bool,
}

impl TypeSpec {
    /// A plain (non-nullable) declaration of `value`
    pub fn plain(value: ValueType) -> Self {
        Self {
            value,
            optional: false,
        }
    }

    /// An optional (nullable) declaration of `value`
    pub fn optional(value: ValueType) -> Self {
        Self {
            value,
            optional: true,
        }
    }

    /// Type compatibility: equal value types, optionality ignored
    pub fn compatible(&self, other: &TypeSpec) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "{}?", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// One declared field of an entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared field name (as written by the entity author)
    pub name: String,
    /// Declared field type
    pub ty: TypeSpec,
    /// Whether the field can be written after construction
    pub mutable: bool,
    /// Whether the host flagged the field as ignorable
    pub ignored: bool,
}

impl FieldDef {
    /// A mutable, non-ignored field
    pub fn new(name: impl Into<String>, ty: TypeSpec) -> Self {
        Self {
            name: name.into(),
            ty,
            mutable: true,
            ignored: false,
        }
    }

    /// Mark the field immutable (it will contribute no setter)
    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Mark the field ignorable (it will contribute nothing)
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// One declared method of an entity type (accessor candidates only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Declared method name (as written by the entity author)
    pub name: String,
    /// Declared parameter types
    pub params: Vec<TypeSpec>,
    /// Declared return type, if any
    pub ret: Option<TypeSpec>,
    /// Whether the host flagged the method as ignorable
    pub ignored: bool,
}

impl MethodDef {
    /// A non-ignored method
    pub fn new(name: impl Into<String>, params: Vec<TypeSpec>, ret: Option<TypeSpec>) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            ignored: false,
        }
    }

    /// Mark the method ignorable (it will contribute nothing)
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// Host-supplied description of an entity type
///
/// This is the reflection substitute: the out-of-scope container knows how
/// its entities are declared and feeds the declaration here as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    name: String,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
}

impl TypeDef {
    /// An entity type description with no members yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Add a declared field
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a declared method
    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// The declared type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields, in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The declared methods, in declaration order
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }
}

/// Declared type of one repository-method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamType {
    /// A scalar value parameter (bound positionally in `find_by` queries)
    Value(TypeSpec),
    /// A parameter assignable from the entity type
    Entity,
}

/// Declared return type of one repository method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnType {
    /// No return value
    Void,
    /// A scalar value return
    Value(TypeSpec),
    /// A return assignable from the entity type
    Entity,
    /// A list-like return of entities
    List,
}

impl ReturnType {
    /// Whether the return type is assignable to an integer count
    pub fn is_integer(&self) -> bool {
        matches!(self, ReturnType::Value(spec) if spec.value == ValueType::Int)
    }
}

/// One declared repository-interface method signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Declared method name (as written by the repository author)
    pub name: String,
    /// Declared parameter types, in order
    pub params: Vec<ParamType>,
    /// Declared return type
    pub ret: ReturnType,
}

impl MethodSig {
    /// A repository method signature
    pub fn new(name: impl Into<String>, params: Vec<ParamType>, ret: ReturnType) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }
}

/// Host-supplied description of a repository interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoDef {
    name: String,
    methods: Vec<MethodSig>,
    extends: Vec<RepoDef>,
}

impl RepoDef {
    /// A repository interface description with no members yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            extends: Vec::new(),
        }
    }

    /// Add a declared method
    pub fn with_method(mut self, method: MethodSig) -> Self {
        self.methods.push(method);
        self
    }

    /// Add an extended interface (collected depth-first after own methods)
    pub fn with_extends(mut self, parent: RepoDef) -> Self {
        self.extends.push(parent);
        self
    }

    /// The declared interface name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared methods, in declaration order
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    /// The extended interfaces, in declaration order
    pub fn extends(&self) -> &[RepoDef] {
        &self.extends
    }
}
