//! The analyze pass: entity type description → property schema
//!
//! Fields are walked first, then methods. Each member contributes
//! capabilities under its standardized property name; every accessor that
//! touches a property must agree with the type already recorded for it
//! (optionality ignored). A field literally named `id` is the primary key,
//! and exactly one such field must exist.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use quarry_core::{IntrospectionError, TypeDef, TypeSpec};
use tracing::{debug, info};

use crate::casing::standardize;
use crate::property::{Getter, PropertyAccessor, Setter};

/// Introspected schema of one entity type.
///
/// Built once at registration and read-only afterwards. Properties are
/// kept in an ordered map so every walk over the schema (index
/// construction, logging, derivation checks) is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    entity: String,
    properties: BTreeMap<String, PropertyAccessor>,
    primary_key: String,
}

impl PropertySchema {
    /// The owning entity type name
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// All properties with their accessors, in standardized-name order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyAccessor)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up one property by standardized name
    pub fn property(&self, name: &str) -> Option<&PropertyAccessor> {
        self.properties.get(name)
    }

    /// Number of introspected properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the schema holds no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The standardized name of the primary key property
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The declared type of the primary key property
    pub fn primary_key_type(&self) -> &TypeSpec {
        self.properties[&self.primary_key].ty()
    }

    /// Properties that can be read, with their resolved getters.
    ///
    /// The index store builds one inverted index per entry, in this
    /// (deterministic) order.
    pub fn readable_properties(&self) -> impl Iterator<Item = (&str, &Getter)> {
        self.properties
            .iter()
            .filter_map(|(name, acc)| acc.getter().map(|g| (name.as_str(), g)))
    }
}

/// Record a member's type under a property name, enforcing agreement with
/// any type an earlier accessor recorded (optionality ignored).
fn record_type<'p>(
    properties: &'p mut BTreeMap<String, PropertyAccessor>,
    entity: &str,
    name: &str,
    ty: TypeSpec,
) -> Result<&'p mut PropertyAccessor, IntrospectionError> {
    match properties.entry(name.to_string()) {
        Entry::Occupied(entry) => {
            let accessor = entry.into_mut();
            if !accessor.ty().compatible(&ty) {
                return Err(IntrospectionError::TypeMismatch {
                    entity: entity.to_string(),
                    property: name.to_string(),
                    existing: *accessor.ty(),
                    incoming: ty,
                });
            }
            Ok(accessor)
        }
        Entry::Vacant(entry) => Ok(entry.insert(PropertyAccessor::new(ty))),
    }
}

/// Build the property schema of an entity type description.
///
/// # Errors
///
/// Fails when two accessors disagree on a property's type, when no field
/// named `id` exists, when the id field is not optional, or when more than
/// one field claims the identity slot.
pub fn analyze(ty: &TypeDef) -> Result<PropertySchema, IntrospectionError> {
    let entity = ty.name().to_string();
    let mut properties: BTreeMap<String, PropertyAccessor> = BTreeMap::new();
    let mut primary_key: Option<String> = None;

    for field in ty.fields() {
        if field.ignored {
            continue;
        }
        let name = standardize(&field.name);
        let accessor = record_type(&mut properties, &entity, &name, field.ty)?;
        accessor.set_getter(Getter::Field {
            field: field.name.clone(),
        });
        if field.mutable {
            accessor.set_setter(Setter::Field {
                field: field.name.clone(),
            });
        }

        if field.name == "id" {
            if primary_key.is_some() {
                return Err(IntrospectionError::DuplicatePrimaryKey {
                    entity,
                    property: name,
                });
            }
            if !field.ty.optional {
                return Err(IntrospectionError::PrimaryKeyNotOptional {
                    entity,
                    property: name,
                    ty: field.ty,
                });
            }
            primary_key = Some(name);
        }
    }

    for method in ty.methods() {
        if method.ignored {
            continue;
        }
        let name = standardize(&method.name);

        if let Some(property) = name.strip_prefix("get_").or_else(|| name.strip_prefix("is_")) {
            if property.is_empty() {
                continue;
            }
            let Some(ret) = method.ret else {
                continue;
            };
            let accessor = record_type(&mut properties, &entity, property, ret)?;
            // A method accessor replaces an earlier field resolution
            accessor.set_getter(Getter::Method {
                method: method.name.clone(),
            });
            debug!(
                target: "quarry::schema",
                entity = %entity,
                property = %property,
                method = %method.name,
                "Resolved method getter"
            );
        } else if let Some(property) = name.strip_prefix("set_") {
            if property.is_empty() || method.params.len() != 1 {
                continue;
            }
            let param = method.params[0];
            let accessor = record_type(&mut properties, &entity, property, param)?;
            accessor.set_setter(Setter::Method {
                method: method.name.clone(),
            });
        }
    }

    let primary_key = primary_key.ok_or(IntrospectionError::MissingPrimaryKey {
        entity: entity.clone(),
    })?;

    let schema = PropertySchema {
        entity,
        properties,
        primary_key,
    };
    info!(
        target: "quarry::schema",
        entity = %schema.entity,
        properties = schema.len(),
        primary_key = %schema.primary_key,
        "Analyzed entity schema"
    );
    Ok(schema)
}
