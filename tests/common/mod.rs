//! Shared test fixtures for all integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use quarrydb::{
    FieldDef, MethodSig, ParamType, Record, RepoDef, ReturnType, Row, TypeDef, TypeSpec, Value,
    ValueType,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// ============================================================================
// Type helpers
// ============================================================================

pub fn text() -> TypeSpec {
    TypeSpec::plain(ValueType::Text)
}

pub fn int_opt() -> TypeSpec {
    TypeSpec::optional(ValueType::Int)
}

pub fn int_ret() -> ReturnType {
    ReturnType::Value(TypeSpec::plain(ValueType::Int))
}

// ============================================================================
// Tag - the minimal entity (id, title, description)
// ============================================================================

#[derive(Debug)]
pub struct Tag {
    pub id: i64,
    pub title: String,
    pub description: String,
}

impl Tag {
    pub fn row(id: i64, title: &str, description: &str) -> Row {
        Arc::new(Tag {
            id,
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

impl Record for Tag {
    fn type_name(&self) -> &str {
        "Tag"
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id)),
            "title" => Some(Value::Text(self.title.clone())),
            "description" => Some(Value::Text(self.description.clone())),
            _ => None,
        }
    }
}

/// Entity description matching the `Tag` record.
pub fn tag_entity() -> TypeDef {
    TypeDef::new("Tag")
        .with_field(FieldDef::new("id", int_opt()))
        .with_field(FieldDef::new("title", text()))
        .with_field(FieldDef::new("description", text()))
}

/// Repository interface: size, save, findByTitle, findAll.
pub fn tag_interface() -> RepoDef {
    RepoDef::new("Tags")
        .with_method(MethodSig::new("size", vec![], int_ret()))
        .with_method(MethodSig::new(
            "save",
            vec![ParamType::Entity],
            ReturnType::Void,
        ))
        .with_method(MethodSig::new(
            "findByTitle",
            vec![ParamType::Value(text())],
            ReturnType::Entity,
        ))
        .with_method(MethodSig::new("findAll", vec![], ReturnType::List))
}

// ============================================================================
// Book - the three-property entity for DNF queries
// ============================================================================

#[derive(Debug)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl Book {
    pub fn row(id: i64, title: &str, author: &str, isbn: &str) -> Row {
        Arc::new(Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
        })
    }
}

impl Record for Book {
    fn type_name(&self) -> &str {
        "Book"
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id)),
            "title" => Some(Value::Text(self.title.clone())),
            "author" => Some(Value::Text(self.author.clone())),
            "isbn" => Some(Value::Text(self.isbn.clone())),
            _ => None,
        }
    }
}

/// Entity description matching the `Book` record.
pub fn book_entity() -> TypeDef {
    TypeDef::new("Book")
        .with_field(FieldDef::new("id", int_opt()))
        .with_field(FieldDef::new("title", text()))
        .with_field(FieldDef::new("author", text()))
        .with_field(FieldDef::new("isbn", text()))
}

/// Repository interface: save, remove, findByTitleAndAuthorOrIsbn.
pub fn book_interface() -> RepoDef {
    RepoDef::new("Books")
        .with_method(MethodSig::new(
            "save",
            vec![ParamType::Entity],
            ReturnType::Void,
        ))
        .with_method(MethodSig::new(
            "remove",
            vec![ParamType::Entity],
            ReturnType::Void,
        ))
        .with_method(MethodSig::new(
            "findByTitleAndAuthorOrIsbn",
            vec![
                ParamType::Value(text()),
                ParamType::Value(text()),
                ParamType::Value(text()),
            ],
            ReturnType::List,
        ))
}
