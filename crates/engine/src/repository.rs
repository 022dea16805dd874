//! The Invocation Dispatcher
//!
//! A [`Repository`] is built once per registration from a compiled
//! [`RepositoryDescriptor`] and a fresh [`IndexStore`]. Every call is
//! looked up by its stable method key and routed to the store with the
//! call's positional arguments.
//!
//! The store itself is unguarded; the dispatcher owns the
//! mutual-exclusion discipline. One `parking_lot::RwLock` per store: the
//! write lock guards the read-then-mutate upsert sequence, read locks
//! keep `count`/`find_*` consistent against concurrent mutation.

use std::fmt;

use parking_lot::RwLock;
use quarry_core::{ExecutionError, RepositoryError, Row, Value};
use quarry_schema::casing::standardize;
use quarry_storage::{IndexStore, QueryOutcome};
use tracing::debug;

use crate::derive::{method_key, QueryDescriptor, RepositoryDescriptor};

/// One positional argument of a repository call
#[derive(Debug, Clone)]
pub enum CallArg {
    /// A scalar value (bound to a predicate property)
    Value(Value),
    /// An entity handle (consumed by upsert/delete)
    Entity(Row),
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

impl From<Row> for CallArg {
    fn from(row: Row) -> Self {
        CallArg::Entity(row)
    }
}

/// Result of one repository call.
///
/// Each compiled query kind maps to a fixed outcome shape; `find_by`
/// additionally follows the cardinality policy (zero → `None`, one →
/// `Row`, several → `Rows`).
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// No return value (upsert)
    Unit,
    /// Row count
    Count(u64),
    /// A find with no match
    None,
    /// Exactly one matching row (the stored handle, not a copy)
    Row(Row),
    /// Matching rows in position order
    Rows(Vec<Row>),
}

/// Runtime-facing repository object: compiled descriptor plus bound store
pub struct Repository {
    descriptor: RepositoryDescriptor,
    store: RwLock<IndexStore>,
}

impl Repository {
    /// Bind a compiled descriptor to a fresh store
    pub fn new(descriptor: RepositoryDescriptor, store: IndexStore) -> Self {
        Self {
            descriptor,
            store: RwLock::new(store),
        }
    }

    /// The compiled descriptor this repository dispatches on
    pub fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    /// Dispatch one repository call.
    ///
    /// The method name may be given in its declared or standardized form;
    /// lookup standardizes it and appends the arity.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::UnmappedMethod`] when the call
    /// signature is absent from the compiled mapping (an
    /// internal-consistency violation - derivation makes this unreachable
    /// for well-formed registrations), and with
    /// [`RepositoryError::Execution`] for ordinary query failures.
    pub fn call(&self, method: &str, args: &[CallArg]) -> Result<CallOutcome, RepositoryError> {
        let key = method_key(&standardize(method), args.len());
        let Some(query) = self.descriptor.query(&key) else {
            return Err(RepositoryError::UnmappedMethod(method.to_string()));
        };
        debug!(
            target: "quarry::engine",
            repository = %self.descriptor.repository(),
            method = %method,
            query = %query,
            "Dispatching repository call"
        );

        match query {
            QueryDescriptor::Count => Ok(CallOutcome::Count(self.store.read().count())),
            QueryDescriptor::Upsert => {
                let row = entity_arg(method, args)?;
                self.store.write().upsert(row)?;
                Ok(CallOutcome::Unit)
            }
            QueryDescriptor::Delete => {
                let row = entity_arg(method, args)?;
                self.store.write().delete(&row)?;
                Ok(CallOutcome::Unit)
            }
            QueryDescriptor::FindAll => Ok(CallOutcome::Rows(self.store.read().find_all())),
            QueryDescriptor::FindBy(expr) => {
                let values = value_args(method, args)?;
                let outcome = self.store.read().find_by(expr, &values, method)?;
                Ok(match outcome {
                    QueryOutcome::None => CallOutcome::None,
                    QueryOutcome::One(row) => CallOutcome::Row(row),
                    QueryOutcome::Many(rows) => CallOutcome::Rows(rows),
                })
            }
        }
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("repository", &self.descriptor.repository())
            .field("entity", &self.descriptor.entity())
            .field("queries", &self.descriptor.len())
            .finish_non_exhaustive()
    }
}

/// The single entity argument of an upsert/delete call.
fn entity_arg(method: &str, args: &[CallArg]) -> Result<Row, ExecutionError> {
    match args {
        [CallArg::Entity(row)] => Ok(row.clone()),
        _ => Err(ExecutionError::InvalidArgument {
            method: method.to_string(),
            reason: "expected exactly one entity argument".to_string(),
        }),
    }
}

/// The scalar arguments of a find call.
fn value_args(method: &str, args: &[CallArg]) -> Result<Vec<Value>, ExecutionError> {
    args.iter()
        .map(|arg| match arg {
            CallArg::Value(value) => Ok(value.clone()),
            CallArg::Entity(_) => Err(ExecutionError::InvalidArgument {
                method: method.to_string(),
                reason: "expected value arguments".to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use quarry_core::{
        same_row, FieldDef, MethodSig, ParamType, Record, RepoDef, ReturnType, TypeDef, TypeSpec,
        ValueType,
    };
    use quarry_schema::analyze;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Tag {
        id: i64,
        title: String,
    }

    impl Tag {
        fn row(id: i64, title: &str) -> Row {
            Arc::new(Tag {
                id,
                title: title.to_string(),
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
                _ => None,
            }
        }
    }

    fn tag_repository() -> Repository {
        let ty = TypeDef::new("Tag")
            .with_field(FieldDef::new("id", TypeSpec::optional(ValueType::Int)))
            .with_field(FieldDef::new("title", TypeSpec::plain(ValueType::Text)));
        let schema = Arc::new(analyze(&ty).unwrap());

        let repo = RepoDef::new("Tags")
            .with_method(MethodSig::new(
                "size",
                vec![],
                ReturnType::Value(TypeSpec::plain(ValueType::Int)),
            ))
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
                "findByTitle",
                vec![ParamType::Value(TypeSpec::plain(ValueType::Text))],
                ReturnType::Entity,
            ))
            .with_method(MethodSig::new("findAll", vec![], ReturnType::List));

        let descriptor = derive(&repo, &TypeSpec::optional(ValueType::Int), &schema).unwrap();
        Repository::new(descriptor, IndexStore::new(schema))
    }

    #[test]
    fn test_count_save_find_cycle() {
        let repo = tag_repository();
        assert!(matches!(
            repo.call("size", &[]).unwrap(),
            CallOutcome::Count(0)
        ));

        let a = Tag::row(1, "a");
        repo.call("save", &[a.clone().into()]).unwrap();
        repo.call("save", &[Tag::row(2, "b").into()]).unwrap();
        assert!(matches!(
            repo.call("size", &[]).unwrap(),
            CallOutcome::Count(2)
        ));

        match repo.call("findByTitle", &[Value::from("a").into()]).unwrap() {
            CallOutcome::Row(row) => assert!(same_row(&row, &a)),
            other => panic!("expected Row, got {:?}", other),
        }
    }

    #[test]
    fn test_find_by_zero_hits_is_none() {
        let repo = tag_repository();
        repo.call("save", &[Tag::row(1, "a").into()]).unwrap();
        assert!(matches!(
            repo.call("findByTitle", &[Value::from("z").into()]).unwrap(),
            CallOutcome::None
        ));
    }

    #[test]
    fn test_find_all_returns_all_rows() {
        let repo = tag_repository();
        repo.call("save", &[Tag::row(1, "a").into()]).unwrap();
        repo.call("save", &[Tag::row(2, "b").into()]).unwrap();
        match repo.call("findAll", &[]).unwrap() {
            CallOutcome::Rows(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected Rows, got {:?}", other),
        }
    }

    #[test]
    fn test_call_accepts_standardized_names() {
        let repo = tag_repository();
        repo.call("save", &[Tag::row(1, "a").into()]).unwrap();
        assert!(matches!(
            repo.call("find_by_title", &[Value::from("a").into()]).unwrap(),
            CallOutcome::Row(_)
        ));
    }

    #[test]
    fn test_unmapped_method_is_internal_consistency_error() {
        let repo = tag_repository();
        let err = repo.call("mystery", &[]).unwrap_err();
        assert_eq!(err, RepositoryError::UnmappedMethod("mystery".into()));
    }

    #[test]
    fn test_arity_is_part_of_the_key() {
        let repo = tag_repository();
        // findByTitle is compiled at arity 1; arity 2 is unmapped
        let err = repo
            .call(
                "findByTitle",
                &[Value::from("a").into(), Value::from("b").into()],
            )
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UnmappedMethod(_)));
    }

    #[test]
    fn test_delete_surfaces_unimplemented() {
        let repo = tag_repository();
        let row = Tag::row(1, "a");
        repo.call("save", &[row.clone().into()]).unwrap();
        let err = repo.call("remove", &[row.into()]).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Execution(ExecutionError::Unimplemented {
                operation: "delete".into()
            })
        );
    }

    #[test]
    fn test_upsert_rejects_value_argument() {
        let repo = tag_repository();
        let err = repo.call("save", &[Value::from("a").into()]).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Execution(ExecutionError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_find_by_rejects_entity_argument() {
        let repo = tag_repository();
        let err = repo.call("findByTitle", &[Tag::row(1, "a").into()]).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Execution(ExecutionError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_debug_names_the_binding() {
        let repo = tag_repository();
        let rendered = format!("{:?}", repo);
        assert!(rendered.contains("Tags"));
        assert!(rendered.contains("Tag"));
    }
}
