//! IndexStore: append-only rows with per-property inverted indices
//!
//! One store exists per registered entity type. It holds:
//! - `rows`: an ordered, append-only sequence of entity handles
//! - `indices`: for every readable schema property, a map from property
//!   value (canonicalized as [`IndexKey`]) to the set of row positions
//!   holding that value
//!
//! # Design Notes
//!
//! - **Row identity, not value equality**: `upsert` reuses the position of
//!   a row only when the handle points at the same allocation.
//! - **Indices only grow**: `upsert` always adds the row's position under
//!   the *current* value of every readable property and never removes the
//!   position from buckets of previous values. Repeated updates of one
//!   logical row therefore accumulate stale entries; a query on a stale
//!   value still finds the row. This is the engine's observed behavior,
//!   kept as-is and surfaced through `index_entry_count` and a warning.
//! - **No deletion path**: `delete` is a compiled query kind with no
//!   executor behavior; it fails explicitly instead of silently
//!   succeeding.
//! - **Unguarded access**: the store itself takes no locks; the dispatcher
//!   owns the mutual-exclusion discipline.

use std::collections::BTreeSet;
use std::sync::Arc;

use quarry_core::{same_row, DnfExpr, ExecutionError, IndexKey, Row, Value};
use quarry_schema::PropertySchema;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::bind::bind_arguments;

/// Result of one `find_by` execution.
///
/// The result policy is cardinality-driven: zero rows is `None`, exactly
/// one row is that row (the stored handle, not a copy), several rows are a
/// list in position order.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// No row matched
    None,
    /// Exactly one row matched
    One(Row),
    /// Two or more rows matched, in position order
    Many(Vec<Row>),
}

/// In-memory row store with one inverted index per readable property
#[derive(Debug)]
pub struct IndexStore {
    schema: Arc<PropertySchema>,
    rows: Vec<Row>,
    indices: FxHashMap<String, FxHashMap<IndexKey, BTreeSet<usize>>>,
}

impl IndexStore {
    /// An empty store for the given entity schema.
    ///
    /// One (empty) inverted index is created per readable property.
    pub fn new(schema: Arc<PropertySchema>) -> Self {
        let mut indices = FxHashMap::default();
        for (property, _) in schema.readable_properties() {
            indices.insert(property.to_string(), FxHashMap::default());
        }
        Self {
            schema,
            rows: Vec::new(),
            indices,
        }
    }

    /// The entity schema this store was built from
    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// Current row count
    pub fn count(&self) -> u64 {
        self.rows.len() as u64
    }

    /// Whether the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of positions recorded across all index buckets.
    ///
    /// Grows past `count() * properties` as stale entries accumulate;
    /// useful for observing index growth from repeated updates.
    pub fn index_entry_count(&self) -> u64 {
        self.indices
            .values()
            .flat_map(|index| index.values())
            .map(|positions| positions.len() as u64)
            .sum()
    }

    /// Insert a row or re-index an existing one.
    ///
    /// The row's position is found by handle identity among current rows;
    /// a new row is appended. Every readable property is then read through
    /// its resolved getter and the position is added to that property's
    /// bucket for the current value. Stale buckets from earlier values of
    /// the same row are left in place.
    ///
    /// # Errors
    ///
    /// Fails with [`ExecutionError::PropertyRead`] when a readable
    /// property cannot be read from the row.
    pub fn upsert(&mut self, row: Row) -> Result<(), ExecutionError> {
        let position = match self.rows.iter().position(|r| same_row(r, &row)) {
            Some(position) => {
                warn!(
                    target: "quarry::storage",
                    entity = %self.schema.entity(),
                    position,
                    "Re-indexing an existing row; stale index entries accumulate"
                );
                position
            }
            None => {
                self.rows.push(row.clone());
                self.rows.len() - 1
            }
        };

        for (property, getter) in self.schema.readable_properties() {
            let value =
                getter
                    .read(row.as_ref())
                    .ok_or_else(|| ExecutionError::PropertyRead {
                        entity: self.schema.entity().to_string(),
                        property: property.to_string(),
                        context: "indexing an upserted row".to_string(),
                    })?;
            if let Some(index) = self.indices.get_mut(property) {
                index
                    .entry(IndexKey::from(&value))
                    .or_default()
                    .insert(position);
            }
        }

        debug!(
            target: "quarry::storage",
            entity = %self.schema.entity(),
            position,
            rows = self.rows.len(),
            "Indexed row"
        );
        Ok(())
    }

    /// Execute a compiled `find_by` expression.
    ///
    /// Arguments bind positionally to distinct properties in scan order
    /// (see [`bind_arguments`]). Within each AND-group the per-term bucket
    /// sets are intersected - a term whose bucket lacks the bound value
    /// collapses the whole group to empty - and the per-group results are
    /// unioned.
    ///
    /// # Errors
    ///
    /// Fails with [`ExecutionError::NotEnoughArguments`] when fewer
    /// arguments are supplied than the expression binds.
    pub fn find_by(
        &self,
        expr: &DnfExpr,
        args: &[Value],
        method: &str,
    ) -> Result<QueryOutcome, ExecutionError> {
        let bound = bind_arguments(expr, args, method)?;

        let mut hits: BTreeSet<usize> = BTreeSet::new();
        for group in expr.groups() {
            let mut group_hits: Option<BTreeSet<usize>> = None;
            for term in group.terms() {
                let value = match bound.get(term.as_str()) {
                    Some(value) => *value,
                    // Unreachable: binding covers every term of the expression
                    None => continue,
                };

                if !self.indices.contains_key(term.as_str()) {
                    warn!(
                        target: "quarry::storage",
                        entity = %self.schema.entity(),
                        property = %term,
                        "Predicate references a property with no index"
                    );
                }

                let positions = self
                    .indices
                    .get(term.as_str())
                    .and_then(|index| index.get(&IndexKey::from(value)))
                    .cloned()
                    .unwrap_or_default();

                group_hits = Some(match group_hits {
                    None => positions,
                    Some(acc) => acc.intersection(&positions).copied().collect(),
                });
                if group_hits.as_ref().is_some_and(BTreeSet::is_empty) {
                    break;
                }
            }
            if let Some(group_hits) = group_hits {
                hits.extend(group_hits);
            }
        }

        let mut rows: Vec<Row> = hits.iter().map(|&pos| self.rows[pos].clone()).collect();
        debug!(
            target: "quarry::storage",
            entity = %self.schema.entity(),
            method = %method,
            matches = rows.len(),
            "Executed find_by"
        );
        Ok(match rows.len() {
            0 => QueryOutcome::None,
            1 => QueryOutcome::One(rows.remove(0)),
            _ => QueryOutcome::Many(rows),
        })
    }

    /// All rows as a list, in position order
    pub fn find_all(&self) -> Vec<Row> {
        self.rows.clone()
    }

    /// Delete a row.
    ///
    /// Delete is a recognized, compiled query kind with no executor
    /// behavior in this engine; it fails explicitly rather than silently
    /// doing nothing.
    ///
    /// # Errors
    ///
    /// Always fails with [`ExecutionError::Unimplemented`].
    pub fn delete(&mut self, _row: &Row) -> Result<(), ExecutionError> {
        Err(ExecutionError::Unimplemented {
            operation: "delete".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{AndGroup, FieldDef, Record, TypeDef, TypeSpec, ValueType};
    use quarry_schema::analyze;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Doc {
        id: i64,
        title: Mutex<String>,
        author: String,
        isbn: String,
    }

    impl Doc {
        fn new(id: i64, title: &str, author: &str, isbn: &str) -> Row {
            Arc::new(Doc {
                id,
                title: Mutex::new(title.to_string()),
                author: author.to_string(),
                isbn: isbn.to_string(),
            })
        }
    }

    impl Record for Doc {
        fn type_name(&self) -> &str {
            "Doc"
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::Int(self.id)),
                "title" => Some(Value::Text(self.title.lock().unwrap().clone())),
                "author" => Some(Value::Text(self.author.clone())),
                "isbn" => Some(Value::Text(self.isbn.clone())),
                _ => None,
            }
        }
    }

    fn doc_schema() -> Arc<PropertySchema> {
        let ty = TypeDef::new("Doc")
            .with_field(FieldDef::new("id", TypeSpec::optional(ValueType::Int)))
            .with_field(FieldDef::new("title", TypeSpec::plain(ValueType::Text)))
            .with_field(FieldDef::new("author", TypeSpec::plain(ValueType::Text)))
            .with_field(FieldDef::new("isbn", TypeSpec::plain(ValueType::Text)));
        Arc::new(analyze(&ty).unwrap())
    }

    fn expr(groups: Vec<Vec<&str>>) -> DnfExpr {
        DnfExpr::new(groups.into_iter().map(AndGroup::new).collect())
    }

    // ------------------------------------------------------------------
    // Count and append
    // ------------------------------------------------------------------

    #[test]
    fn test_count_zero_on_creation() {
        let store = IndexStore::new(doc_schema());
        assert_eq!(store.count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_count_after_distinct_upserts() {
        let mut store = IndexStore::new(doc_schema());
        store.upsert(Doc::new(1, "a", "x", "111")).unwrap();
        store.upsert(Doc::new(2, "b", "y", "222")).unwrap();
        store.upsert(Doc::new(3, "c", "z", "333")).unwrap();
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_upsert_same_handle_reuses_position() {
        let mut store = IndexStore::new(doc_schema());
        let row = Doc::new(1, "a", "x", "111");
        store.upsert(row.clone()).unwrap();
        store.upsert(row).unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_value_equal_rows_are_distinct() {
        // Identity is by handle, not by value
        let mut store = IndexStore::new(doc_schema());
        store.upsert(Doc::new(1, "a", "x", "111")).unwrap();
        store.upsert(Doc::new(1, "a", "x", "111")).unwrap();
        assert_eq!(store.count(), 2);
    }

    // ------------------------------------------------------------------
    // find_by
    // ------------------------------------------------------------------

    #[test]
    fn test_find_by_single_hit_returns_stored_handle() {
        let mut store = IndexStore::new(doc_schema());
        let row = Doc::new(1, "a", "x", "111");
        store.upsert(row.clone()).unwrap();
        store.upsert(Doc::new(2, "b", "y", "222")).unwrap();

        let outcome = store
            .find_by(&expr(vec![vec!["title"]]), &[Value::from("a")], "findByTitle")
            .unwrap();
        match outcome {
            QueryOutcome::One(found) => assert!(same_row(&found, &row)),
            other => panic!("expected One, got {:?}", other),
        }
    }

    #[test]
    fn test_find_by_no_hit_is_none() {
        let mut store = IndexStore::new(doc_schema());
        store.upsert(Doc::new(1, "a", "x", "111")).unwrap();
        let outcome = store
            .find_by(&expr(vec![vec!["title"]]), &[Value::from("z")], "findByTitle")
            .unwrap();
        assert!(matches!(outcome, QueryOutcome::None));
    }

    #[test]
    fn test_find_by_or_groups_union_in_position_order() {
        let mut store = IndexStore::new(doc_schema());
        let first = Doc::new(1, "t", "a", "000");
        let second = Doc::new(2, "other", "other", "i");
        store.upsert(first.clone()).unwrap();
        store.upsert(second.clone()).unwrap();

        // title and author or isbn: first matches group one, second group two
        let outcome = store
            .find_by(
                &expr(vec![vec!["title", "author"], vec!["isbn"]]),
                &[Value::from("t"), Value::from("a"), Value::from("i")],
                "findByTitleAndAuthorOrIsbn",
            )
            .unwrap();
        match outcome {
            QueryOutcome::Many(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(same_row(&rows[0], &first));
                assert!(same_row(&rows[1], &second));
            }
            other => panic!("expected Many, got {:?}", other),
        }
    }

    #[test]
    fn test_find_by_and_group_intersects() {
        let mut store = IndexStore::new(doc_schema());
        store.upsert(Doc::new(1, "t", "a", "111")).unwrap();
        store.upsert(Doc::new(2, "t", "b", "222")).unwrap();

        let outcome = store
            .find_by(
                &expr(vec![vec!["title", "author"]]),
                &[Value::from("t"), Value::from("a")],
                "findByTitleAndAuthor",
            )
            .unwrap();
        match outcome {
            QueryOutcome::One(row) => assert_eq!(row.field("id"), Some(Value::Int(1))),
            other => panic!("expected One, got {:?}", other),
        }
    }

    #[test]
    fn test_find_by_missing_arguments_fail() {
        let store = IndexStore::new(doc_schema());
        let err = store
            .find_by(
                &expr(vec![vec!["title", "author"]]),
                &[Value::from("t")],
                "findByTitleAndAuthor",
            )
            .unwrap_err();
        assert!(matches!(err, ExecutionError::NotEnoughArguments { .. }));
    }

    #[test]
    fn test_find_by_unknown_property_collapses_group() {
        let mut store = IndexStore::new(doc_schema());
        store.upsert(Doc::new(1, "t", "a", "111")).unwrap();
        let outcome = store
            .find_by(
                &expr(vec![vec!["publisher"]]),
                &[Value::from("p")],
                "findByPublisher",
            )
            .unwrap();
        assert!(matches!(outcome, QueryOutcome::None));
    }

    // ------------------------------------------------------------------
    // Stale index entries (documented behavior)
    // ------------------------------------------------------------------

    #[test]
    fn test_reupserting_changed_row_keeps_stale_entries() {
        let mut store = IndexStore::new(doc_schema());
        let doc = Arc::new(Doc {
            id: 1,
            title: Mutex::new("old".to_string()),
            author: "x".to_string(),
            isbn: "111".to_string(),
        });
        let row: Row = doc.clone();
        store.upsert(row.clone()).unwrap();
        let entries_before = store.index_entry_count();

        // Change the title and re-save the same handle
        *doc.title.lock().unwrap() = "new".to_string();
        store.upsert(row.clone()).unwrap();

        assert_eq!(store.count(), 1);
        // The old bucket still resolves the row
        let stale = store
            .find_by(&expr(vec![vec!["title"]]), &[Value::from("old")], "findByTitle")
            .unwrap();
        assert!(matches!(stale, QueryOutcome::One(_)));
        // And so does the new one
        let fresh = store
            .find_by(&expr(vec![vec!["title"]]), &[Value::from("new")], "findByTitle")
            .unwrap();
        assert!(matches!(fresh, QueryOutcome::One(_)));
        // The title index now carries one extra (stale) entry
        assert_eq!(store.index_entry_count(), entries_before + 1);
    }

    // ------------------------------------------------------------------
    // find_all and delete
    // ------------------------------------------------------------------

    #[test]
    fn test_find_all_in_position_order() {
        let mut store = IndexStore::new(doc_schema());
        let first = Doc::new(1, "a", "x", "111");
        let second = Doc::new(2, "b", "y", "222");
        store.upsert(first.clone()).unwrap();
        store.upsert(second.clone()).unwrap();

        let all = store.find_all();
        assert_eq!(all.len(), 2);
        assert!(same_row(&all[0], &first));
        assert!(same_row(&all[1], &second));
    }

    #[test]
    fn test_delete_is_explicitly_unimplemented() {
        let mut store = IndexStore::new(doc_schema());
        let row = Doc::new(1, "a", "x", "111");
        store.upsert(row.clone()).unwrap();
        let err = store.delete(&row).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Unimplemented {
                operation: "delete".into()
            }
        );
        // And nothing was removed
        assert_eq!(store.count(), 1);
    }

    // ------------------------------------------------------------------
    // Property read failures
    // ------------------------------------------------------------------

    #[test]
    fn test_upsert_fails_when_property_unreadable() {
        // Schema declares a property the record does not expose
        let ty = TypeDef::new("Doc")
            .with_field(FieldDef::new("id", TypeSpec::optional(ValueType::Int)))
            .with_field(FieldDef::new("ghost", TypeSpec::plain(ValueType::Text)));
        let mut store = IndexStore::new(Arc::new(analyze(&ty).unwrap()));

        let err = store.upsert(Doc::new(1, "a", "x", "111")).unwrap_err();
        match err {
            ExecutionError::PropertyRead { property, .. } => assert_eq!(property, "ghost"),
            other => panic!("expected PropertyRead, got {:?}", other),
        }
    }
}
