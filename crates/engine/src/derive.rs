//! The Query Deriver: repository interface → compiled query descriptors
//!
//! Every abstract method reachable from the repository interface is
//! collected (own methods first, then extended interfaces depth-first in
//! declaration order, de-duplicated by method key) and classified by its
//! standardized name into one tagged [`QueryDescriptor`]. `find_by`
//! predicates are flattened left to right into strict DNF: `and` separates
//! terms inside the current group, `or` closes the group and opens the
//! next. There is no precedence parsing and no nesting.
//!
//! Derivation runs once at registration and is deterministic: the same
//! repository description always compiles to an equal descriptor.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use quarry_core::{
    AndGroup, DerivationError, DnfExpr, MethodSig, ParamType, RepoDef, ReturnType, TypeSpec,
};
use quarry_schema::casing::{standardize, tokens};
use quarry_schema::PropertySchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Compiled representation of one repository method's intended operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryDescriptor {
    /// Row count
    Count,
    /// Insert-or-reindex of one entity
    Upsert,
    /// Recognized and compiled, but with no executor behavior
    Delete,
    /// All rows in position order
    FindAll,
    /// Equality query over the compiled DNF expression
    FindBy(DnfExpr),
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryDescriptor::Count => write!(f, "count"),
            QueryDescriptor::Upsert => write!(f, "upsert"),
            QueryDescriptor::Delete => write!(f, "delete"),
            QueryDescriptor::FindAll => write!(f, "find_all"),
            QueryDescriptor::FindBy(expr) => write!(f, "find_by({})", expr),
        }
    }
}

/// Compiled mapping of one repository interface.
///
/// Created once at registration and immutable afterwards. Queries are
/// keyed by the stable method key (standardized name plus arity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    entity: String,
    repository: String,
    id_type: TypeSpec,
    queries: BTreeMap<String, QueryDescriptor>,
}

impl RepositoryDescriptor {
    /// The owning entity type name
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The repository interface name
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The validated primary-key type
    pub fn id_type(&self) -> &TypeSpec {
        &self.id_type
    }

    /// All compiled queries with their method keys, in key order
    pub fn queries(&self) -> impl Iterator<Item = (&str, &QueryDescriptor)> {
        self.queries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up one compiled query by method key
    pub fn query(&self, key: &str) -> Option<&QueryDescriptor> {
        self.queries.get(key)
    }

    /// Number of compiled queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether no queries were compiled
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// The stable method key: standardized name plus arity.
///
/// This is the descriptor string the dispatcher routes on.
pub(crate) fn method_key(standardized: &str, arity: usize) -> String {
    format!("{}/{}", standardized, arity)
}

/// Collect reachable methods: own first, then extended interfaces
/// depth-first, de-duplicated by method key (first declaration wins).
fn collect_methods<'r>(
    repo: &'r RepoDef,
    seen: &mut BTreeSet<String>,
    out: &mut Vec<&'r MethodSig>,
) {
    for sig in repo.methods() {
        let key = method_key(&standardize(&sig.name), sig.params.len());
        if seen.insert(key) {
            out.push(sig);
        }
    }
    for parent in repo.extends() {
        collect_methods(parent, seen, out);
    }
}

/// Flatten the token sequence after `by` into strict DNF groups.
fn parse_predicate(predicate: &[&str], method: &str) -> Result<DnfExpr, DerivationError> {
    let mut groups: Vec<AndGroup> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for &token in predicate {
        match token {
            // Separator between terms of the current group
            "and" => {}
            "or" => {
                if current.is_empty() {
                    return Err(DerivationError::MalformedPredicate {
                        method: method.to_string(),
                    });
                }
                groups.push(AndGroup::new(std::mem::take(&mut current)));
            }
            term => current.push(term.to_string()),
        }
    }

    if current.is_empty() {
        return Err(DerivationError::MalformedPredicate {
            method: method.to_string(),
        });
    }
    groups.push(AndGroup::new(current));
    Ok(DnfExpr::new(groups))
}

/// Classify one method by its standardized name.
fn classify(sig: &MethodSig, standardized: &str) -> Result<QueryDescriptor, DerivationError> {
    match standardized {
        "size" | "count" | "length" => {
            if sig.params.is_empty() && sig.ret.is_integer() {
                Ok(QueryDescriptor::Count)
            } else {
                Err(DerivationError::CountSignature {
                    method: sig.name.clone(),
                })
            }
        }
        "save" | "update" => {
            let entity_param = matches!(sig.params.as_slice(), [ParamType::Entity]);
            let ret_ok = matches!(sig.ret, ReturnType::Void | ReturnType::Entity);
            if entity_param && ret_ok {
                Ok(QueryDescriptor::Upsert)
            } else {
                Err(DerivationError::UpsertSignature {
                    method: sig.name.clone(),
                })
            }
        }
        "remove" | "delete" => {
            if matches!(sig.params.as_slice(), [ParamType::Entity]) {
                Ok(QueryDescriptor::Delete)
            } else {
                Err(DerivationError::DeleteSignature {
                    method: sig.name.clone(),
                })
            }
        }
        _ => {
            let toks: Vec<&str> = tokens(standardized).collect();
            let unsupported = || DerivationError::UnsupportedMethod {
                method: sig.name.clone(),
            };
            let Some((&first, rest)) = toks.split_first() else {
                return Err(unsupported());
            };
            if first != "get" && first != "find" {
                return Err(unsupported());
            }

            if rest == ["all"] && sig.params.is_empty() && matches!(sig.ret, ReturnType::List) {
                Ok(QueryDescriptor::FindAll)
            } else if rest.first() == Some(&"by") && rest.len() > 1 {
                parse_predicate(&rest[1..], &sig.name).map(QueryDescriptor::FindBy)
            } else {
                Err(unsupported())
            }
        }
    }
}

/// Compile a repository interface against an entity schema.
///
/// # Errors
///
/// Fails with [`DerivationError::IdTypeMismatch`] when the declared id
/// type disagrees with the schema's primary key, and with the matching
/// signature error when any reachable method fits no recognized
/// convention.
pub fn derive(
    repo: &RepoDef,
    id_type: &TypeSpec,
    schema: &PropertySchema,
) -> Result<RepositoryDescriptor, DerivationError> {
    if !id_type.compatible(schema.primary_key_type()) {
        return Err(DerivationError::IdTypeMismatch {
            repo: repo.name().to_string(),
            expected: *schema.primary_key_type(),
            declared: *id_type,
        });
    }

    let mut seen = BTreeSet::new();
    let mut methods = Vec::new();
    collect_methods(repo, &mut seen, &mut methods);

    let mut queries = BTreeMap::new();
    for sig in methods {
        let standardized = standardize(&sig.name);
        let descriptor = classify(sig, &standardized)?;
        debug!(
            target: "quarry::engine",
            repository = %repo.name(),
            method = %sig.name,
            query = %descriptor,
            "Compiled repository method"
        );
        queries.insert(method_key(&standardized, sig.params.len()), descriptor);
    }

    let descriptor = RepositoryDescriptor {
        entity: schema.entity().to_string(),
        repository: repo.name().to_string(),
        id_type: *id_type,
        queries,
    };
    info!(
        target: "quarry::engine",
        repository = %descriptor.repository,
        entity = %descriptor.entity,
        methods = descriptor.len(),
        "Derived repository descriptor"
    );
    Ok(descriptor)
}
