//! Repository registration facade
//!
//! The [`Registry`] is the entry point the hosting container drives: one
//! `register` call runs the whole startup pipeline - analyze the entity,
//! derive the repository, bind a fresh store - and retains the resulting
//! repository under the interface name. Registration failures propagate
//! to the host untouched so invalid wiring is detected before the
//! application serves anything; a failed registration retains nothing.

use std::sync::Arc;

use dashmap::DashMap;
use quarry_core::{RepoDef, Result, TypeDef, TypeSpec};
use quarry_schema::analyze;
use quarry_storage::IndexStore;
use tracing::info;

use crate::derive::derive;
use crate::repository::Repository;

/// Process-wide collection of registered repositories
#[derive(Debug, Default)]
pub struct Registry {
    repositories: DashMap<String, Arc<Repository>>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            repositories: DashMap::new(),
        }
    }

    /// Register a repository interface over an entity type.
    ///
    /// Runs analyze → derive → store construction → dispatcher
    /// construction, then retains the repository under `repo`'s name.
    ///
    /// # Errors
    ///
    /// Propagates [`IntrospectionError`](quarry_core::IntrospectionError)
    /// and [`DerivationError`](quarry_core::DerivationError) from the
    /// startup pipeline; on failure nothing is retained.
    pub fn register(
        &self,
        entity: &TypeDef,
        repo: &RepoDef,
        id_type: TypeSpec,
    ) -> Result<Arc<Repository>> {
        let schema = Arc::new(analyze(entity)?);
        let descriptor = derive(repo, &id_type, &schema)?;
        let store = IndexStore::new(schema);
        let repository = Arc::new(Repository::new(descriptor, store));

        self.repositories
            .insert(repo.name().to_string(), repository.clone());
        info!(
            target: "quarry::engine",
            repository = %repo.name(),
            entity = %entity.name(),
            "Registered repository"
        );
        Ok(repository)
    }

    /// Look up a registered repository by interface name
    pub fn get(&self, name: &str) -> Option<Arc<Repository>> {
        self.repositories
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered repositories
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    /// Whether no repository is registered
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
