//! In-memory recipe store with a read-through list cache.
//!
//! Useful for local development and for exercising the cache-coherence
//! contract: inserts do NOT touch the cache, so a stale list is
//! observable until `invalidate` runs. The orchestrator is the party
//! responsible for invalidating before announcing completion.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::traits::store::RecipeStore;
use crate::types::recipe::{Recipe, RecipeDraft};

#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    recipes: RwLock<Vec<Recipe>>,
    list_cache: RwLock<HashMap<Uuid, Vec<Recipe>>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The owner's collection, served from the list cache when warm.
    pub fn list(&self, owner: Uuid) -> Vec<Recipe> {
        if let Some(cached) = self.list_cache.read().unwrap().get(&owner) {
            return cached.clone();
        }

        let fresh: Vec<Recipe> = self
            .recipes
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == owner)
            .cloned()
            .collect();
        self.list_cache
            .write()
            .unwrap()
            .insert(owner, fresh.clone());
        fresh
    }

    /// Total stored recipes across all owners.
    pub fn recipe_count(&self) -> usize {
        self.recipes.read().unwrap().len()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn insert(&self, draft: RecipeDraft, owner: Uuid) -> Result<Recipe, StoreError> {
        let recipe = Recipe::from_draft(draft, owner);
        self.recipes.write().unwrap().push(recipe.clone());
        debug!(recipe_id = %recipe.id, %owner, "stored recipe");
        Ok(recipe)
    }

    async fn invalidate(&self, owner: Uuid) {
        self.list_cache.write().unwrap().remove(&owner);
        debug!(%owner, "invalidated recipe list cache");
    }
}
