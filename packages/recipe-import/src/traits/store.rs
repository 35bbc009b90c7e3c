//! Persistence and cache-coherence boundary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::recipe::{Recipe, RecipeDraft};

/// Durable storage for finished recipes, scoped to an owning account.
///
/// The orchestrator guarantees `invalidate` is called before the
/// `Complete` event for an insert is emitted, so any read of the owner's
/// collection issued after that event observes the new entity.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert a finished recipe for the owner. Storage assigns the entity
    /// id and creation timestamp.
    async fn insert(&self, draft: RecipeDraft, owner: Uuid) -> Result<Recipe, StoreError>;

    /// Drop any read-through cache entries for the owner's collection.
    async fn invalidate(&self, owner: Uuid);
}
