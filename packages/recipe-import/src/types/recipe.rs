//! Recipe entity types: the draft an extractor (or reviewer) produces and
//! the persisted entity storage hands back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timing metadata for a recipe, in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTimes {
    pub prep_minutes: Option<u32>,
    pub cook_minutes: Option<u32>,
    pub total_minutes: Option<u32>,
}

impl RecipeTimes {
    /// Check whether no timing information is present.
    pub fn is_empty(&self) -> bool {
        self.prep_minutes.is_none() && self.cook_minutes.is_none() && self.total_minutes.is_none()
    }
}

/// A recipe ready to persist but not yet stored.
///
/// Produced by a fully successful extraction, or by a human completing
/// review of a [`crate::types::partial::PartialExtraction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Recipe title.
    pub title: String,

    /// Ingredient lines, in display order.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Instruction steps, in execution order.
    #[serde(default)]
    pub instructions: Vec<String>,

    /// Timing metadata.
    #[serde(default)]
    pub times: RecipeTimes,

    /// The page this recipe was extracted from, for attribution.
    pub source_url: Option<String>,
}

impl RecipeDraft {
    /// Create a draft with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            times: RecipeTimes::default(),
            source_url: None,
        }
    }

    /// Set the ingredient lines.
    pub fn with_ingredients(
        mut self,
        ingredients: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Set the instruction steps.
    pub fn with_instructions(
        mut self,
        instructions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the timing metadata.
    pub fn with_times(mut self, times: RecipeTimes) -> Self {
        self.times = times;
        self
    }

    /// Set the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// A persisted recipe, scoped to the account that owns it.
///
/// `id` and `created_at` are assigned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub times: RecipeTimes,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Materialize a draft into a persisted entity for the given owner.
    ///
    /// Intended for storage implementations; application code receives
    /// recipes from [`crate::traits::store::RecipeStore::insert`].
    pub fn from_draft(draft: RecipeDraft, account_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            title: draft.title,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            times: draft.times,
            source_url: draft.source_url,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_builder() {
        let draft = RecipeDraft::new("Pancakes")
            .with_ingredients(["2 cups flour", "1 cup milk"])
            .with_instructions(["Mix", "Fry"])
            .with_times(RecipeTimes {
                prep_minutes: Some(10),
                cook_minutes: Some(15),
                total_minutes: Some(25),
            })
            .with_source_url("https://example.com/pancakes");

        assert_eq!(draft.title, "Pancakes");
        assert_eq!(draft.ingredients.len(), 2);
        assert_eq!(draft.instructions.len(), 2);
        assert_eq!(draft.times.total_minutes, Some(25));
        assert_eq!(
            draft.source_url.as_deref(),
            Some("https://example.com/pancakes")
        );
    }

    #[test]
    fn from_draft_assigns_identity_and_owner() {
        let owner = Uuid::new_v4();
        let recipe = Recipe::from_draft(RecipeDraft::new("Soup"), owner);
        assert_eq!(recipe.account_id, owner);
        assert_eq!(recipe.title, "Soup");
        assert_ne!(recipe.id, Uuid::nil());
    }

    #[test]
    fn empty_times_detection() {
        assert!(RecipeTimes::default().is_empty());
        let times = RecipeTimes {
            prep_minutes: Some(5),
            ..Default::default()
        };
        assert!(!times.is_empty());
    }
}
