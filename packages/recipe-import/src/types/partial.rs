//! Partial extraction results awaiting human review.

use serde::{Deserialize, Serialize};

use crate::types::recipe::{RecipeDraft, RecipeTimes};

/// Required fields a recipe must have before it can be persisted.
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "ingredients", "instructions"];

/// The payload of a partially successful extraction.
///
/// Carries every field the extractor could determine plus the ordered list
/// of required fields it could not, so a human can fill the gaps and
/// complete the import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialExtraction {
    pub title: Option<String>,

    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default)]
    pub times: RecipeTimes,

    /// Required field names that could not be extracted, in
    /// [`REQUIRED_FIELDS`] order.
    pub missing_fields: Vec<String>,

    /// Carried through for attribution in the final entity.
    pub source_url: String,
}

impl PartialExtraction {
    /// Create an empty partial result for a URL.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            title: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            times: RecipeTimes::default(),
            missing_fields: Vec::new(),
            source_url: source_url.into(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
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

    /// Set the missing required fields.
    pub fn with_missing_fields(
        mut self,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.missing_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Recompute `missing_fields` from the populated fields.
    pub fn detect_missing(mut self) -> Self {
        let mut missing = Vec::new();
        if self.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            missing.push("title".to_string());
        }
        if self.ingredients.is_empty() {
            missing.push("ingredients".to_string());
        }
        if self.instructions.is_empty() {
            missing.push("instructions".to_string());
        }
        self.missing_fields = missing;
        self
    }

    /// Whether every required field is present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }

    /// Convert to a draft, if nothing required is missing.
    pub fn into_draft(self) -> Option<RecipeDraft> {
        if !self.is_complete() {
            return None;
        }
        let title = self.title?;
        Some(RecipeDraft {
            title,
            ingredients: self.ingredients,
            instructions: self.instructions,
            times: self.times,
            source_url: Some(self.source_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_missing_flags_absent_required_fields() {
        let partial = PartialExtraction::new("https://example.com/r")
            .with_title("Stew")
            .detect_missing();

        assert_eq!(partial.missing_fields, vec!["ingredients", "instructions"]);
        assert!(!partial.is_complete());
    }

    #[test]
    fn detect_missing_treats_blank_title_as_missing() {
        let partial = PartialExtraction::new("https://example.com/r")
            .with_title("  ")
            .with_ingredients(["salt"])
            .with_instructions(["cook"])
            .detect_missing();

        assert_eq!(partial.missing_fields, vec!["title"]);
    }

    #[test]
    fn complete_partial_converts_to_draft() {
        let draft = PartialExtraction::new("https://example.com/r")
            .with_title("Stew")
            .with_ingredients(["beef", "carrots"])
            .with_instructions(["simmer"])
            .detect_missing()
            .into_draft()
            .unwrap();

        assert_eq!(draft.title, "Stew");
        assert_eq!(draft.source_url.as_deref(), Some("https://example.com/r"));
    }

    #[test]
    fn incomplete_partial_does_not_convert() {
        let partial = PartialExtraction::new("https://example.com/r")
            .with_title("Stew")
            .detect_missing();
        assert!(partial.into_draft().is_none());
    }
}
