//! Scripted outcome substitution for end-to-end testing.
//!
//! When an orchestrator runs in scenario mode, URLs registered here
//! bypass the real extractor entirely and resolve to their scripted
//! outcome. Matching is exact on the URL string and happens once, when
//! the job enters its fetching phase.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::ImportError;
use crate::traits::extractor::ExtractOutcome;
use crate::types::partial::PartialExtraction;
use crate::types::recipe::RecipeDraft;

/// The outcome a scripted URL resolves to.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// The import succeeds with this draft.
    Complete(RecipeDraft),

    /// The import lands in review with these fields.
    Partial(PartialExtraction),

    /// The import fails with this error.
    Fail(ImportError),
}

impl From<ScriptedOutcome> for ExtractOutcome {
    fn from(scripted: ScriptedOutcome) -> Self {
        match scripted {
            ScriptedOutcome::Complete(draft) => ExtractOutcome::Complete(draft),
            ScriptedOutcome::Partial(partial) => ExtractOutcome::Partial(partial),
            ScriptedOutcome::Fail(error) => ExtractOutcome::Failed(error),
        }
    }
}

/// Exact-URL router from input URL to scripted outcome.
#[derive(Debug, Default)]
pub struct ScenarioRouter {
    routes: RwLock<HashMap<String, ScriptedOutcome>>,
}

impl ScenarioRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the scripted outcome for a URL.
    pub fn register(&self, url: impl Into<String>, outcome: ScriptedOutcome) {
        self.routes.write().unwrap().insert(url.into(), outcome);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_scenario(self, url: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.register(url, outcome);
        self
    }

    /// Scripted outcome for `url`, if one is registered.
    pub fn match_url(&self, url: &str) -> Option<ScriptedOutcome> {
        self.routes.read().unwrap().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_urls_only() {
        let router = ScenarioRouter::new()
            .with_scenario("https://example.com/pie", ScriptedOutcome::Complete(RecipeDraft::new("Pie")));

        assert!(router.match_url("https://example.com/pie").is_some());
        assert!(router.match_url("https://example.com/pie/").is_none());
        assert!(router.match_url("https://example.com/cake").is_none());
    }

    #[test]
    fn register_replaces_existing_routes() {
        let router = ScenarioRouter::new();
        router.register(
            "https://example.com/pie",
            ScriptedOutcome::Fail(ImportError::unknown("first")),
        );
        router.register(
            "https://example.com/pie",
            ScriptedOutcome::Complete(RecipeDraft::new("Pie")),
        );

        assert_eq!(router.len(), 1);
        assert!(matches!(
            router.match_url("https://example.com/pie"),
            Some(ScriptedOutcome::Complete(_))
        ));
    }

    #[test]
    fn scripted_outcomes_convert_to_extract_outcomes() {
        let outcome: ExtractOutcome =
            ScriptedOutcome::Fail(ImportError::import_failed("scripted failure")).into();
        assert!(matches!(outcome, ExtractOutcome::Failed(_)));
    }
}
