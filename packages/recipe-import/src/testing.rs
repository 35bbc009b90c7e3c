//! Call-tracking mocks for orchestrator tests.
//!
//! `MockExtractor` plays back a scripted sequence of per-attempt outcomes
//! for each URL and records every call it receives, so tests can assert
//! both behavior and interaction. `MockRecipeStore` records inserts and
//! invalidations and can be flipped into a failing mode at runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ImportError, StoreError};
use crate::traits::extractor::{ExtractOptions, ExtractOutcome, RecipeExtractor, RetryHook};
use crate::traits::store::RecipeStore;
use crate::types::partial::PartialExtraction;
use crate::types::recipe::{Recipe, RecipeDraft};

/// One scripted attempt outcome for a URL.
#[derive(Debug, Clone)]
pub enum MockAttempt {
    /// This attempt fails; the extractor retries if budget remains.
    Fail(ImportError),

    /// This attempt succeeds with a complete draft.
    Succeed(RecipeDraft),

    /// This attempt resolves to a partial extraction.
    Partial(PartialExtraction),
}

/// Record of one `extract` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockExtractorCall {
    pub url: String,
    pub max_retries: u32,
}

/// Scripted extractor. Each URL maps to a sequence of attempt outcomes;
/// the last entry repeats if the budget outlasts the script.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    scripts: Arc<RwLock<HashMap<String, Vec<MockAttempt>>>>,
    calls: Arc<RwLock<Vec<MockExtractorCall>>>,
    fail_hard: Arc<AtomicBool>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a single outcome for every attempt on `url`.
    pub fn with_outcome(self, url: impl Into<String>, attempt: MockAttempt) -> Self {
        self.with_attempts(url, vec![attempt])
    }

    /// Script a per-attempt outcome sequence for `url`.
    pub fn with_attempts(self, url: impl Into<String>, attempts: Vec<MockAttempt>) -> Self {
        self.scripts.write().unwrap().insert(url.into(), attempts);
        self
    }

    /// Make every call return `Err` instead of a classified outcome.
    pub fn fail_hard(self) -> Self {
        self.fail_hard.store(true, Ordering::SeqCst);
        self
    }

    /// Every call this extractor has received, in order.
    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl RecipeExtractor for MockExtractor {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
        on_retry: RetryHook<'_>,
    ) -> Result<ExtractOutcome, ImportError> {
        self.calls.write().unwrap().push(MockExtractorCall {
            url: url.to_string(),
            max_retries: options.max_retries,
        });

        if self.fail_hard.load(Ordering::SeqCst) {
            return Err(ImportError::unknown("mock extractor panic path"));
        }

        let script = self.scripts.read().unwrap().get(url).cloned();
        let Some(script) = script.filter(|s| !s.is_empty()) else {
            return Ok(ExtractOutcome::Failed(ImportError::import_failed(
                format!("no scripted outcome for {url}"),
            )));
        };

        let budget = options.max_retries.max(1);
        for attempt in 1..=budget {
            let index = ((attempt - 1) as usize).min(script.len() - 1);
            match &script[index] {
                MockAttempt::Succeed(draft) => {
                    return Ok(ExtractOutcome::Complete(draft.clone()))
                }
                MockAttempt::Partial(partial) => {
                    return Ok(ExtractOutcome::Partial(partial.clone()))
                }
                MockAttempt::Fail(error) => {
                    if attempt < budget {
                        on_retry(attempt, error);
                    } else {
                        return Ok(ExtractOutcome::Failed(error.clone()));
                    }
                }
            }
        }
        unreachable!("attempt loop always returns")
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Recording store with a runtime-switchable failure mode.
#[derive(Debug, Clone, Default)]
pub struct MockRecipeStore {
    inserted: Arc<RwLock<Vec<Recipe>>>,
    invalidated: Arc<RwLock<Vec<Uuid>>>,
    fail_inserts: Arc<AtomicBool>,
}

impl MockRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail.
    pub fn failing(self) -> Self {
        self.fail_inserts.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_inserts.store(failing, Ordering::SeqCst);
    }

    /// Recipes inserted so far, in order.
    pub fn inserted(&self) -> Vec<Recipe> {
        self.inserted.read().unwrap().clone()
    }

    /// Owners whose caches were invalidated, in order.
    pub fn invalidations(&self) -> Vec<Uuid> {
        self.invalidated.read().unwrap().clone()
    }
}

#[async_trait]
impl RecipeStore for MockRecipeStore {
    async fn insert(&self, draft: RecipeDraft, owner: Uuid) -> Result<Recipe, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "mock store offline".to_string(),
            });
        }
        let recipe = Recipe::from_draft(draft, owner);
        self.inserted.write().unwrap().push(recipe.clone());
        Ok(recipe)
    }

    async fn invalidate(&self, owner: Uuid) {
        self.invalidated.write().unwrap().push(owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn noop_hook() -> impl Fn(u32, &ImportError) + Send + Sync {
        |_, _| {}
    }

    #[tokio::test]
    async fn mock_extractor_records_calls_and_plays_script() {
        let extractor = MockExtractor::new()
            .with_outcome("https://example.com/pie", MockAttempt::Succeed(RecipeDraft::new("Pie")));

        let outcome = extractor
            .extract("https://example.com/pie", &ExtractOptions::new(3), &noop_hook())
            .await
            .unwrap();

        assert!(matches!(outcome, ExtractOutcome::Complete(_)));
        let calls = extractor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://example.com/pie");
        assert_eq!(calls[0].max_retries, 3);
    }

    #[tokio::test]
    async fn mock_extractor_fires_retry_hook_between_failed_attempts() {
        let extractor = MockExtractor::new().with_attempts(
            "https://example.com/flaky",
            vec![
                MockAttempt::Fail(ImportError::retry("timeout")),
                MockAttempt::Fail(ImportError::retry("timeout")),
                MockAttempt::Succeed(RecipeDraft::new("Pie")),
            ],
        );

        let seen = RwLock::new(Vec::new());
        let hook = |attempt: u32, error: &ImportError| {
            seen.write().unwrap().push((attempt, error.code));
        };

        let outcome = extractor
            .extract("https://example.com/flaky", &ExtractOptions::new(3), &hook)
            .await
            .unwrap();

        assert!(matches!(outcome, ExtractOutcome::Complete(_)));
        assert_eq!(
            *seen.read().unwrap(),
            vec![(1, ErrorCode::Retry), (2, ErrorCode::Retry)]
        );
    }

    #[tokio::test]
    async fn mock_extractor_exhausts_budget_without_final_hook_call() {
        let extractor = MockExtractor::new().with_outcome(
            "https://example.com/down",
            MockAttempt::Fail(ImportError::retry("always down")),
        );

        let seen = RwLock::new(0u32);
        let hook = |_: u32, _: &ImportError| {
            *seen.write().unwrap() += 1;
        };

        let outcome = extractor
            .extract("https://example.com/down", &ExtractOptions::new(3), &hook)
            .await
            .unwrap();

        assert!(matches!(outcome, ExtractOutcome::Failed(_)));
        // Two retries inside a budget of three; the final failure returns.
        assert_eq!(*seen.read().unwrap(), 2);
    }

    #[tokio::test]
    async fn unscripted_url_fails_classified() {
        let extractor = MockExtractor::new();
        let outcome = extractor
            .extract("https://example.com/none", &ExtractOptions::new(1), &noop_hook())
            .await
            .unwrap();
        match outcome {
            ExtractOutcome::Failed(error) => assert_eq!(error.code, ErrorCode::ImportFailed),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_store_records_and_can_fail() {
        let store = MockRecipeStore::new();
        let owner = Uuid::new_v4();

        store.insert(RecipeDraft::new("Pie"), owner).await.unwrap();
        store.invalidate(owner).await;
        assert_eq!(store.inserted().len(), 1);
        assert_eq!(store.invalidations(), vec![owner]);

        store.set_failing(true);
        assert!(store.insert(RecipeDraft::new("Cake"), owner).await.is_err());
        assert_eq!(store.inserted().len(), 1);
    }
}
