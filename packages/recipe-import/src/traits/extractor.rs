//! Extraction service boundary.
//!
//! Implementations fetch a page and turn it into a structured recipe:
//! - `HttpRecipeExtractor` - real fetch + schema.org JSON-LD parsing
//! - `MockExtractor` - scripted attempt sequences for tests
//!
//! An extractor owns its internal retry loop: transient failures are
//! re-attempted up to the caller-supplied budget, with `on_retry` invoked
//! before each re-attempt. Retries are invisible to the job state machine
//! except through the hook.

use async_trait::async_trait;

use crate::error::ImportError;
use crate::types::partial::PartialExtraction;
use crate::types::recipe::RecipeDraft;

/// Options for a single extraction call.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Total attempt budget (a fixed attempt count, not extra retries).
    pub max_retries: u32,
}

impl ExtractOptions {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

/// Hook invoked with the failed attempt number and its error before the
/// extractor re-attempts. Never invoked after the final failure.
pub type RetryHook<'a> = &'a (dyn Fn(u32, &ImportError) + Send + Sync);

/// Resolution of an extraction call.
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    /// Every required field was extracted.
    Complete(RecipeDraft),

    /// Some required fields are missing; a human must complete the import.
    Partial(PartialExtraction),

    /// The page could not be turned into a recipe.
    Failed(ImportError),
}

/// Extraction service: fetch + parse + field extraction for one URL.
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    /// Extract a recipe from the page at `url`.
    ///
    /// The returned `Err` is reserved for failures escaping the extraction
    /// machinery itself; expected outcomes (including classified failures)
    /// arrive as [`ExtractOutcome`]. Callers treat both the same way.
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
        on_retry: RetryHook<'_>,
    ) -> Result<ExtractOutcome, ImportError>;

    /// Extractor name, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
