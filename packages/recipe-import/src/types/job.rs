//! Import job model and its state machine payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Severity};
use crate::types::partial::PartialExtraction;
use crate::types::recipe::Recipe;

/// Opaque job identifier, unique for the process lifetime.
///
/// Formed from a monotonic sequence number plus the creation timestamp;
/// no global persistence is involved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub(crate) fn new(seq: u64, at: DateTime<Utc>) -> Self {
        Self(format!("import-{seq}-{}", at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of an import job.
///
/// `Complete` and `Error` are terminal; a finished or failed job is never
/// resumed in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Validating,
    Fetching,
    NeedsReview,
    Complete,
    Error,
}

impl ImportStatus {
    /// Whether no further automatic transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportStatus::Complete | ImportStatus::Error)
    }
}

/// One tracked attempt to import a single URL.
///
/// Exactly one of `{error, partial, result}` is meaningfully populated at
/// any time, consistent with `status`: `result` iff `Complete`, `partial`
/// iff `NeedsReview` (where `error` may also carry an explanation of the
/// missing fields), `error` alone iff `Error`. All transitions go through
/// the methods below so that consistency lives in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: JobId,

    /// The input URL, immutable after creation.
    pub source_url: String,

    pub status: ImportStatus,

    /// Latest human-readable status line; overwritten on every transition
    /// and on every retry attempt. Purely observational.
    pub progress_message: String,

    pub error: Option<ImportError>,

    pub partial: Option<PartialExtraction>,

    pub result: Option<Recipe>,

    pub started_at: DateTime<Utc>,
}

impl ImportJob {
    pub(crate) fn new(id: JobId, source_url: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            source_url: source_url.into(),
            status: ImportStatus::Validating,
            progress_message: "Validating import request".to_string(),
            error: None,
            partial: None,
            result: None,
            started_at,
        }
    }

    /// `Validating -> Fetching`, before any network call.
    pub fn begin_fetching(&mut self, message: impl Into<String>) {
        self.status = ImportStatus::Fetching;
        self.progress_message = message.into();
    }

    /// Overwrite the progress line without changing state. Used for retry
    /// attempts, which are sub-steps of `Fetching`, not separate states.
    pub fn set_progress(&mut self, message: impl Into<String>) {
        self.progress_message = message.into();
    }

    /// Terminal success: the recipe was persisted.
    pub fn complete(&mut self, recipe: Recipe) {
        self.status = ImportStatus::Complete;
        self.progress_message = "Import complete".to_string();
        self.result = Some(recipe);
        self.partial = None;
        self.error = None;
    }

    /// Extraction found some but not all required fields; a human must
    /// finish the import via review.
    pub fn needs_review(&mut self, partial: PartialExtraction) {
        let missing = partial.missing_fields.join(", ");
        self.progress_message = format!("Needs review: could not extract {missing}");
        self.error = Some(
            ImportError::import_failed(format!("Missing required fields: {missing}"))
                .with_suggestion("Fill in the missing fields and complete the review")
                .with_severity(Severity::Warning),
        );
        self.partial = Some(partial);
        self.result = None;
        self.status = ImportStatus::NeedsReview;
    }

    /// Terminal failure.
    pub fn fail(&mut self, error: ImportError) {
        self.progress_message = error.message.clone();
        self.error = Some(error);
        self.partial = None;
        self.result = None;
        self.status = ImportStatus::Error;
    }

    /// Whether this job reached `Complete` or `Error`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::recipe::RecipeDraft;
    use uuid::Uuid;

    fn sample_job() -> ImportJob {
        ImportJob::new(JobId::new(0, Utc::now()), "https://example.com/r", Utc::now())
    }

    #[test]
    fn new_job_starts_validating_with_nothing_populated() {
        let job = sample_job();
        assert_eq!(job.status, ImportStatus::Validating);
        assert!(job.error.is_none());
        assert!(job.partial.is_none());
        assert!(job.result.is_none());
        assert!(!job.is_terminal());
    }

    #[test]
    fn begin_fetching_sets_status_and_message() {
        let mut job = sample_job();
        job.begin_fetching("Starting import");
        assert_eq!(job.status, ImportStatus::Fetching);
        assert_eq!(job.progress_message, "Starting import");
    }

    #[test]
    fn complete_sets_result_and_clears_the_rest() {
        let mut job = sample_job();
        job.fail(ImportError::unknown("earlier"));
        job.complete(Recipe::from_draft(RecipeDraft::new("Pie"), Uuid::new_v4()));

        assert_eq!(job.status, ImportStatus::Complete);
        assert!(job.result.is_some());
        assert!(job.error.is_none());
        assert!(job.partial.is_none());
        assert!(job.is_terminal());
    }

    #[test]
    fn needs_review_keeps_partial_with_explanatory_error() {
        let mut job = sample_job();
        let partial = PartialExtraction::new("https://example.com/r")
            .with_title("Pie")
            .detect_missing();
        job.needs_review(partial);

        assert_eq!(job.status, ImportStatus::NeedsReview);
        assert!(job.partial.is_some());
        assert!(job.result.is_none());
        let error = job.error.unwrap();
        assert_eq!(error.code, ErrorCode::ImportFailed);
        assert!(error.message.contains("ingredients"));
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn fail_sets_error_and_clears_payloads() {
        let mut job = sample_job();
        job.fail(ImportError::save_failed("db down"));
        assert_eq!(job.status, ImportStatus::Error);
        assert!(job.error.is_some());
        assert!(job.partial.is_none());
        assert!(job.result.is_none());
        assert!(job.is_terminal());
    }

    #[test]
    fn job_ids_embed_sequence_and_timestamp() {
        let at = Utc::now();
        let a = JobId::new(1, at);
        let b = JobId::new(2, at);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("import-1-"));
    }
}
