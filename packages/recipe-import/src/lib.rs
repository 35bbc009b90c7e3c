//! Job orchestration for importing recipes from external web pages.
//!
//! Importing a recipe means fetching an arbitrary page, extracting
//! structured fields from it, and persisting the result, any step of
//! which can fail or come back incomplete. This crate wraps that
//! pipeline in tracked jobs: callers start an import and get a job id
//! back immediately, then follow the job through
//! `validating -> fetching -> {complete | needs_review | error}` via the
//! registry or the broadcast event bus. Partially extracted recipes park
//! in `needs_review` until a human fills the gaps and completes the
//! import through review.
//!
//! ```no_run
//! use recipe_import::{
//!     HttpRecipeExtractor, ImportOrchestrator, MemoryRecipeStore, Session,
//! };
//! use uuid::Uuid;
//!
//! # async fn demo() {
//! let orchestrator =
//!     ImportOrchestrator::new(HttpRecipeExtractor::new(), MemoryRecipeStore::new())
//!         .with_session(Session::new(Uuid::new_v4(), Uuid::new_v4()));
//!
//! let mut events = orchestrator.subscribe();
//! let job_id = orchestrator
//!     .import_recipe("https://example.com/best-apple-pie")
//!     .unwrap();
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # let _ = job_id;
//! # }
//! ```

pub mod error;
pub mod events;
pub mod extractors;
pub mod orchestrator;
pub mod registry;
pub mod scenarios;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{ErrorCode, ImportError, RequestError, Severity, StoreError};
pub use events::{ImportEvent, ImportEventBus};
pub use extractors::http::HttpRecipeExtractor;
pub use orchestrator::{ImportConfig, ImportOrchestrator};
pub use registry::JobRegistry;
pub use scenarios::{ScenarioRouter, ScriptedOutcome};
pub use stores::memory::MemoryRecipeStore;
pub use traits::extractor::{ExtractOptions, ExtractOutcome, RecipeExtractor, RetryHook};
pub use traits::store::RecipeStore;
pub use types::job::{ImportJob, ImportStatus, JobId};
pub use types::partial::{PartialExtraction, REQUIRED_FIELDS};
pub use types::recipe::{Recipe, RecipeDraft, RecipeTimes};
pub use types::session::Session;
