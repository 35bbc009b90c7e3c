//! Import orchestrator: owns the job registry, the event bus, and the
//! lifecycle of every import.
//!
//! An import runs as a background task; callers get the job id back
//! immediately and observe progress through the registry or the event
//! bus. The orchestrator is a cheap clone-handle around shared state, so
//! it can be stored in request contexts and moved into spawned tasks.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ImportError, RequestError};
use crate::events::{ImportEvent, ImportEventBus};
use crate::registry::JobRegistry;
use crate::scenarios::ScenarioRouter;
use crate::traits::extractor::{ExtractOptions, ExtractOutcome, RecipeExtractor};
use crate::traits::store::RecipeStore;
use crate::types::job::{ImportJob, ImportStatus, JobId};
use crate::types::recipe::{Recipe, RecipeDraft};
use crate::types::session::Session;

/// Tunables for an orchestrator instance.
#[derive(Debug, Clone, Copy)]
pub struct ImportConfig {
    /// Total extraction attempt budget per import.
    pub max_retries: u32,

    /// When set, URLs registered with the scenario router resolve to
    /// their scripted outcome instead of hitting the extractor. Off in
    /// production.
    pub scenario_mode: bool,

    /// Event bus channel capacity.
    pub event_capacity: usize,
}

impl ImportConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_scenario_mode(mut self, scenario_mode: bool) -> Self {
        self.scenario_mode = scenario_mode;
        self
    }

    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            scenario_mode: false,
            event_capacity: 256,
        }
    }
}

struct Inner<E, S> {
    extractor: E,
    store: S,
    registry: JobRegistry,
    events: ImportEventBus,
    scenarios: ScenarioRouter,
    config: ImportConfig,
    session: RwLock<Option<Session>>,
}

/// Clone-handle over the shared import machinery.
pub struct ImportOrchestrator<E, S> {
    inner: Arc<Inner<E, S>>,
}

impl<E, S> Clone for ImportOrchestrator<E, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, S> ImportOrchestrator<E, S>
where
    E: RecipeExtractor + 'static,
    S: RecipeStore + 'static,
{
    pub fn new(extractor: E, store: S) -> Self {
        Self::with_config(extractor, store, ImportConfig::default())
    }

    pub fn with_config(extractor: E, store: S, config: ImportConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                extractor,
                store,
                registry: JobRegistry::new(),
                events: ImportEventBus::with_capacity(config.event_capacity),
                scenarios: ScenarioRouter::new(),
                config,
                session: RwLock::new(None),
            }),
        }
    }

    /// Attach the acting session. Imports without one are rejected.
    pub fn with_session(self, session: Session) -> Self {
        self.set_session(session);
        self
    }

    /// Replace the acting session on a live handle; shared by all clones.
    pub fn set_session(&self, session: Session) {
        *self.inner.session.write().unwrap() = Some(session);
    }

    fn session(&self) -> Option<Session> {
        *self.inner.session.read().unwrap()
    }

    /// Start an import for `url`.
    ///
    /// Validates the caller synchronously, registers the job, and spawns
    /// the fetch/persist work in the background. The returned job is
    /// already in its fetching phase by the time this resolves; rejected
    /// requests create no job at all.
    pub fn import_recipe(&self, url: impl Into<String>) -> Result<JobId, RequestError> {
        let session = self.session().ok_or(RequestError::MissingIdentity)?;
        let owner = session.account_id.ok_or(RequestError::MissingAccount)?;

        let url = url.into();
        let job_id = self.inner.registry.create(url.clone());
        info!(job_id = %job_id, %url, "import job created");

        self.inner
            .registry
            .update(&job_id, |job| job.begin_fetching("Starting import"));
        self.emit_progress(&job_id, &url, ImportStatus::Fetching, "Starting import");

        let orchestrator = self.clone();
        let spawn_id = job_id.clone();
        tokio::spawn(async move {
            orchestrator.run_import(spawn_id, url, owner).await;
        });

        Ok(job_id)
    }

    /// Complete a job awaiting review with a human-finished draft.
    ///
    /// Only jobs in `NeedsReview` accept a review; anything else is
    /// rejected without state changes, so a review can never race the
    /// in-flight background task or move a terminal job backward. On
    /// success the job transitions to `Complete` exactly as an automatic
    /// import would, including cache invalidation before the completion
    /// event. On a save failure the job fails and the error is returned
    /// so the caller can surface it.
    pub async fn complete_review(
        &self,
        job_id: &JobId,
        draft: RecipeDraft,
    ) -> Result<Recipe, ImportError> {
        let job = self
            .inner
            .registry
            .get(job_id)
            .ok_or_else(|| ImportError::unknown(format!("no import job {job_id}")))?;

        if job.status != ImportStatus::NeedsReview {
            return Err(ImportError::import_failed(format!(
                "job {job_id} is not awaiting review"
            )));
        }

        let owner = self
            .session()
            .and_then(|s| s.account_id)
            .ok_or_else(|| ImportError::unknown("no owning account for review"))?;

        info!(job_id = %job_id, "completing import via review");
        self.persist(job_id, &job.source_url, draft, owner).await
    }

    /// Snapshot of a job, or `None` for ids this orchestrator never
    /// issued.
    pub fn get_import_status(&self, job_id: &JobId) -> Option<ImportJob> {
        self.inner.registry.get(job_id)
    }

    /// Drop all jobs that reached `Complete` or `Error`. In-flight and
    /// needs-review jobs stay. Returns how many were removed.
    pub fn clear_completed_imports(&self) -> usize {
        let removed = self.inner.registry.clear_terminal();
        info!(removed, "cleared terminal import jobs");
        removed
    }

    /// All jobs in creation order.
    pub fn jobs(&self) -> Vec<ImportJob> {
        self.inner.registry.jobs()
    }

    /// Subscribe to import events emitted from this point on.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ImportEvent> {
        self.inner.events.subscribe()
    }

    pub fn events(&self) -> &ImportEventBus {
        &self.inner.events
    }

    /// Scenario router for scripting URLs. Routes only take effect when
    /// [`ImportConfig::scenario_mode`] is set.
    pub fn scenarios(&self) -> &ScenarioRouter {
        &self.inner.scenarios
    }

    async fn run_import(&self, job_id: JobId, url: String, owner: Uuid) {
        match self.resolve_extraction(&job_id, &url).await {
            ExtractOutcome::Complete(draft) => {
                // Persist failure is already reflected on the job.
                let _ = self.persist(&job_id, &url, draft, owner).await;
            }
            ExtractOutcome::Partial(partial) => {
                info!(job_id = %job_id, missing = ?partial.missing_fields, "import needs review");
                self.inner
                    .registry
                    .update(&job_id, |job| job.needs_review(partial));
                if let Some(job) = self.inner.registry.get(&job_id) {
                    self.emit_progress(
                        &job_id,
                        &url,
                        ImportStatus::NeedsReview,
                        job.progress_message,
                    );
                }
            }
            ExtractOutcome::Failed(error) => {
                self.fail_job(&job_id, &url, error.into_terminal());
            }
        }
    }

    /// Resolve the extraction outcome for a URL, consulting the scenario
    /// router first when scenario mode is on.
    async fn resolve_extraction(&self, job_id: &JobId, url: &str) -> ExtractOutcome {
        if self.inner.config.scenario_mode {
            if let Some(scripted) = self.inner.scenarios.match_url(url) {
                info!(job_id = %job_id, %url, "substituting scripted outcome");
                return scripted.into();
            }
        }

        let options = ExtractOptions::new(self.inner.config.max_retries);
        let max = options.max_retries;
        let on_retry = |attempt: u32, error: &ImportError| {
            let message = format!("Attempt {attempt} of {max} failed, retrying");
            warn!(job_id = %job_id, attempt, error = %error, "extraction attempt failed");
            self.inner
                .registry
                .update(job_id, |job| job.set_progress(message.clone()));
            self.emit_progress(job_id, url, ImportStatus::Fetching, message);
        };

        match self.inner.extractor.extract(url, &options, &on_retry).await {
            Ok(outcome) => outcome,
            // Escaped extractor errors are treated like any classified
            // failure so the job never wedges in `Fetching`.
            Err(error) => ExtractOutcome::Failed(error.into_terminal()),
        }
    }

    /// Shared completion path for automatic imports and reviews: persist
    /// the draft, invalidate the owner's collection cache, and only then
    /// mark the job complete and announce it.
    async fn persist(
        &self,
        job_id: &JobId,
        url: &str,
        mut draft: RecipeDraft,
        owner: Uuid,
    ) -> Result<Recipe, ImportError> {
        if draft.source_url.is_none() {
            draft.source_url = Some(url.to_string());
        }

        match self.inner.store.insert(draft, owner).await {
            Ok(recipe) => {
                self.inner.store.invalidate(owner).await;
                self.inner
                    .registry
                    .update(job_id, |job| job.complete(recipe.clone()));
                info!(job_id = %job_id, recipe_id = %recipe.id, "import complete");
                self.inner.events.emit(ImportEvent::Complete {
                    job_id: job_id.clone(),
                    source_url: url.to_string(),
                    recipe: recipe.clone(),
                });
                Ok(recipe)
            }
            Err(store_error) => {
                let error = ImportError::save_failed(format!(
                    "failed to save recipe: {store_error}"
                ))
                .with_suggestion("Try the import again");
                self.fail_job(job_id, url, error.clone());
                Err(error)
            }
        }
    }

    fn fail_job(&self, job_id: &JobId, url: &str, error: ImportError) {
        warn!(job_id = %job_id, code = ?error.code, error = %error, "import failed");
        self.inner
            .registry
            .update(job_id, |job| job.fail(error.clone()));
        self.inner.events.emit(ImportEvent::Error {
            job_id: job_id.clone(),
            source_url: url.to_string(),
            error,
        });
    }

    fn emit_progress(
        &self,
        job_id: &JobId,
        url: &str,
        status: ImportStatus,
        message: impl Into<String>,
    ) {
        self.inner.events.emit(ImportEvent::Progress {
            job_id: job_id.clone(),
            source_url: url.to_string(),
            status,
            message: message.into(),
        });
    }
}
