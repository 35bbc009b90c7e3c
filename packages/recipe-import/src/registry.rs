//! In-memory job registry.
//!
//! Jobs live for the process lifetime only. The registry is the single
//! writer-coordination point for job state: all mutation happens inside
//! `update` under the write lock, so observers always see a consistent
//! snapshot of any one job.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use indexmap::IndexMap;

use crate::types::job::{ImportJob, JobId};

/// Registry of all import jobs created by one orchestrator.
///
/// Insertion order is preserved, so listing returns jobs in creation
/// order. Reads hand out clones; callers never hold a reference into the
/// map.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<IndexMap<JobId, ImportJob>>,
    next_seq: AtomicU64,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job for `source_url` in its initial validating state
    /// and return its id.
    pub fn create(&self, source_url: impl Into<String>) -> JobId {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let id = JobId::new(seq, now);
        let job = ImportJob::new(id.clone(), source_url, now);
        self.jobs.write().unwrap().insert(id.clone(), job);
        id
    }

    /// Snapshot of a single job, or `None` for ids this registry never
    /// issued.
    pub fn get(&self, id: &JobId) -> Option<ImportJob> {
        self.jobs.read().unwrap().get(id).cloned()
    }

    /// Mutate a job in place under the write lock. Returns `false` when
    /// the id is unknown, in which case `apply` never ran.
    pub fn update(&self, id: &JobId, apply: impl FnOnce(&mut ImportJob)) -> bool {
        match self.jobs.write().unwrap().get_mut(id) {
            Some(job) => {
                apply(job);
                true
            }
            None => false,
        }
    }

    /// Drop every job in a terminal state, keeping in-flight and
    /// needs-review jobs untouched. Returns how many were removed.
    pub fn clear_terminal(&self) -> usize {
        let mut jobs = self.jobs.write().unwrap();
        let before = jobs.len();
        jobs.retain(|_, job| !job.is_terminal());
        before - jobs.len()
    }

    /// Snapshot of all jobs in creation order.
    pub fn jobs(&self) -> Vec<ImportJob> {
        self.jobs.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use crate::types::job::ImportStatus;
    use crate::types::recipe::{Recipe, RecipeDraft};
    use uuid::Uuid;

    #[test]
    fn create_then_get_returns_validating_job() {
        let registry = JobRegistry::new();
        let id = registry.create("https://example.com/pie");

        let job = registry.get(&id).unwrap();
        assert_eq!(job.status, ImportStatus::Validating);
        assert_eq!(job.source_url, "https://example.com/pie");
    }

    #[test]
    fn get_unknown_id_is_none() {
        let registry = JobRegistry::new();
        registry.create("https://example.com/a");

        let other = JobRegistry::new();
        let foreign = other.create("https://example.com/b");
        assert!(registry.get(&foreign).is_none());
    }

    #[test]
    fn update_applies_under_lock_and_reports_unknown() {
        let registry = JobRegistry::new();
        let id = registry.create("https://example.com/pie");

        assert!(registry.update(&id, |job| job.begin_fetching("Starting import")));
        assert_eq!(registry.get(&id).unwrap().status, ImportStatus::Fetching);

        let other = JobRegistry::new();
        let foreign = other.create("https://example.com/b");
        assert!(!registry.update(&foreign, |job| job.fail(ImportError::unknown("nope"))));
    }

    #[test]
    fn clear_terminal_keeps_in_flight_and_needs_review() {
        let registry = JobRegistry::new();
        let done = registry.create("https://example.com/done");
        let failed = registry.create("https://example.com/failed");
        let fetching = registry.create("https://example.com/fetching");

        registry.update(&done, |job| {
            job.complete(Recipe::from_draft(RecipeDraft::new("Pie"), Uuid::new_v4()))
        });
        registry.update(&failed, |job| job.fail(ImportError::unknown("boom")));
        registry.update(&fetching, |job| job.begin_fetching("Starting import"));

        assert_eq!(registry.clear_terminal(), 2);
        let remaining = registry.jobs();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, fetching);
    }

    #[test]
    fn jobs_lists_in_creation_order() {
        let registry = JobRegistry::new();
        let a = registry.create("https://example.com/a");
        let b = registry.create("https://example.com/b");
        let c = registry.create("https://example.com/c");

        let ids: Vec<_> = registry.jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}
