//! Fire-and-forget import event broadcasting.
//!
//! Built on `tokio::sync::broadcast`: emitting never blocks and never
//! fails, subscribers that fall behind lose the oldest events, and an
//! event emitted with no subscribers is simply dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::ImportError;
use crate::types::job::{ImportStatus, JobId};
use crate::types::recipe::Recipe;

const DEFAULT_CAPACITY: usize = 256;

/// Events observers can react to without polling the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportEvent {
    /// A non-terminal status change or retry progress line.
    Progress {
        job_id: JobId,
        source_url: String,
        status: ImportStatus,
        message: String,
    },

    /// The import finished and the recipe is persisted. Emitted after the
    /// owner's collection cache has been invalidated.
    Complete {
        job_id: JobId,
        source_url: String,
        recipe: Recipe,
    },

    /// The import failed terminally.
    Error {
        job_id: JobId,
        source_url: String,
        error: ImportError,
    },
}

impl ImportEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            ImportEvent::Progress { job_id, .. } => job_id,
            ImportEvent::Complete { job_id, .. } => job_id,
            ImportEvent::Error { job_id, .. } => job_id,
        }
    }
}

/// Cloneable broadcast handle for import events.
///
/// Clones share one channel; any clone may emit or subscribe.
#[derive(Debug, Clone)]
pub struct ImportEventBus {
    sender: broadcast::Sender<ImportEvent>,
}

impl ImportEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all current subscribers. Returns how many
    /// subscribers received it; zero subscribers is not an error.
    pub fn emit(&self, event: ImportEvent) -> usize {
        debug!(job_id = %event.job_id(), "emitting import event");
        self.sender.send(event).unwrap_or(0)
    }

    /// New subscription receiving events emitted from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ImportEventBus {
    fn default() -> Self {
        Self::new()
    }
}
