mod event_stream;
mod firebase;
mod memory;
mod tree;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::{ChatterError, ChatterResult};
use crate::models::{NewMessage, Snapshot};

pub use event_stream::{EventStreamParser, ServerEvent};
pub use firebase::FirebaseBackend;
pub use memory::MemoryBackend;
pub use tree::{apply_patch, apply_put, snapshot_from_value, TreeEvent};

/// What a live subscription reports.
#[derive(Debug)]
pub enum BackendEvent {
    Snapshot(Snapshot),
    Error(ChatterError),
}

/// Keyed collection store with push fan-out.
///
/// `subscribe` must be called from within a tokio runtime; the returned
/// [`Subscription`] owns the task feeding `sink`.
#[async_trait]
pub trait RealtimeBackend: Send + Sync {
    fn name(&self) -> &str;

    fn subscribe(&self, path: &str, sink: UnboundedSender<BackendEvent>) -> Subscription;

    /// Append under a generated key and return that key.
    async fn push(&self, path: &str, message: &NewMessage) -> ChatterResult<String>;

    /// Delete the whole collection.
    async fn remove(&self, path: &str) -> ChatterResult<()>;
}

/// Handle to a running subscription. Dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    path: String,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(path: impl Into<String>, handle: JoinHandle<()>) -> Self {
        Self {
            path: path.into(),
            handle: Some(handle),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(path = %self.path, "Subscription cancelled");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
