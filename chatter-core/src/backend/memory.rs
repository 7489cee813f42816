use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::{BackendEvent, RealtimeBackend, Subscription};
use crate::error::{ChatterError, ChatterResult};
use crate::models::{MessageRecord, NewMessage, Snapshot};

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, BTreeMap<String, MessageRecord>>,
    next_key: u64,
}

impl MemoryState {
    fn snapshot(&self, path: &str) -> Snapshot {
        self.collections
            .get(path)
            .filter(|records| !records.is_empty())
            .cloned()
    }
}

/// In-process store with the same push/subscribe contract as the hosted
/// database. Clones share state, so several clients can talk to each other.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    changes: Arc<watch::Sender<u64>>,
    errors: broadcast::Sender<String>,
    fail_writes: Arc<AtomicBool>,
    write_delay_ms: Arc<AtomicU64>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        let (errors, _) = broadcast::channel(16);
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            changes: Arc::new(changes),
            errors,
            fail_writes: Arc::new(AtomicBool::new(false)),
            write_delay_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn lock(&self) -> ChatterResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ChatterError::Internal("memory backend lock poisoned".to_string()))
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    /// Make every following push and remove fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold every following push and remove for `delay` before it runs.
    pub fn delay_writes(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Deliver a connection error to every live subscriber.
    pub fn emit_error(&self, message: impl Into<String>) {
        let message = message.into();
        info!(message = %message, "Injecting subscription error");
        let _ = self.errors.send(message);
    }

    /// Re-deliver the current snapshot to every subscriber.
    pub fn reconnect(&self) {
        self.notify();
    }

    /// Store a raw record under a chosen key.
    pub fn insert_raw(&self, path: &str, key: &str, record: MessageRecord) -> ChatterResult<()> {
        self.lock()?
            .collections
            .entry(path.trim_matches('/').to_string())
            .or_default()
            .insert(key.to_string(), record);
        self.notify();
        Ok(())
    }

    pub fn snapshot(&self, path: &str) -> ChatterResult<Snapshot> {
        Ok(self.lock()?.snapshot(path.trim_matches('/')))
    }

    async fn check_writable(&self) -> ChatterResult<()> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChatterError::RequestFailed(
                "memory backend is rejecting writes".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RealtimeBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn subscribe(&self, path: &str, sink: UnboundedSender<BackendEvent>) -> Subscription {
        let path = path.trim_matches('/').to_string();
        let state = Arc::clone(&self.state);
        let mut changes = self.changes.subscribe();
        let mut errors = self.errors.subscribe();
        let task_path = path.clone();

        let handle = tokio::spawn(async move {
            loop {
                changes.borrow_and_update();
                let snapshot = {
                    let Ok(guard) = state.lock() else {
                        return;
                    };
                    guard.snapshot(&task_path)
                };
                debug!(path = %task_path, "Delivering snapshot");
                if sink.send(BackendEvent::Snapshot(snapshot)).is_err() {
                    return;
                }

                loop {
                    tokio::select! {
                        changed = changes.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            break;
                        }
                        injected = errors.recv() => match injected {
                            Ok(message) => {
                                let err = ChatterError::ConnectionFailed(message);
                                if sink.send(BackendEvent::Error(err)).is_err() {
                                    return;
                                }
                            }
                            Err(RecvError::Lagged(_)) => continue,
                            Err(RecvError::Closed) => return,
                        },
                    }
                }
            }
        });

        Subscription::new(path, handle)
    }

    async fn push(&self, path: &str, message: &NewMessage) -> ChatterResult<String> {
        self.check_writable().await?;
        let record = serde_json::to_value(message)?;

        let key = {
            let mut state = self.lock()?;
            state.next_key += 1;
            let key = format!("m{:012}", state.next_key);
            state
                .collections
                .entry(path.trim_matches('/').to_string())
                .or_default()
                .insert(key.clone(), record);
            key
        };

        debug!(key = %key, "Message stored");
        self.notify();
        Ok(key)
    }

    async fn remove(&self, path: &str) -> ChatterResult<()> {
        self.check_writable().await?;
        self.lock()?.collections.remove(path.trim_matches('/'));
        info!(path = %path, "Collection removed");
        self.notify();
        Ok(())
    }
}
