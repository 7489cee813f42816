//! Keeps the local message list in step with the backend collection.
//!
//! The synchronizer is the only owner of the list. Backend snapshots and
//! write outcomes arrive on channels and are applied when the owner calls
//! [`MessageSynchronizer::poll`] (or awaits [`MessageSynchronizer::next_notice`]),
//! so no locking is involved. Every snapshot replaces the list wholesale.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::backend::{BackendEvent, RealtimeBackend, Subscription};
use crate::error::{ChatterError, ChatterResult};
use crate::models::{Message, NewMessage, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Send,
    Clear,
}

impl WriteKind {
    /// Text shown to the user when this write fails.
    pub fn failure_notice(&self) -> &'static str {
        match self {
            WriteKind::Send => "Failed to send message. Please try again.",
            WriteKind::Clear => "Failed to clear messages. Please try again.",
        }
    }
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteKind::Send => write!(f, "send"),
            WriteKind::Clear => write!(f, "clear"),
        }
    }
}

#[derive(Debug)]
pub enum SyncNotice {
    /// The list was replaced; carries the new length
    MessagesUpdated(usize),
    ConnectivityChanged(bool),
    WriteFailed { kind: WriteKind, error: ChatterError },
}

struct WriteOutcome {
    kind: WriteKind,
    error: ChatterError,
}

enum Incoming {
    Backend(Option<BackendEvent>),
    Write(Option<WriteOutcome>),
}

/// Ordered list derived from one snapshot: ascending by parsed timestamp,
/// key order among equals. Records that don't decode are skipped.
pub fn messages_from_snapshot(snapshot: Snapshot) -> Vec<Message> {
    let Some(records) = snapshot else {
        return Vec::new();
    };

    let mut messages: Vec<Message> = records
        .into_iter()
        .filter_map(|(key, record)| match serde_json::from_value::<NewMessage>(record) {
            Ok(record) => Some(Message::from_record(key, record)),
            Err(e) => {
                warn!(key = %key, "Skipping malformed message record: {}", e);
                None
            }
        })
        .collect();

    // stable: unparseable timestamps (None) go first, ties keep key order
    messages.sort_by_key(|message| message.parsed_timestamp());
    messages
}

pub struct MessageSynchronizer {
    backend: Arc<dyn RealtimeBackend>,
    path: String,
    messages: Vec<Message>,
    connected: bool,
    subscription: Option<Subscription>,
    events: Option<UnboundedReceiver<BackendEvent>>,
    writes_tx: UnboundedSender<WriteOutcome>,
    writes_rx: UnboundedReceiver<WriteOutcome>,
    pending: VecDeque<SyncNotice>,
}

impl MessageSynchronizer {
    pub fn new(backend: Arc<dyn RealtimeBackend>, path: impl Into<String>) -> Self {
        let (writes_tx, writes_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            path: path.into().trim_matches('/').to_string(),
            messages: Vec::new(),
            connected: true,
            subscription: None,
            events: None,
            writes_tx,
            writes_rx,
            pending: VecDeque::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Start the live subscription. Calling it twice is a no-op.
    pub fn activate(&mut self) {
        if self.is_active() {
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscription = Some(self.backend.subscribe(&self.path, tx));
        self.events = Some(rx);
        info!(
            backend = self.backend.name(),
            path = %self.path,
            "Message subscription started"
        );
    }

    /// Cancel the subscription. Queued snapshot and connectivity notices are
    /// discarded. Write failures are not tied to the subscription and keep
    /// arriving, including those of writes still in flight.
    pub fn deactivate(&mut self) {
        let Some(mut subscription) = self.subscription.take() else {
            return;
        };
        subscription.cancel();
        self.events = None;
        self.pending
            .retain(|notice| matches!(notice, SyncNotice::WriteFailed { .. }));
        info!(path = %self.path, "Message subscription stopped");
    }

    /// Apply everything received so far without waiting. While inactive only
    /// write failures are reported.
    pub fn poll(&mut self) -> Vec<SyncNotice> {
        loop {
            let Some(events) = self.events.as_mut() else {
                break;
            };
            match events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!(path = %self.path, "Subscription feed ended");
                    self.events = None;
                    break;
                }
            }
        }

        while let Ok(outcome) = self.writes_rx.try_recv() {
            self.apply_write_failure(outcome);
        }

        self.pending.drain(..).collect()
    }

    /// Wait for the next notice. Returns `None` when the subscription feed
    /// has ended, or once inactive with no write failure waiting.
    pub async fn next_notice(&mut self) -> Option<SyncNotice> {
        loop {
            if let Some(notice) = self.pending.pop_front() {
                return Some(notice);
            }
            if !self.is_active() {
                let outcome = self.writes_rx.try_recv().ok()?;
                return Some(SyncNotice::WriteFailed {
                    kind: outcome.kind,
                    error: outcome.error,
                });
            }
            let events = self.events.as_mut()?;

            let incoming = tokio::select! {
                event = events.recv() => Incoming::Backend(event),
                outcome = self.writes_rx.recv() => Incoming::Write(outcome),
            };

            match incoming {
                Incoming::Backend(Some(event)) => self.apply(event),
                Incoming::Backend(None) => {
                    self.events = None;
                    return None;
                }
                Incoming::Write(Some(outcome)) => self.apply_write_failure(outcome),
                Incoming::Write(None) => return None,
            }
        }
    }

    fn apply(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Snapshot(snapshot) => {
                self.messages = messages_from_snapshot(snapshot);
                if !self.connected {
                    self.connected = true;
                    info!(path = %self.path, "Connectivity restored");
                    self.pending.push_back(SyncNotice::ConnectivityChanged(true));
                }
                debug!(count = self.messages.len(), "Message list replaced");
                self.pending
                    .push_back(SyncNotice::MessagesUpdated(self.messages.len()));
            }
            BackendEvent::Error(error) => {
                error.log();
                if self.connected {
                    self.connected = false;
                    warn!(path = %self.path, "Connectivity lost, keeping last known messages");
                    self.pending.push_back(SyncNotice::ConnectivityChanged(false));
                }
            }
        }
    }

    fn apply_write_failure(&mut self, outcome: WriteOutcome) {
        self.pending.push_back(SyncNotice::WriteFailed {
            kind: outcome.kind,
            error: outcome.error,
        });
    }

    /// Submit a message. Refused up front when the text is blank or the
    /// subscription is offline; otherwise the write runs in the background and
    /// a failure comes back as [`SyncNotice::WriteFailed`].
    pub fn send(&self, text: &str, nickname: &str) -> ChatterResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatterError::EmptyMessage);
        }
        if nickname.trim().is_empty() {
            return Err(ChatterError::InvalidNickname);
        }
        if !self.connected {
            warn!("Refusing to send while offline");
            return Err(ChatterError::Offline);
        }

        let message = NewMessage::new(nickname, text);
        let backend = Arc::clone(&self.backend);
        let path = self.path.clone();
        let failures = self.writes_tx.clone();

        tokio::spawn(async move {
            match backend.push(&path, &message).await {
                Ok(key) => debug!(key = %key, "Message sent"),
                Err(error) => {
                    error.log();
                    let _ = failures.send(WriteOutcome {
                        kind: WriteKind::Send,
                        error,
                    });
                }
            }
        });
        Ok(())
    }

    /// Delete the whole collection. Only call after the user confirmed.
    pub fn clear(&self) {
        let backend = Arc::clone(&self.backend);
        let path = self.path.clone();
        let failures = self.writes_tx.clone();

        info!(path = %path, "Clearing all messages");
        tokio::spawn(async move {
            if let Err(error) = backend.remove(&path).await {
                error.log();
                let _ = failures.send(WriteOutcome {
                    kind: WriteKind::Clear,
                    error,
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn snapshot(entries: serde_json::Value) -> Snapshot {
        let map: BTreeMap<String, serde_json::Value> = serde_json::from_value(entries).unwrap();
        Some(map)
    }

    #[test]
    fn test_absent_or_empty_snapshot() {
        assert!(messages_from_snapshot(None).is_empty());
        assert!(messages_from_snapshot(Some(BTreeMap::new())).is_empty());
    }

    #[test]
    fn test_sorted_by_timestamp() {
        let messages = messages_from_snapshot(snapshot(json!({
            "a": {"user": "bob", "text": "hi", "timestamp": "2024-01-01T00:00:02Z"},
            "b": {"user": "ann", "text": "yo", "timestamp": "2024-01-01T00:00:01Z"}
        })));

        let order: Vec<_> = messages
            .iter()
            .map(|m| (m.user.as_str(), m.text.as_str()))
            .collect();
        assert_eq!(order, vec![("ann", "yo"), ("bob", "hi")]);
        assert_eq!(messages[0].id, "b");
        assert_eq!(messages[1].id, "a");
    }

    #[test]
    fn test_equal_timestamps_keep_key_order() {
        let messages = messages_from_snapshot(snapshot(json!({
            "k2": {"user": "b", "text": "2", "timestamp": "2024-01-01T00:00:00.000Z"},
            "k1": {"user": "a", "text": "1", "timestamp": "2024-01-01T00:00:00.000Z"},
            "k3": {"user": "c", "text": "3", "timestamp": "2024-01-01T00:00:00.000Z"}
        })));

        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn test_mixed_offsets_compare_as_instants() {
        let messages = messages_from_snapshot(snapshot(json!({
            "a": {"user": "x", "text": "later", "timestamp": "2024-01-01T01:30:00+02:00"},
            "b": {"user": "y", "text": "earlier", "timestamp": "2023-12-31T23:00:00Z"}
        })));

        assert_eq!(messages[0].text, "earlier");
    }

    #[test]
    fn test_unparseable_timestamps_first() {
        let messages = messages_from_snapshot(snapshot(json!({
            "a": {"user": "x", "text": "ok", "timestamp": "2024-01-01T00:00:00Z"},
            "b": {"user": "y", "text": "bad", "timestamp": "whenever"}
        })));

        assert_eq!(messages[0].text, "bad");
        assert_eq!(messages[1].text, "ok");
    }

    #[test]
    fn test_malformed_records_skipped() {
        let messages = messages_from_snapshot(snapshot(json!({
            "a": {"user": "x", "text": "ok", "timestamp": "2024-01-01T00:00:00Z"},
            "b": {"user": "y"},
            "c": "just a string",
            "d": {"user": 5, "text": "wrong type", "timestamp": "2024-01-01T00:00:00Z"}
        })));

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "a");
    }

    #[test]
    fn test_write_kind_notices() {
        assert_eq!(
            WriteKind::Send.failure_notice(),
            "Failed to send message. Please try again."
        );
        assert_eq!(
            WriteKind::Clear.failure_notice(),
            "Failed to clear messages. Please try again."
        );
        assert_eq!(WriteKind::Clear.to_string(), "clear");
    }
}
