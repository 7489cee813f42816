use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw record as stored under a push key. Decoded lazily so one malformed
/// entry cannot spoil a whole snapshot.
pub type MessageRecord = serde_json::Value;

/// Full copy of the collection. `None` when the collection is absent.
pub type Snapshot = Option<BTreeMap<String, MessageRecord>>;

/// Write payload. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub user: String,
    pub text: String,
    pub timestamp: String,
}

impl NewMessage {
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self::at(user, text, Utc::now())
    }

    pub fn at(user: impl Into<String>, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            timestamp: format_timestamp(at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: String,
    pub text: String,
    pub timestamp: String,
}

impl Message {
    pub fn from_record(id: impl Into<String>, record: NewMessage) -> Self {
        Self {
            id: id.into(),
            user: record.user,
            text: record.text,
            timestamp: record.timestamp,
        }
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_from(&self, nickname: &str) -> bool {
        self.user == nickname
    }
}

/// `2024-01-01T00:00:02.000Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
