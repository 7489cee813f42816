//! View-model for the message list.
//!
//! Pure functions of the ordered list and the active nickname. The terminal
//! front end only decides layout and colors.

use chrono::{DateTime, Local, TimeZone};

use crate::models::Message;

pub const INVALID_TIME: &str = "Invalid Date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Own,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: String,
    pub ownership: Ownership,
    /// Only set for other people's messages
    pub author: Option<String>,
    pub text: String,
    pub time: String,
}

impl RenderedMessage {
    pub fn is_own(&self) -> bool {
        self.ownership == Ownership::Own
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatView {
    Empty,
    Messages(Vec<RenderedMessage>),
}

impl ChatView {
    pub fn len(&self) -> usize {
        match self {
            ChatView::Empty => 0,
            ChatView::Messages(messages) => messages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn ownership(message: &Message, nickname: &str) -> Ownership {
    if message.is_from(nickname) {
        Ownership::Own
    } else {
        Ownership::Other
    }
}

pub fn render_messages(messages: &[Message], nickname: &str) -> ChatView {
    render_messages_in(messages, nickname, &Local)
}

pub fn render_messages_in<Tz: TimeZone>(messages: &[Message], nickname: &str, tz: &Tz) -> ChatView
where
    Tz::Offset: std::fmt::Display,
{
    if messages.is_empty() {
        return ChatView::Empty;
    }

    ChatView::Messages(
        messages
            .iter()
            .map(|message| {
                let ownership = ownership(message, nickname);
                RenderedMessage {
                    id: message.id.clone(),
                    ownership,
                    author: match ownership {
                        Ownership::Own => None,
                        Ownership::Other => Some(message.user.clone()),
                    },
                    text: message.text.clone(),
                    time: format_time_in(&message.timestamp, tz),
                }
            })
            .collect(),
    )
}

/// Local wall-clock time, e.g. `02:05 PM`.
pub fn format_time(timestamp: &str) -> String {
    format_time_in(timestamp, &Local)
}

pub fn format_time_in<Tz: TimeZone>(timestamp: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.with_timezone(tz).format("%I:%M %p").to_string(),
        Err(_) => INVALID_TIME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn msg(id: &str, user: &str, text: &str, timestamp: &str) -> Message {
        Message {
            id: id.to_string(),
            user: user.to_string(),
            text: text.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_empty_list_renders_placeholder() {
        assert_eq!(render_messages(&[], "ann"), ChatView::Empty);
        assert!(ChatView::Empty.is_empty());
    }

    #[test]
    fn test_ownership_is_exact_match() {
        let messages = vec![
            msg("a", "ann", "hi", "2024-01-01T00:00:01.000Z"),
            msg("b", "Ann", "hey", "2024-01-01T00:00:02.000Z"),
            msg("c", "bob", "yo", "2024-01-01T00:00:03.000Z"),
        ];

        let ChatView::Messages(rendered) = render_messages_in(&messages, "ann", &Utc) else {
            panic!("expected messages");
        };

        assert_eq!(rendered.len(), 3);
        assert!(rendered[0].is_own());
        assert_eq!(rendered[0].author, None);
        assert_eq!(rendered[1].ownership, Ownership::Other);
        assert_eq!(rendered[1].author.as_deref(), Some("Ann"));
        assert_eq!(rendered[2].author.as_deref(), Some("bob"));
    }

    #[test]
    fn test_render_preserves_order_and_ids() {
        let messages = vec![
            msg("b", "ann", "yo", "2024-01-01T00:00:01Z"),
            msg("a", "bob", "hi", "2024-01-01T00:00:02Z"),
        ];

        let view = render_messages_in(&messages, "carl", &Utc);
        let ChatView::Messages(rendered) = view else {
            panic!("expected messages");
        };
        let ids: Vec<_> = rendered.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(rendered[0].text, "yo");
    }

    #[test]
    fn test_format_time_in_utc() {
        assert_eq!(format_time_in("2024-01-01T00:00:02.000Z", &Utc), "12:00 AM");
        assert_eq!(format_time_in("2024-01-01T14:05:00.000Z", &Utc), "02:05 PM");
        assert_eq!(format_time_in("2024-01-01T09:30:00Z", &Utc), "09:30 AM");
    }

    #[test]
    fn test_format_time_in_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(format_time_in("2024-01-01T14:05:00.000Z", &tz), "09:05 AM");
    }

    #[test]
    fn test_invalid_timestamp() {
        assert_eq!(format_time_in("not a date", &Utc), INVALID_TIME);
        assert_eq!(format_time(""), INVALID_TIME);
    }
}
