mod message;

pub use message::{format_timestamp, Message, MessageRecord, NewMessage, Snapshot};
