mod chat;
mod join;

pub use chat::{message_lines, ChatScreen};
pub use join::JoinScreen;
