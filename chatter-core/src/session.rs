use crate::error::{ChatterError, ChatterResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unjoined,
    Joined,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unjoined => write!(f, "unjoined"),
            SessionState::Joined => write!(f, "joined"),
        }
    }
}

/// Who the local user is. Lives only as long as the process; an empty
/// nickname means nobody has joined yet.
#[derive(Debug, Clone, Default)]
pub struct Session {
    nickname: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.nickname.is_empty() {
            SessionState::Unjoined
        } else {
            SessionState::Joined
        }
    }

    pub fn is_joined(&self) -> bool {
        self.state() == SessionState::Joined
    }

    /// The active nickname, empty while unjoined.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn join(&mut self, raw: &str) -> ChatterResult<()> {
        let nickname = raw.trim();
        if nickname.is_empty() {
            return Err(ChatterError::InvalidNickname);
        }
        self.nickname = nickname.to_string();
        tracing::info!(nickname = %self.nickname, "Joined chat");
        Ok(())
    }

    pub fn switch_user(&mut self) {
        if self.is_joined() {
            tracing::info!(nickname = %self.nickname, "Left chat");
        }
        self.nickname.clear();
    }
}
