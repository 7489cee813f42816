pub mod backend;
pub mod composer;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod sync;

pub use backend::{BackendEvent, FirebaseBackend, MemoryBackend, RealtimeBackend, Subscription};
pub use composer::Composer;
pub use config::{
    ensure_data_dir, get_config_dir, get_data_dir, BackendKind, ChatConfig, ChatterConfig,
    FirebaseConfig, LoggingConfig, NetworkConfig, TuiConfig,
};
pub use error::{ChatterError, ChatterResult, RetryConfig};
pub use models::{Message, MessageRecord, NewMessage, Snapshot};
pub use render::{format_time, render_messages, ChatView, Ownership, RenderedMessage};
pub use session::{Session, SessionState};
pub use sync::{messages_from_snapshot, MessageSynchronizer, SyncNotice, WriteKind};

use std::sync::Arc;

/// Build the backend selected in `config`.
pub fn create_backend(config: &ChatterConfig) -> ChatterResult<Arc<dyn RealtimeBackend>> {
    match config.chat.backend {
        BackendKind::Firebase => Ok(Arc::new(FirebaseBackend::new(config)?)),
        BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
    }
}
