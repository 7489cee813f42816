use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ChatterError, ChatterResult};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_NICKNAME_MAX_LEN: usize = 20;
pub const DEFAULT_MESSAGE_MAX_LEN: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatterConfig {
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

/// Connection credentials for the hosted database.
///
/// Field names follow the web console's config snippet so it can be pasted in
/// as-is. Values are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FirebaseConfig {
    #[serde(rename = "apiKey", alias = "apikey", default)]
    pub api_key: String,

    #[serde(rename = "authDomain", alias = "authdomain", default)]
    pub auth_domain: String,

    #[serde(rename = "databaseURL", alias = "databaseurl", default)]
    pub database_url: String,

    #[serde(rename = "projectId", alias = "projectid", default)]
    pub project_id: String,

    #[serde(rename = "storageBucket", alias = "storagebucket", default)]
    pub storage_bucket: String,

    #[serde(rename = "messagingSenderId", alias = "messagingsenderid", default)]
    pub messaging_sender_id: String,

    #[serde(rename = "appId", alias = "appid", default)]
    pub app_id: String,

    /// Database secret or ID token appended as `?auth=`
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Firebase,
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Firebase => write!(f, "firebase"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firebase" => Ok(BackendKind::Firebase),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!(
                "unknown backend '{}', expected 'firebase' or 'memory'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_collection_path")]
    pub collection_path: String,

    #[serde(default = "default_nickname_max_len")]
    pub nickname_max_len: usize,

    #[serde(default = "default_message_max_len")]
    pub message_max_len: usize,

    #[serde(default)]
    pub backend: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Reconnect attempts before the subscription gives up, 0 for unlimited
    #[serde(default)]
    pub reconnect_max_attempts: u32,

    /// Silence on the event stream after which it is treated as dead.
    /// The server sends keep-alives roughly every 30 seconds.
    #[serde(default = "default_stream_idle_timeout")]
    pub stream_idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,

    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default)]
    pub theme: Option<String>,
}

fn default_collection_path() -> String {
    "messages".to_string()
}

fn default_nickname_max_len() -> usize {
    DEFAULT_NICKNAME_MAX_LEN
}

fn default_message_max_len() -> usize {
    DEFAULT_MESSAGE_MAX_LEN
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_stream_idle_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "chatter_tui=info,chatter_core=info".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            collection_path: default_collection_path(),
            nickname_max_len: default_nickname_max_len(),
            message_max_len: default_message_max_len(),
            backend: BackendKind::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            reconnect_max_attempts: 0,
            stream_idle_timeout_secs: default_stream_idle_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: String::new(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            theme: None,
        }
    }
}

impl ChatterConfig {
    /// Load from the standard locations, then `explicit` if given.
    pub fn load(explicit: Option<&Path>) -> ChatterResult<Self> {
        Self::load_for_backend(explicit, None)
    }

    /// Like [`ChatterConfig::load`], with `backend` (when set) replacing the
    /// configured one before validation.
    pub fn load_for_backend(
        explicit: Option<&Path>,
        backend: Option<BackendKind>,
    ) -> ChatterResult<Self> {
        let mut paths = get_config_paths();
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ChatterError::MissingConfig(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            paths.push(path.to_path_buf());
        }

        let mut chatter_config = Self::read_sources(paths)?;
        if let Some(backend) = backend {
            chatter_config.chat.backend = backend;
        }
        chatter_config.validate()?;

        Ok(chatter_config)
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> ChatterResult<Self> {
        let chatter_config = Self::read_sources(paths)?;
        chatter_config.validate()?;
        Ok(chatter_config)
    }

    fn read_sources(paths: Vec<PathBuf>) -> ChatterResult<Self> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("CHATTER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut chatter_config: ChatterConfig = builder.build()?.try_deserialize()?;
        chatter_config.apply_env_overrides();

        Ok(chatter_config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FIREBASE_DATABASE_URL") {
            if !url.trim().is_empty() {
                self.firebase.database_url = url;
            }
        }

        if let Ok(level) = std::env::var("CHATTER_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> ChatterResult<()> {
        if self.chat.backend == BackendKind::Firebase {
            let url = self.firebase.database_url.trim();
            if url.is_empty() {
                return Err(ChatterError::MissingConfig(
                    "firebase.databaseURL".to_string(),
                ));
            }
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ChatterError::InvalidConfigValue {
                    key: "firebase.databaseURL".to_string(),
                    message: "Must start with https:// or http://".to_string(),
                });
            }
        }

        let path = self.chat.collection_path.trim_matches('/');
        if path.is_empty() {
            return Err(ChatterError::InvalidConfigValue {
                key: "chat.collection_path".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
        if let Some(bad) = path.chars().find(|c| matches!(c, '.' | '$' | '#' | '[' | ']')) {
            return Err(ChatterError::InvalidConfigValue {
                key: "chat.collection_path".to_string(),
                message: format!("Must not contain '{}'", bad),
            });
        }

        if self.chat.nickname_max_len == 0 {
            return Err(ChatterError::InvalidConfigValue {
                key: "chat.nickname_max_len".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.chat.message_max_len == 0 {
            return Err(ChatterError::InvalidConfigValue {
                key: "chat.message_max_len".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.network.stream_idle_timeout_secs == 0 {
            return Err(ChatterError::InvalidConfigValue {
                key: "network.stream_idle_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.tui.tick_rate_ms == 0 {
            return Err(ChatterError::InvalidConfigValue {
                key: "tui.tick_rate_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ChatterError::InvalidConfigValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Collection path without leading or trailing slashes.
    pub fn collection_path(&self) -> &str {
        self.chat.collection_path.trim_matches('/')
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    /// Resolved log file location, falling back to the data directory.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        if !self.logging.file_path.trim().is_empty() {
            return Some(PathBuf::from(self.logging.file_path.trim()));
        }
        get_data_dir().map(|d| d.join("chatter.log"))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("chatter.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    for path in paths {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chatter"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("chatter"))
}

pub fn ensure_data_dir() -> Result<PathBuf, std::io::Error> {
    let data_dir = get_data_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}
