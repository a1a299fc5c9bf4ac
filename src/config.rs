use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
    pub data: DataConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support in the terminal.
    pub mouse_enabled: bool,
}

/// Generation backend (Google Generative Language API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API root, without the trailing `/models/...` part.
    pub base_url: String,
    /// Model used for sticker generation and image edits.
    pub image_model: String,
    /// Model used for structured prompt ideas.
    pub text_model: String,
    /// Whole-request timeout for a single backend call.
    pub timeout_secs: u64,
}

/// Proxy server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Server-side credential. Never sent to clients.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tui: TuiConfig::default(),
            gemini: GeminiConfig::default(),
            server: ServerConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: false,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            api_key: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

/// Environment variables consulted for the server credential, in order.
const SERVER_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

impl AppConfig {
    /// Load configuration from `~/.config/sticker-studio/config.toml`,
    /// overlaid with `STICKER_*` environment variables
    /// (`STICKER_SERVER__PORT=9000`).
    /// Returns `Default` if the sources are unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Same as [`AppConfig::load`] but reading the TOML file at `path`.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
        }

        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("STICKER_").split("__"));

        let mut config = match figment.extract::<AppConfig>() {
            Ok(config) => {
                log::info!("Loaded config (file: {})", path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse config at {}: {e}, using defaults",
                    path.display()
                );
                Self::default()
            }
        };

        if config.server.api_key.is_none() {
            config.server.api_key = SERVER_KEY_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok())
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty());
        }

        config
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("sticker-studio"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory that receives rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("sticker-studio").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
