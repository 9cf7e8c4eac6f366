//! Application-level configuration: player display names, CORS allow-list and storage selection.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_BACK_CONFIG_PATH";
/// Comma separated origins overriding the configured allow-list.
const ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
const DEFAULT_ORIGINS: [&str; 1] = ["http://localhost:5173"];
const DEFAULT_DATA_DIR: &str = "data";

/// Display names of the two player slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerNames {
    pub player1: String,
    pub player2: String,
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            player1: "Player 1".to_owned(),
            player2: "Player 2".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    players: PlayerNames,
    allowed_origins: Vec<OriginPattern>,
}

impl AppConfig {
    /// Build a configuration from explicit values.
    pub fn new(players: PlayerNames, allowed_origins: Vec<OriginPattern>) -> Self {
        Self {
            players,
            allowed_origins,
        }
    }

    /// Load the configuration from disk, falling back to built-in defaults, then apply
    /// the `CORS_ALLOWED_ORIGINS` override.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        origins = app_config.allowed_origins.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Ok(raw) = env::var(ORIGINS_ENV) {
            let origins = parse_origin_list(&raw);
            if !origins.is_empty() {
                info!(
                    env = ORIGINS_ENV,
                    count = origins.len(),
                    "using allowed origins from environment"
                );
                config.allowed_origins = origins;
            }
        }

        config
    }

    pub fn players(&self) -> &PlayerNames {
        &self.players
    }

    /// Whether a browser `Origin` header value is on the allow-list.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|pattern| pattern.matches(origin))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            players: PlayerNames::default(),
            allowed_origins: DEFAULT_ORIGINS.iter().map(|raw| OriginPattern::parse(raw)).collect(),
        }
    }
}

/// Allowed CORS origin, either exact or with a single `*` wildcard (`https://*.netlify.app`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
    Exact(String),
    Wildcard { prefix: String, suffix: String },
}

impl OriginPattern {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/');
        match raw.split_once('*') {
            Some((prefix, suffix)) => OriginPattern::Wildcard {
                prefix: prefix.to_owned(),
                suffix: suffix.to_owned(),
            },
            None => OriginPattern::Exact(raw.to_owned()),
        }
    }

    pub fn matches(&self, origin: &str) -> bool {
        match self {
            OriginPattern::Exact(expected) => expected == origin,
            OriginPattern::Wildcard { prefix, suffix } => {
                origin.len() > prefix.len() + suffix.len()
                    && origin.starts_with(prefix.as_str())
                    && origin.ends_with(suffix.as_str())
                    && !origin[prefix.len()..origin.len() - suffix.len()].contains('/')
            }
        }
    }
}

fn parse_origin_list(raw: &str) -> Vec<OriginPattern> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(OriginPattern::parse)
        .collect()
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    players: Option<PlayerNames>,
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            players: value.players.unwrap_or(defaults.players),
            allowed_origins: value
                .allowed_origins
                .map(|origins| origins.iter().map(|raw| OriginPattern::parse(raw)).collect())
                .unwrap_or(defaults.allowed_origins),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Persistence backend chosen once at startup through `STORAGE_BACKEND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON documents under a local data directory.
    File { data_dir: PathBuf },
    /// MongoDB, configured through `MONGODB_URI` / `MONGODB_DB`.
    Mongo,
    /// CouchDB, configured through `COUCH_BASE_URL` / `COUCH_DB`.
    Couch,
}

/// Invalid storage selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown storage backend `{0}` (expected file, mongo or couch)")]
    UnknownBackend(String),
}

impl StorageBackend {
    /// Read `STORAGE_BACKEND` (default `file`) and `DATA_DIR` (default `data`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".into());
        let data_dir = env::var_os("DATA_DIR").map(PathBuf::from);
        Self::parse(&backend, data_dir)
    }

    fn parse(backend: &str, data_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        match backend.trim().to_ascii_lowercase().as_str() {
            "" | "file" | "local" => Ok(StorageBackend::File {
                data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            }),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "couch" | "couchdb" => Ok(StorageBackend::Couch),
            other => Err(ConfigError::UnknownBackend(other.to_owned())),
        }
    }
}
