use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "docusphere.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub mongodb: MongoSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    /// Absent or blank selects the in-memory corpus.
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Upper bound on the startup reachability probe.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_ensure_indexes")]
    pub ensure_indexes: bool,
}

fn default_database() -> String {
    "docusphere".to_string()
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_ensure_indexes() -> bool {
    true
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: None,
            database: default_database(),
            collection: default_collection(),
            connect_timeout_ms: default_connect_timeout_ms(),
            ensure_indexes: default_ensure_indexes(),
        }
    }
}

impl MongoSettings {
    /// The configured URI, if it is not blank.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackSettings {
    /// JSON or YAML seed file; the built-in sample corpus when absent.
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path` (optional file) and the environment.
    ///
    /// Sources, lowest precedence first: built-in defaults, the TOML file,
    /// `DOCUSPHERE_*` environment variables (`__` separates nested keys, e.g.
    /// `DOCUSPHERE_MONGODB__DATABASE`), then the plain `MONGODB_URI`,
    /// `MONGODB_DB` and `PORT` variables.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse::<u16>().ok())
            .map(i64::from);

        config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("DOCUSPHERE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("mongodb.uri", std::env::var("MONGODB_URI").ok())
            .and_then(|b| b.set_override_option("mongodb.database", std::env::var("MONGODB_DB").ok()))
            .and_then(|b| b.set_override_option("server.port", port))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

/// Replace the password of a connection URI, for logging.
pub fn redact_uri(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable uri>".to_string(),
    }
}
