//! Runtime configuration for `hrdesk`.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `HRDESK_PORT`, `HRDESK_DATA_DIR`, `HRDESK_API_KEY`
//! 4. command-line flags
//!
//! # Example
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [storage]
//! data_dir = "/var/lib/hrdesk"
//!
//! [auth]
//! api_key = "change-me"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "hrdesk-data";

pub const ENV_PORT: &str = "HRDESK_PORT";
pub const ENV_DATA_DIR: &str = "HRDESK_DATA_DIR";
pub const ENV_API_KEY: &str = "HRDESK_API_KEY";

// ── File format ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub auth: AuthSection,
}

/// `[server]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
}

/// `[storage]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    pub data_dir: Option<PathBuf>,
}

/// `[auth]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    pub api_key: Option<String>,
}

/// Read and parse a TOML config file.
pub fn read_config_file(path: &Path) -> Result<ConfigFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

// ── Resolved settings ─────────────────────────────────────────────────────────

/// Values given directly on the command line.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub config: Option<PathBuf>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub data_dir: PathBuf,
    /// `None` disables API key authentication.
    pub api_key: Option<String>,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn load(flags: FlagOverrides) -> Result<Self, String> {
        Self::resolve(flags, |name| std::env::var(name).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    pub fn resolve(
        flags: FlagOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let file = match &flags.config {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };

        let mut settings = Settings {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            api_key: None,
        };

        if let Some(port) = file.server.port {
            settings.port = port;
        }
        if let Some(dir) = file.storage.data_dir {
            settings.data_dir = dir;
        }
        if let Some(key) = file.auth.api_key {
            settings.api_key = Some(key);
        }

        if let Some(raw) = env(ENV_PORT) {
            settings.port = raw
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a port number, got '{}'", ENV_PORT, raw))?;
        }
        if let Some(dir) = env(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = env(ENV_API_KEY) {
            settings.api_key = Some(key);
        }

        if let Some(port) = flags.port {
            settings.port = port;
        }
        if let Some(dir) = flags.data_dir {
            settings.data_dir = dir;
        }

        // An empty key means "no auth", whichever layer set it.
        settings.api_key = settings.api_key.filter(|k| !k.is_empty());
        Ok(settings)
    }
}
