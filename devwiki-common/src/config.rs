//! Configuration loading and data folder resolution

use crate::db::init::DATABASE_FILE_NAME;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV: &str = "DEVWIKI_DATA_FOLDER";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub data_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// The file to read: the explicit path if given, else the platform
    /// default location when a file exists there.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            // No config file at the default location is the normal case
            None => default_config_path().filter(|path| path.exists()),
        }
    }

    /// Load the located config file, falling back to compiled defaults.
    ///
    /// A missing or broken file is not fatal. The load error is handed back
    /// next to the defaults so the caller can report it once logging is up.
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, Option<Error>) {
        let Some(path) = Self::locate(explicit) else {
            return (Self::default(), None);
        };

        match Self::load(&path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}

/// Settings after CLI, environment, config file and defaults are merged
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_folder: PathBuf,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Merge sources, highest priority first: CLI → environment → TOML → defaults
    pub fn resolve(
        cli_host: Option<String>,
        cli_port: Option<u16>,
        cli_data_folder: Option<&Path>,
        file: TomlConfig,
    ) -> Self {
        let data_folder = resolve_data_folder(cli_data_folder, DATA_FOLDER_ENV, &file);

        Self {
            host: cli_host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            data_folder,
            log_level: file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            allowed_origins: file
                .allowed_origins
                .filter(|origins| !origins.is_empty())
                .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]),
        }
    }

    /// Location of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join(DATABASE_FILE_NAME)
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `EnvFilter` directives applying `log_level` to the devwiki crates
    /// and the HTTP trace layer
    pub fn log_filter(&self) -> String {
        format!(
            "devwiki_api={0},devwiki_common={0},tower_http={0}",
            self.log_level
        )
    }
}

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &file.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("devwiki").join("config.toml"))
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/devwiki (or /var/lib/devwiki without a home)
        dirs::data_local_dir()
            .map(|d| d.join("devwiki"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/devwiki"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("devwiki"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/devwiki"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("devwiki"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\devwiki"))
    } else {
        PathBuf::from("./devwiki_data")
    }
}
