//! Configuration management for shmgr

pub mod schema;

pub use schema::Config;

use crate::error::{ShmgrError, ShmgrResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "SHMGR_CACHE_DIR";

/// Environment variable adding provider search directories (colon-separated)
pub const PROVIDER_PATH_ENV: &str = "SHMGR_PROVIDER_PATH";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shmgr")
            .join("config.toml")
    }

    /// Default cache root: `<platform cache dir>/shmgr`
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join("shmgr"))
            .unwrap_or_else(|| PathBuf::from(".shmgr-cache"))
    }

    /// Default provider search directory: `<config dir>/shmgr/providers`
    pub fn default_provider_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shmgr")
            .join("providers")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> ShmgrResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> ShmgrResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ShmgrError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| ShmgrError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Cache root: explicit override, then `SHMGR_CACHE_DIR`, then the
    /// config file, then the platform default
    pub fn cache_root(&self, explicit: Option<&Path>) -> PathBuf {
        cache_root_with_env(
            explicit,
            std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from),
            self.cache.dir.as_deref(),
        )
    }

    /// Provider search directories: config file entries, then
    /// `SHMGR_PROVIDER_PATH`, then the default directory
    pub fn provider_dirs(&self) -> Vec<PathBuf> {
        provider_dirs_with_env(
            &self.providers.dirs,
            std::env::var_os(PROVIDER_PATH_ENV),
            ConfigManager::default_provider_dir(),
        )
    }
}

fn cache_root_with_env(
    explicit: Option<&Path>,
    env_dir: Option<PathBuf>,
    configured: Option<&Path>,
) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or(env_dir.filter(|d| !d.as_os_str().is_empty()))
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(ConfigManager::default_cache_dir)
}

fn provider_dirs_with_env(
    configured: &[PathBuf],
    env_path: Option<std::ffi::OsString>,
    default_dir: PathBuf,
) -> Vec<PathBuf> {
    let mut dirs = configured.to_vec();
    if let Some(path) = env_path {
        dirs.extend(std::env::split_paths(&path).filter(|d| !d.as_os_str().is_empty()));
    }
    dirs.push(default_dir);
    dirs
}
