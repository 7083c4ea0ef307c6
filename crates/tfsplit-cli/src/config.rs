//! Configuration file loading for the CLI
//!
//! Layers are always configured in a TOML file, found in this order:
//! 1. Explicit `--config` path
//! 2. `.tfsplit.toml` in the module directory
//! 3. `config.toml` in the platform-specific config directory

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tfsplit::{TfsplitError, config::AppConfig};

/// Name of the configuration file looked up in the module directory.
pub const LOCAL_CONFIG_FILE: &str = ".tfsplit.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("No configuration found; pass --config or create .tfsplit.toml in the module")]
    NotFound,
}

impl From<ConfigError> for TfsplitError {
    fn from(err: ConfigError) -> Self {
        TfsplitError::Config(err.to_string())
    }
}

/// Find and load the configuration for the module in `module_dir`.
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - No config file is found anywhere
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
    module_dir: &Path,
) -> Result<AppConfig, TfsplitError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = module_dir.join(LOCAL_CONFIG_FILE);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from module directory");
        return load_config_file(&local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("io", "tfsplit", "tfsplit") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(&system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    Err(ConfigError::NotFound.into())
}

fn load_config_file(path: &Path) -> Result<AppConfig, TfsplitError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path).map_err(|err| TfsplitError::source_read(path, err))?;

    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    Ok(config)
}
