//! Configuration file discovery and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolve the artifact root folder following the priority order:
/// 1. Command-line argument or environment variable (highest priority)
/// 2. TOML config file value
/// 3. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = config_value {
        return path.to_path_buf();
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    // ~/.local/share/frm on Linux, platform equivalents elsewhere
    dirs::data_local_dir()
        .map(|d| d.join("frm"))
        .unwrap_or_else(|| PathBuf::from("./frm_data"))
}

/// Get default configuration file path for the platform.
///
/// Prefers the user config dir (`~/.config/frm/config.toml` on Linux),
/// then the system-wide `/etc/frm/config.toml` on Unix. Returns `None`
/// when neither file exists.
pub fn default_config_file() -> Option<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("frm").join("config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    #[cfg(unix)]
    {
        let system = PathBuf::from("/etc/frm/config.toml");
        if system.exists() {
            return Some(system);
        }
    }

    None
}

/// Read and deserialize a TOML configuration file
pub fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        tracing::info!("Created directory: {}", path.display());
    }
    Ok(())
}
