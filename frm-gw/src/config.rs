//! Gateway configuration
//!
//! Resolves the artifact root folder (CLI/env > TOML > platform
//! default), the bind port, and the command line for each external
//! tool. Every artifact the pipeline produces lives at a fixed path
//! under the root folder and is overwritten by the next run.

use frm_common::config::{
    default_config_file, ensure_directory, read_toml, resolve_root_folder,
};
use frm_common::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default bind port for the gateway
pub const DEFAULT_PORT: u16 = 5730;

/// Resolved gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_folder: PathBuf,
    pub port: u16,
    pub artifacts: ArtifactPaths,
    pub tools: ToolsConfig,
}

impl Config {
    /// Build a configuration rooted at `root_folder` with defaults for
    /// everything else.
    pub fn with_root(root_folder: PathBuf) -> Self {
        let artifacts = ArtifactPaths::new(&root_folder);
        Self {
            root_folder,
            port: DEFAULT_PORT,
            artifacts,
            tools: ToolsConfig::default(),
        }
    }

    /// Resolve the full configuration.
    ///
    /// `cli_root` and `cli_port` come from the command line or
    /// environment (clap handles both tiers); the TOML file fills in
    /// anything they leave unset.
    pub fn resolve(
        cli_root: Option<&Path>,
        cli_port: Option<u16>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let file_config = match config_file.map(PathBuf::from).or_else(default_config_file) {
            Some(path) => {
                debug!("Loading config file: {}", path.display());
                read_toml::<TomlConfig>(&path)?
            }
            None => TomlConfig::default(),
        };

        let root_folder = resolve_root_folder(cli_root, file_config.root_folder.as_deref());
        let port = cli_port
            .or(file_config.port)
            .unwrap_or(DEFAULT_PORT);

        let mut config = Self::with_root(root_folder);
        config.port = port;
        config.tools = file_config.tools;
        Ok(config)
    }

    /// Create the root folder and artifact directories at startup
    pub fn ensure_directories(&self) -> Result<()> {
        ensure_directory(&self.root_folder)?;
        ensure_directory(&self.artifacts.outputs_dir)?;
        ensure_directory(&self.artifacts.satellite_cache)?;
        Ok(())
    }
}

/// Fixed artifact layout under the root folder
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// DEM render, `outputs/dem_map.png`
    pub dem: PathBuf,
    /// Road-extraction mask, `outputs/road_mask.png`
    pub road_mask: PathBuf,
    /// Elevation/road overlay, `outputs/overlay.png`
    pub overlay: PathBuf,
    /// Planned route render, `outputs/shortest_path.png`
    pub route: PathBuf,
    /// Flood segmentation mask, `outputs/flood_mask.jpg`
    pub flood_mask: PathBuf,
    /// Satellite fetcher cache directory, `gearth_cache/`
    pub satellite_cache: PathBuf,
    /// Path-length log written by the planner, `path_lengths.txt`
    pub path_lengths: PathBuf,
    /// Place metadata file, `place_data.txt`
    pub place_data: PathBuf,
    /// Image output directory, `outputs/`
    pub outputs_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: &Path) -> Self {
        let outputs = root.join("outputs");
        Self {
            dem: outputs.join("dem_map.png"),
            road_mask: outputs.join("road_mask.png"),
            overlay: outputs.join("overlay.png"),
            route: outputs.join("shortest_path.png"),
            flood_mask: outputs.join("flood_mask.jpg"),
            satellite_cache: root.join("gearth_cache"),
            path_lengths: root.join("path_lengths.txt"),
            place_data: root.join("place_data.txt"),
            outputs_dir: outputs,
        }
    }
}

/// Command line for one external tool: a program plus an argument
/// template. Placeholders (`{place}`, `{out}`, `{dem}`, `{road}`,
/// `{overlay}`, `{lengths}`, `{cache_dir}`) are substituted per run.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Per-tool command configuration, overridable from the `[tools]`
/// table of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub dem: ToolSpec,
    pub roads: ToolSpec,
    pub overlay: ToolSpec,
    pub satellite: ToolSpec,
    pub planner: ToolSpec,
    pub flood: ToolSpec,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            dem: ToolSpec::new("dem-generator", &["{place}", "{out}"]),
            roads: ToolSpec::new("road-extractor", &["{place}", "{out}"]),
            overlay: ToolSpec::new("overlay-compositor", &["{dem}", "{road}", "{out}"]),
            satellite: ToolSpec::new("gearth-fetch", &["{place}", "{cache_dir}"]),
            planner: ToolSpec::new("path-planner", &["{overlay}", "{out}", "{lengths}"]),
            flood: ToolSpec::new("flood-segmenter", &["{place}", "{out}"]),
        }
    }
}

/// File-level configuration (`config.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    #[serde(default)]
    pub tools: ToolsConfig,
}
