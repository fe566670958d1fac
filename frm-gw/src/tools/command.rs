//! Command-line tool implementations
//!
//! Production implementations of the tool seams. Each step spawns the
//! configured program with placeholder-substituted arguments, checks
//! the exit status, and verifies that the expected artifact actually
//! landed on disk before reporting success.

use super::{
    DemGenerator, FloodSegmenter, OverlayCompositor, PathPlanner, RoadExtractor,
    SatelliteFetcher, ToolError, Toolset,
};
use crate::config::{ArtifactPaths, ToolSpec, ToolsConfig};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tracing::{debug, warn};

/// Substitution variables for one invocation
type Vars<'a> = [(&'a str, String)];

/// Spawns a configured program with placeholder-substituted arguments.
///
/// External tools can block for a long time (model inference, tile
/// downloads), so the spawn runs on the blocking pool.
#[derive(Debug, Clone)]
struct ToolRunner {
    spec: ToolSpec,
}

impl ToolRunner {
    fn new(spec: ToolSpec) -> Self {
        Self { spec }
    }

    fn render_args(&self, vars: &Vars<'_>) -> Vec<String> {
        self.spec
            .args
            .iter()
            .map(|template| {
                vars.iter().fold(template.clone(), |arg, (key, value)| {
                    arg.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }

    async fn run(&self, vars: &Vars<'_>) -> Result<Output, ToolError> {
        let program = self.spec.program.clone();
        let args = self.render_args(vars);

        debug!(program = %program, ?args, "Running external tool");

        let output = tokio::task::spawn_blocking({
            let program = program.clone();
            move || Command::new(&program).args(&args).output()
        })
        .await
        .map_err(|e| ToolError::Join(e.to_string()))?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound(program.clone()),
            _ => ToolError::Execution {
                program: program.clone(),
                source: e,
            },
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::Failed {
                program,
                code: output.status.code(),
                stderr,
            });
        }

        Ok(output)
    }

    /// Run the tool and require that `artifact` exists afterwards.
    async fn run_expecting(&self, vars: &Vars<'_>, artifact: &Path) -> Result<(), ToolError> {
        self.run(vars).await?;

        if !artifact.exists() {
            return Err(ToolError::MissingArtifact {
                program: self.spec.program.clone(),
                path: artifact.to_path_buf(),
            });
        }

        Ok(())
    }
}

fn path_var(path: &Path) -> String {
    path.display().to_string()
}

struct CommandDemGenerator {
    runner: ToolRunner,
    out: PathBuf,
}

#[async_trait]
impl DemGenerator for CommandDemGenerator {
    async fn generate(&self, place: &str) -> Result<(), ToolError> {
        let vars = [
            ("place", place.to_string()),
            ("out", path_var(&self.out)),
        ];
        self.runner.run_expecting(&vars, &self.out).await
    }
}

struct CommandRoadExtractor {
    runner: ToolRunner,
}

#[async_trait]
impl RoadExtractor for CommandRoadExtractor {
    async fn extract(&self, out: &Path, place: &str) -> Result<(), ToolError> {
        let vars = [("place", place.to_string()), ("out", path_var(out))];
        self.runner.run_expecting(&vars, out).await
    }
}

struct CommandOverlayCompositor {
    runner: ToolRunner,
}

#[async_trait]
impl OverlayCompositor for CommandOverlayCompositor {
    async fn compose(&self, dem: &Path, road: &Path, out: &Path) -> Result<(), ToolError> {
        let vars = [
            ("dem", path_var(dem)),
            ("road", path_var(road)),
            ("out", path_var(out)),
        ];
        self.runner.run_expecting(&vars, out).await
    }
}

struct CommandSatelliteFetcher {
    runner: ToolRunner,
    cache_dir: PathBuf,
}

#[async_trait]
impl SatelliteFetcher for CommandSatelliteFetcher {
    /// The fetcher prints the image path on stdout. A clean exit with
    /// no usable path, or a tool-reported failure, both mean "no image
    /// for this place"; only spawn-level problems surface as errors.
    async fn fetch(&self, place: &str) -> Result<Option<PathBuf>, ToolError> {
        let vars = [
            ("place", place.to_string()),
            ("cache_dir", path_var(&self.cache_dir)),
        ];

        let output = match self.runner.run(&vars).await {
            Ok(output) => output,
            Err(ToolError::Failed {
                program,
                code,
                stderr,
            }) => {
                warn!(program = %program, ?code, stderr = %stderr, "Satellite fetch reported failure");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from);

        match path {
            Some(path) if path.exists() => Ok(Some(path)),
            Some(path) => {
                warn!(path = %path.display(), "Satellite fetcher reported a missing file");
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

struct CommandPathPlanner {
    runner: ToolRunner,
    lengths: PathBuf,
}

#[async_trait]
impl PathPlanner for CommandPathPlanner {
    async fn plan(&self, overlay: &Path, out: &Path) -> Result<(), ToolError> {
        let vars = [
            ("overlay", path_var(overlay)),
            ("out", path_var(out)),
            ("lengths", path_var(&self.lengths)),
        ];
        self.runner.run_expecting(&vars, out).await
    }
}

struct CommandFloodSegmenter {
    runner: ToolRunner,
    out: PathBuf,
}

#[async_trait]
impl FloodSegmenter for CommandFloodSegmenter {
    async fn segment(&self, place: &str) -> Result<(), ToolError> {
        let vars = [
            ("place", place.to_string()),
            ("out", path_var(&self.out)),
        ];
        self.runner.run_expecting(&vars, &self.out).await
    }
}

impl Toolset {
    /// Wire up the command-backed toolset from configuration.
    pub fn from_config(tools: &ToolsConfig, paths: &ArtifactPaths) -> Self {
        Self {
            dem: Arc::new(CommandDemGenerator {
                runner: ToolRunner::new(tools.dem.clone()),
                out: paths.dem.clone(),
            }),
            roads: Arc::new(CommandRoadExtractor {
                runner: ToolRunner::new(tools.roads.clone()),
            }),
            overlay: Arc::new(CommandOverlayCompositor {
                runner: ToolRunner::new(tools.overlay.clone()),
            }),
            satellite: Arc::new(CommandSatelliteFetcher {
                runner: ToolRunner::new(tools.satellite.clone()),
                cache_dir: paths.satellite_cache.clone(),
            }),
            planner: Arc::new(CommandPathPlanner {
                runner: ToolRunner::new(tools.planner.clone()),
                lengths: paths.path_lengths.clone(),
            }),
            flood: Arc::new(CommandFloodSegmenter {
                runner: ToolRunner::new(tools.flood.clone()),
                out: paths.flood_mask.clone(),
            }),
        }
    }
}
