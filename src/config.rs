//! Configuration management for tutorial-snapshot.
//!
//! Supports layered configuration: defaults → project → user → env

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub reset: ResetConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub shell: ShellConfig,
}

impl PipelineConfig {
    /// Load configuration with hierarchy: defaults → project → user → env
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.tutorial-snapshot.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(".tutorial-snapshot.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/tutorial-snapshot/config.toml)
        if let Some(config_dir) =
            directories::ProjectDirs::from("com", "tutorial-snapshot", "tutorial-snapshot")
        {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Environment variables (TUTORIAL_SNAPSHOT__*)
        builder = builder.add_source(
            Environment::with_prefix("TUTORIAL_SNAPSHOT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Load a single configuration file on top of the defaults
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::from(path.to_path_buf()))
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the pipeline write outside the workspace
    /// or snapshot into its own listing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let relative = [
            ("output.directory", &self.output.directory),
            ("manifest.path", &self.manifest.path),
        ];
        for (key, path) in relative {
            if path.is_absolute() || normalize(path).as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-empty relative path, got {:?}",
                    key, path
                )));
            }
        }

        for path in self.reset.paths.iter().chain(self.snapshot.sources.iter()) {
            if path.is_absolute() || path.components().any(|c| c.as_os_str() == "..") {
                return Err(ConfigError::Invalid(format!(
                    "workspace path must stay inside the workspace: {:?}",
                    path
                )));
            }
            if normalize(path).as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "workspace path must name something below the root, got {:?}",
                    path
                )));
            }
        }

        let output = normalize(&self.output.directory);

        if self
            .reset
            .paths
            .iter()
            .any(|p| output.starts_with(normalize(p)))
        {
            return Err(ConfigError::Invalid(
                "reset.paths must not include the output directory; use `reset --all`".into(),
            ));
        }

        for source in &self.snapshot.sources {
            let source = normalize(source);
            if source.starts_with(&output) || output.starts_with(&source) {
                return Err(ConfigError::Invalid(format!(
                    "snapshot source {:?} overlaps the output directory",
                    source
                )));
            }
        }

        Ok(())
    }
}

/// Drop `.` components so `./src` and `src` compare equal
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Where captured outputs land (relative to the workspace root)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root output directory
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    /// Subdirectory for per-cell `<cell-name>.txt` files
    #[serde(default = "default_cells_directory")]
    pub cells: PathBuf,
    /// Subdirectory for per-part snapshots
    #[serde(default = "default_snapshots_directory")]
    pub snapshots: PathBuf,
    /// Environment record filename
    #[serde(default = "default_environment_file")]
    pub environment_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            cells: default_cells_directory(),
            snapshots: default_snapshots_directory(),
            environment_file: default_environment_file(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_cells_directory() -> PathBuf {
    PathBuf::from("cells")
}

fn default_snapshots_directory() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_environment_file() -> String {
    "environment.txt".to_string()
}

/// Generated paths deleted by the workspace reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    #[serde(default = "default_reset_paths")]
    pub paths: Vec<PathBuf>,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            paths: default_reset_paths(),
        }
    }
}

fn default_reset_paths() -> Vec<PathBuf> {
    [
        "src",
        "docs-generated",
        "delivery-process.config.ts",
        "tsconfig.json",
        "package.json",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// The minimal manifest written after a reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
    #[serde(default = "default_manifest_name")]
    pub name: String,
    #[serde(default = "default_manifest_version")]
    pub version: String,
    #[serde(default = "default_dependencies")]
    pub dependencies: Vec<Dependency>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
            name: default_manifest_name(),
            version: default_manifest_version(),
            dependencies: default_dependencies(),
        }
    }
}

/// A declared package dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_manifest_name() -> String {
    "delivery-process-tutorial".to_string()
}

fn default_manifest_version() -> String {
    "1.0.0".to_string()
}

fn default_dependencies() -> Vec<Dependency> {
    vec![Dependency {
        name: default_dependency_package(),
        version: "latest".to_string(),
    }]
}

/// Snapshot sources and tree-listing exclusions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Paths copied into each snapshot when they exist
    #[serde(default = "default_snapshot_sources")]
    pub sources: Vec<PathBuf>,
    /// Directory names never listed in `tree.txt`
    #[serde(default = "default_snapshot_exclude")]
    pub exclude: Vec<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            sources: default_snapshot_sources(),
            exclude: default_snapshot_exclude(),
        }
    }
}

fn default_snapshot_sources() -> Vec<PathBuf> {
    [
        "src",
        "docs-generated",
        "delivery-process.config.ts",
        "tsconfig.json",
        "package.json",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

fn default_snapshot_exclude() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".git".to_string(),
        "output".to_string(),
    ]
}

/// Environment recorder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Tools queried with `<tool> --version`
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
    /// Package whose installed version is recorded
    #[serde(default = "default_dependency_package")]
    pub dependency: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            tools: default_tools(),
            dependency: default_dependency_package(),
        }
    }
}

fn default_tools() -> Vec<String> {
    vec!["node".to_string(), "npm".to_string(), "git".to_string()]
}

fn default_dependency_package() -> String {
    "@libar-dev/delivery-process".to_string()
}

/// Shell used to run cell scripts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell_program")]
    pub program: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell_program(),
        }
    }
}

fn default_shell_program() -> String {
    "sh".to_string()
}
