//! Loading the ambient [`PathfinderConfig`] from multiple sources, and the
//! human-authored input chain TOMLs (spec §6) from a directory.

use crate::config::{ConfigError, InputChainToml, PathfinderConfig, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

/// Loader for the ambient runtime settings (`PathfinderConfig`). Supports
/// TOML, YAML, and JSON, plus `PATHFINDER_`-prefixed environment variable
/// overrides, which take precedence over file values (spec §6).
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_file(path: &Path) -> Result<PathfinderConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;

        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!("Unsupported file extension: {extension}"))),
        }
    }

    pub fn from_toml(content: &str) -> Result<PathfinderConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_yaml(content: &str) -> Result<PathfinderConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_json(content: &str) -> Result<PathfinderConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Environment overrides under the `PATHFINDER_` prefix, mirroring the
    /// config file's nested structure, e.g. `PATHFINDER_NETWORK_LOG_LEVEL`.
    pub fn from_env() -> Result<PathfinderConfig> {
        Self::from_env_with_prefix("PATHFINDER")
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<PathfinderConfig> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(prefix).separator("_"))
            .build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }

    /// File values override environment overrides (spec §6: "file values
    /// override env"), so the env-derived config is the base and the file
    /// is layered on top.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<PathfinderConfig> {
        let file_config = Self::from_file(path)?;
        match Self::from_env_with_prefix(env_prefix) {
            Ok(env_config) => Ok(Self::merge(env_config, file_config)),
            Err(_) => Ok(file_config),
        }
    }

    pub fn merge(base: PathfinderConfig, overlay: PathfinderConfig) -> PathfinderConfig {
        PathfinderConfig {
            network: overlay.network,
            planner: overlay.planner,
            resolver: overlay.resolver,
            brokers: overlay.brokers,
            registry: overlay.registry,
        }
    }

    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder { builder: Config::builder() }
    }
}

pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl ConfigLoaderBuilder {
    pub fn add_file(mut self, path: &Path, required: bool) -> Self {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };
        self.builder = self.builder.add_source(File::from(path).format(format).required(required));
        self
    }

    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(Environment::with_prefix(prefix).separator("_"));
        self
    }

    pub fn set_default(mut self, key: &str, value: &str) -> Self {
        self.builder = self.builder.set_default(key, value).expect("static default key/value");
        self
    }

    pub fn build(self) -> Result<PathfinderConfig> {
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}

/// Loads every `*.toml` file in `dir` as an [`InputChainToml`] (spec §6).
/// Collects per-file parse errors rather than aborting on the first bad
/// file, matching the "validation of the input is total" policy of §4.4.
pub fn load_input_chains(dir: impl AsRef<Path>) -> Result<(Vec<InputChainToml>, Vec<String>)> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ConfigError::LoadError(format!("input directory not found: {}", dir.display())));
    }

    let mut chains = Vec::new();
    let mut parse_errors = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let content = std::fs::read_to_string(&path)?;
        match toml::from_str::<InputChainToml>(&content) {
            Ok(chain) => chains.push(chain),
            Err(e) => parse_errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    Ok((chains, parse_errors))
}
