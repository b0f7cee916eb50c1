//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory config file
pub const PROJECT_CONFIG_FILE: &str = ".harnessviz.yaml";

/// Default name of the quantity multiplier file, looked up in the output directory
pub const DEFAULT_MULTIPLIER_FILE: &str = "quantity_multipliers.txt";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid config file {path}: {message}")]
    #[diagnostic(code(harnessviz::config::file))]
    File { path: String, message: String },

    #[error("invalid value {value:?} for {var}")]
    #[diagnostic(
        code(harnessviz::config::env),
        help("boolean variables accept true/false, yes/no or 1/0")
    )]
    Env { var: String, value: String },
}

/// Output format written by `build`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// GraphViz source
    Gv,
    /// Graph and BOM as JSON
    Json,
    /// Tab-separated BOM
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gv" | "dot" => Ok(OutputFormat::Gv),
            "json" => Ok(OutputFormat::Json),
            "tsv" => Ok(OutputFormat::Tsv),
            other => Err(format!("unknown output format '{}' (expected gv, json or tsv)", other)),
        }
    }
}

/// harnessviz configuration
///
/// Sources in increasing priority: built-in defaults, the global user config
/// (`~/.config/harnessviz/config.yaml`), `.harnessviz.yaml` in the working
/// directory, then `HARNESSVIZ_*` environment variables. Command-line flags
/// override all of them.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for generated files; defaults to each input's directory
    pub output_dir: Option<PathBuf>,

    /// Formats written by `build`, e.g. `[gv, json, tsv]`
    pub formats: Option<Vec<String>>,

    /// Fragments prepended to every harness
    pub prepend: Vec<PathBuf>,

    /// Scale the shared BOM by per-harness multipliers
    pub use_multipliers: Option<bool>,

    /// Multiplier file name
    pub multiplier_file: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::load_files(Self::global_config_path().as_deref(), &cwd)?;
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Defaults, then the global file, then the project file in `dir`
    pub fn load_files(global: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(path) = global {
            if let Some(global) = Self::read_file(path)? {
                config.merge(global);
            }
        }
        if let Some(project) = Self::read_file(&dir.join(PROJECT_CONFIG_FILE))? {
            config.merge(project);
        }
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let error = |message: String| ConfigError::File {
            path: path.display().to_string(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let config = serde_yml::from_str(&contents).map_err(|e| error(e.to_string()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(Some(config))
    }

    /// Apply `HARNESSVIZ_*` variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("HARNESSVIZ_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(formats) = lookup("HARNESSVIZ_FORMATS") {
            self.formats = Some(
                formats
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect(),
            );
        }
        if let Some(value) = lookup("HARNESSVIZ_USE_MULTIPLIERS") {
            let flag = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Env {
                        var: "HARNESSVIZ_USE_MULTIPLIERS".to_string(),
                        value,
                    })
                }
            };
            self.use_multipliers = Some(flag);
        }
        if let Some(file) = lookup("HARNESSVIZ_MULTIPLIER_FILE") {
            self.multiplier_file = Some(file);
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "harnessviz")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
        if other.formats.is_some() {
            self.formats = other.formats;
        }
        if !other.prepend.is_empty() {
            self.prepend = other.prepend;
        }
        if other.use_multipliers.is_some() {
            self.use_multipliers = other.use_multipliers;
        }
        if other.multiplier_file.is_some() {
            self.multiplier_file = other.multiplier_file;
        }
    }

    /// Configured output formats; all of them when unset
    pub fn output_formats(&self) -> Result<Vec<OutputFormat>, String> {
        match &self.formats {
            None => Ok(vec![OutputFormat::Gv, OutputFormat::Json, OutputFormat::Tsv]),
            Some(formats) => formats.iter().map(|f| f.parse()).collect(),
        }
    }

    pub fn multiplier_file(&self) -> &str {
        self.multiplier_file
            .as_deref()
            .unwrap_or(DEFAULT_MULTIPLIER_FILE)
    }

    pub fn use_multipliers(&self) -> bool {
        self.use_multipliers.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.multiplier_file(), "quantity_multipliers.txt");
        assert!(!config.use_multipliers());
        assert_eq!(config.output_formats().unwrap().len(), 3);
    }

    #[test]
    fn test_project_overrides_global() {
        let global_dir = tempdir().unwrap();
        let global = global_dir.path().join("config.yaml");
        std::fs::write(&global, "output_dir: out\nmultiplier_file: global.txt\n").unwrap();

        let project = tempdir().unwrap();
        std::fs::write(
            project.path().join(PROJECT_CONFIG_FILE),
            "multiplier_file: local.txt\nformats: [gv]\n",
        )
        .unwrap();

        let config = Config::load_files(Some(&global), project.path()).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.multiplier_file(), "local.txt");
        assert_eq!(config.output_formats().unwrap(), vec![OutputFormat::Gv]);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HARNESSVIZ_FORMATS", "json, tsv"),
            ("HARNESSVIZ_USE_MULTIPLIERS", "yes"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env(|var| vars.get(var).map(|v| v.to_string()))
            .unwrap();
        assert!(config.use_multipliers());
        assert_eq!(
            config.output_formats().unwrap(),
            vec![OutputFormat::Json, OutputFormat::Tsv]
        );

        let err = Config::default()
            .apply_env(|var| (var == "HARNESSVIZ_USE_MULTIPLIERS").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { .. }));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "formats: 12: x\n").unwrap();
        assert!(Config::load_files(None, dir.path()).is_err());
    }

    #[test]
    fn test_unknown_format() {
        let config = Config {
            formats: Some(vec!["pdf".to_string()]),
            ..Default::default()
        };
        assert!(config.output_formats().is_err());
    }
}
