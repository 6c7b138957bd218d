use crate::error::{CliError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSamplingConfig {
    pub windows: Option<usize>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub parallel: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePullConfig {
    pub group1_name: Option<String>,
    pub group2_name: Option<String>,
    pub spring_constant: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePathsConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGromacsConfig {
    pub executable: Option<String>,
    pub production: Option<bool>,
}

/// The on-disk TOML configuration. Every value is optional; anything missing falls back
/// to the command line or the built-in defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub sampling: Option<FileSamplingConfig>,
    pub pull: Option<FilePullConfig>,
    pub paths: Option<FilePathsConfig>,
    pub gromacs: Option<FileGromacsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads `explicit` if given, otherwise the per-user config file if it exists,
    /// otherwise an empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match user_config_path() {
            Some(path) if path.is_file() => {
                debug!("Using user configuration at {:?}", path);
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Location of the per-user configuration file, e.g. `~/.config/umbrella/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "umbrella").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
