use crate::core::mdp::{
    DEFAULT_GROUP1_NAME, DEFAULT_GROUP2_NAME, DEFAULT_SPRING_CONSTANT, PullSettings,
};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_WINDOWS: usize = 25;
pub const DEFAULT_MIN_DISTANCE: f64 = 0.05;
pub const DEFAULT_MAX_DISTANCE: f64 = 2.5;
pub const DEFAULT_INPUT_DIR: &str = "0-files";
pub const DEFAULT_GMX_EXECUTABLE: &str = "gmx";

/// Files copied from the input directory into every window directory.
pub const INPUT_FILES: [&str; 3] = ["index.ndx", "ions.gro", "topol.top"];

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("At least one umbrella window is required")]
    NoWindows,

    #[error("Minimum distance ({min}) must be smaller than maximum distance ({max})")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Names and force constant of the pulled coordinate, shared by every window.
#[derive(Debug, Clone, PartialEq)]
pub struct PullConfig {
    pub group1_name: String,
    pub group2_name: String,
    pub spring_constant: f64,
}

impl PullConfig {
    /// Pull settings for a window centred at `position`.
    pub fn at(&self, position: f64) -> PullSettings {
        PullSettings::new(position)
            .with_groups(self.group1_name.clone(), self.group2_name.clone())
            .with_spring_constant(self.spring_constant)
    }
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            group1_name: DEFAULT_GROUP1_NAME.to_string(),
            group2_name: DEFAULT_GROUP2_NAME.to_string(),
            spring_constant: DEFAULT_SPRING_CONSTANT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub windows: usize,
    /// Lower bound of the pulled distance, in nm. The first window sits here.
    pub min_distance: f64,
    /// Upper bound of the pulled distance, in nm. No window reaches it.
    pub max_distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UmbrellaConfig {
    pub sampling: SamplingConfig,
    pub pull: PullConfig,
    /// Directory holding the prepared `index.ndx`, `ions.gro` and `topol.top`.
    pub input_dir: PathBuf,
    /// Directory in which the `run-<n>` window directories are created.
    pub output_dir: PathBuf,
    /// Run `grompp`/`mdrun` for every stage; otherwise only write parameter files.
    pub production: bool,
    pub gmx_executable: String,
    pub parallel_windows: bool,
}

#[derive(Default)]
pub struct UmbrellaConfigBuilder {
    windows: Option<usize>,
    min_distance: Option<f64>,
    max_distance: Option<f64>,
    group1_name: Option<String>,
    group2_name: Option<String>,
    spring_constant: Option<f64>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    production: Option<bool>,
    gmx_executable: Option<String>,
    parallel_windows: Option<bool>,
}

impl UmbrellaConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn windows(mut self, windows: usize) -> Self {
        self.windows = Some(windows);
        self
    }
    pub fn min_distance(mut self, distance: f64) -> Self {
        self.min_distance = Some(distance);
        self
    }
    pub fn max_distance(mut self, distance: f64) -> Self {
        self.max_distance = Some(distance);
        self
    }
    pub fn group1_name(mut self, name: impl Into<String>) -> Self {
        self.group1_name = Some(name.into());
        self
    }
    pub fn group2_name(mut self, name: impl Into<String>) -> Self {
        self.group2_name = Some(name.into());
        self
    }
    pub fn spring_constant(mut self, k: f64) -> Self {
        self.spring_constant = Some(k);
        self
    }
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }
    pub fn production(mut self, production: bool) -> Self {
        self.production = Some(production);
        self
    }
    pub fn gmx_executable(mut self, executable: impl Into<String>) -> Self {
        self.gmx_executable = Some(executable.into());
        self
    }
    pub fn parallel_windows(mut self, parallel: bool) -> Self {
        self.parallel_windows = Some(parallel);
        self
    }

    pub fn build(self) -> Result<UmbrellaConfig, ConfigError> {
        let sampling = SamplingConfig {
            windows: self.windows.unwrap_or(DEFAULT_WINDOWS),
            min_distance: self.min_distance.unwrap_or(DEFAULT_MIN_DISTANCE),
            max_distance: self.max_distance.unwrap_or(DEFAULT_MAX_DISTANCE),
        };
        if sampling.windows == 0 {
            return Err(ConfigError::NoWindows);
        }
        // Also rejects NaN bounds.
        if !(sampling.min_distance < sampling.max_distance) {
            return Err(ConfigError::InvalidRange {
                min: sampling.min_distance,
                max: sampling.max_distance,
            });
        }

        let defaults = PullConfig::default();
        let pull = PullConfig {
            group1_name: non_empty(
                "group1_name",
                self.group1_name.unwrap_or(defaults.group1_name),
            )?,
            group2_name: non_empty(
                "group2_name",
                self.group2_name.unwrap_or(defaults.group2_name),
            )?,
            spring_constant: self.spring_constant.unwrap_or(defaults.spring_constant),
        };
        if !(pull.spring_constant.is_finite() && pull.spring_constant > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "spring_constant",
                reason: format!("must be a positive number, got {}", pull.spring_constant),
            });
        }

        Ok(UmbrellaConfig {
            sampling,
            pull,
            input_dir: self
                .input_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            production: self.production.unwrap_or(false),
            gmx_executable: non_empty(
                "gmx_executable",
                self.gmx_executable
                    .unwrap_or_else(|| DEFAULT_GMX_EXECUTABLE.to_string()),
            )?,
            parallel_windows: self.parallel_windows.unwrap_or(false),
        })
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_in_tutorial_defaults() {
        let cfg = UmbrellaConfigBuilder::new().build().unwrap();

        assert_eq!(cfg.sampling.windows, 25);
        assert_eq!(cfg.sampling.min_distance, 0.05);
        assert_eq!(cfg.sampling.max_distance, 2.5);
        assert_eq!(cfg.pull.group1_name, "PYR1");
        assert_eq!(cfg.pull.group2_name, "PYR2");
        assert_eq!(cfg.pull.spring_constant, 5000.0);
        assert_eq!(cfg.input_dir, PathBuf::from("0-files"));
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert_eq!(cfg.gmx_executable, "gmx");
        assert!(!cfg.production);
        assert!(!cfg.parallel_windows);
    }

    #[test]
    fn zero_windows_is_rejected() {
        let err = UmbrellaConfigBuilder::new().windows(0).build().unwrap_err();
        assert_eq!(err, ConfigError::NoWindows);
    }

    #[test]
    fn inverted_or_empty_range_is_rejected() {
        let err = UmbrellaConfigBuilder::new()
            .min_distance(2.0)
            .max_distance(0.1)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidRange { min: 2.0, max: 0.1 });

        assert!(
            UmbrellaConfigBuilder::new()
                .min_distance(1.0)
                .max_distance(1.0)
                .build()
                .is_err()
        );
        assert!(
            UmbrellaConfigBuilder::new()
                .min_distance(f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn empty_group_name_and_bad_spring_constant_are_rejected() {
        let err = UmbrellaConfigBuilder::new()
            .group1_name("  ")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "group1_name",
                ..
            }
        ));

        let err = UmbrellaConfigBuilder::new()
            .spring_constant(-1.0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "spring_constant",
                ..
            }
        ));
    }

    #[test]
    fn pull_config_produces_window_settings() {
        let pull = PullConfig {
            group1_name: "A".into(),
            group2_name: "B".into(),
            spring_constant: 1000.0,
        };
        let settings = pull.at(0.42);

        assert_eq!(settings.position, 0.42);
        assert_eq!(settings.group1_name, "A");
        assert_eq!(settings.group2_name, "B");
        assert_eq!(settings.spring_constant, 1000.0);
    }
}
