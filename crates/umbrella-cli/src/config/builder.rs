use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use umbrella::engine::config::{UmbrellaConfig, UmbrellaConfigBuilder};
use umbrella::engine::error::EngineError;

/// Builds the run configuration from the config file (explicit or per-user) and the
/// command line.
pub fn build_config(args: &RunArgs) -> Result<UmbrellaConfig> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    merge_config(args, file_config)
}

/// Layers `defaults < file < CLI flags < --set` into a validated configuration.
pub fn merge_config(args: &RunArgs, file_config: FileConfig) -> Result<UmbrellaConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let sampling = file_config.sampling.take().unwrap_or_default();
    let pull = file_config.pull.take().unwrap_or_default();
    let paths = file_config.paths.take().unwrap_or_default();
    let gromacs = file_config.gromacs.take().unwrap_or_default();

    let production = match (args.mode.production, args.mode.dry_run) {
        (true, false) => true,
        (false, true) => false,
        _ => gromacs.production.unwrap_or(defaults.production),
    };
    let parallel = args.parallel || sampling.parallel.unwrap_or(defaults.parallel);

    UmbrellaConfigBuilder::new()
        .windows(
            args.windows
                .or(sampling.windows)
                .unwrap_or(defaults.windows),
        )
        .min_distance(
            args.min_distance
                .or(sampling.min_distance)
                .unwrap_or(defaults.min_distance),
        )
        .max_distance(
            args.max_distance
                .or(sampling.max_distance)
                .unwrap_or(defaults.max_distance),
        )
        .group1_name(
            args.group1
                .clone()
                .or(pull.group1_name)
                .unwrap_or(defaults.group1_name),
        )
        .group2_name(
            args.group2
                .clone()
                .or(pull.group2_name)
                .unwrap_or(defaults.group2_name),
        )
        .spring_constant(
            args.spring_constant
                .or(pull.spring_constant)
                .unwrap_or(defaults.spring_constant),
        )
        .input_dir(
            args.input_dir
                .clone()
                .or(paths.input_dir)
                .unwrap_or_else(|| PathBuf::from(defaults.input_dir)),
        )
        .output_dir(
            args.output_dir
                .clone()
                .or(paths.output_dir)
                .unwrap_or_else(|| PathBuf::from(defaults.output_dir)),
        )
        .gmx_executable(
            args.gmx
                .clone()
                .or(gromacs.executable)
                .unwrap_or(defaults.gmx_executable),
        )
        .production(production)
        .parallel_windows(parallel)
        .build()
        .map_err(|e| EngineError::from(e).into())
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;
        let key = key.trim();

        match key {
            "sampling.windows" => {
                config.sampling.get_or_insert_with(Default::default).windows =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "sampling.min-distance" => {
                config.sampling.get_or_insert_with(Default::default).min_distance =
                    Some(parse_value(key, value_str, "float")?);
            }
            "sampling.max-distance" => {
                config.sampling.get_or_insert_with(Default::default).max_distance =
                    Some(parse_value(key, value_str, "float")?);
            }
            "sampling.parallel" => {
                config.sampling.get_or_insert_with(Default::default).parallel =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "pull.group1-name" => {
                config.pull.get_or_insert_with(Default::default).group1_name =
                    Some(value_str.trim().to_string());
            }
            "pull.group2-name" => {
                config.pull.get_or_insert_with(Default::default).group2_name =
                    Some(value_str.trim().to_string());
            }
            "pull.spring-constant" => {
                config.pull.get_or_insert_with(Default::default).spring_constant =
                    Some(parse_value(key, value_str, "float")?);
            }
            "paths.input-dir" => {
                config.paths.get_or_insert_with(Default::default).input_dir =
                    Some(PathBuf::from(value_str.trim()));
            }
            "paths.output-dir" => {
                config.paths.get_or_insert_with(Default::default).output_dir =
                    Some(PathBuf::from(value_str.trim()));
            }
            "gromacs.executable" => {
                config.gromacs.get_or_insert_with(Default::default).executable =
                    Some(value_str.trim().to_string());
            }
            "gromacs.production" => {
                config.gromacs.get_or_insert_with(Default::default).production =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
