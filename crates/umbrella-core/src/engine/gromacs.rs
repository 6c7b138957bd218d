//! Invocation of the external GROMACS tools.
//!
//! Each stage of a window is prepared with `gmx grompp` and run with `gmx mdrun`. The
//! command lines are built from small request types so they can be checked without
//! GROMACS installed; [`GmxEngine`] executes them, and tests substitute their own
//! [`MdEngine`].

use super::error::EngineError;
use crate::core::fs::which::which;
use crate::core::mdp::Stage;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Index file shared by every stage of a window.
pub const INDEX_FILE: &str = "index.ndx";
/// Topology shared by every stage of a window.
pub const TOPOLOGY_FILE: &str = "topol.top";
/// Structure stem used by the first stage, i.e. the solvated and ionised system.
pub const INITIAL_STRUCTURE: &str = "ions";

/// Arguments for one `grompp` preprocessing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GromppRequest {
    /// Stem of the `.mdp` input; also used for every output name.
    pub mdp_name: String,
    /// Output stem of the preceding stage, used as structure and checkpoint input.
    pub previous: Option<String>,
    /// Passed as `-maxwarn` when greater than zero.
    pub max_warnings: u32,
}

impl GromppRequest {
    pub fn new(mdp_name: impl Into<String>) -> Self {
        Self {
            mdp_name: mdp_name.into(),
            previous: None,
            max_warnings: 0,
        }
    }

    pub fn after(mut self, previous: impl Into<String>) -> Self {
        let previous = previous.into();
        self.previous = (!previous.is_empty()).then_some(previous);
        self
    }

    pub fn max_warnings(mut self, n: u32) -> Self {
        self.max_warnings = n;
        self
    }

    /// The request for `stage` of window `window`, chained to the previous stage.
    pub fn for_stage(stage: Stage, window: usize) -> Self {
        let request = Self::new(stage.file_stem(window)).max_warnings(stage.max_warnings());
        match stage.previous() {
            Some(prev) => request.after(prev.file_stem(window)),
            None => request,
        }
    }

    /// Arguments following the executable name.
    pub fn args(&self) -> Result<Vec<String>, EngineError> {
        if self.mdp_name.is_empty() {
            return Err(EngineError::InvalidRequest(
                "the name for the mdp file cannot be empty".to_string(),
            ));
        }
        let name = self.mdp_name.as_str();
        let mut args: Vec<String> = [
            "grompp", "-n", INDEX_FILE, "-p", TOPOLOGY_FILE, "-f", name, "-o", name, "-pp",
            name,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push("-po".to_string());
        args.push(format!("{}out", name));

        args.push("-c".to_string());
        match &self.previous {
            Some(prev) => {
                args.push(prev.clone());
                args.push("-t".to_string());
                args.push(prev.clone());
            }
            None => args.push(INITIAL_STRUCTURE.to_string()),
        }

        if self.max_warnings > 0 {
            args.push("-maxwarn".to_string());
            args.push(self.max_warnings.to_string());
        }
        Ok(args)
    }
}

/// Arguments for one `mdrun` simulation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdrunRequest {
    /// Run-input stem; also the stem of every output file.
    pub name: String,
}

impl MdrunRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn args(&self) -> Result<Vec<String>, EngineError> {
        if self.name.is_empty() {
            return Err(EngineError::InvalidRequest(
                "the run input name cannot be empty".to_string(),
            ));
        }
        Ok(vec![
            "mdrun".to_string(),
            "-deffnm".to_string(),
            self.name.clone(),
            "-v".to_string(),
            "-pf".to_string(),
            format!("pullf-{}", self.name),
            "-px".to_string(),
            format!("pullx-{}", self.name),
        ])
    }
}

/// Something that can preprocess and run a stage inside a window directory.
///
/// Both calls block until the work is finished. Any failure is fatal to the caller.
pub trait MdEngine: Send + Sync {
    /// Checked once before a production run starts.
    fn check_available(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn preprocess(&self, workdir: &Path, request: &GromppRequest) -> Result<(), EngineError>;
    fn simulate(&self, workdir: &Path, request: &MdrunRequest) -> Result<(), EngineError>;
}

/// Runs the real `gmx` binary (or a substitute such as `gmx_mpi`).
#[derive(Debug, Clone)]
pub struct GmxEngine {
    executable: String,
}

impl GmxEngine {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn run(&self, workdir: &Path, args: Vec<String>) -> Result<(), EngineError> {
        let command = format!("{} {}", self.executable, args.join(" "));
        debug!("Running `{}` in {:?}", command, workdir);

        let status = Command::new(&self.executable)
            .args(&args)
            .current_dir(workdir)
            .status()
            .map_err(|source| EngineError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EngineError::ProcessFailed { command, status });
        }
        Ok(())
    }
}

impl Default for GmxEngine {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_GMX_EXECUTABLE)
    }
}

impl MdEngine for GmxEngine {
    fn check_available(&self) -> Result<(), EngineError> {
        let path = which(&self.executable)
            .ok_or_else(|| EngineError::ExecutableNotFound(self.executable.clone()))?;
        debug!("Using GROMACS executable {:?}", path);
        Ok(())
    }

    fn preprocess(&self, workdir: &Path, request: &GromppRequest) -> Result<(), EngineError> {
        let args = request.args()?;
        info!("Preprocessing {} with grompp", request.mdp_name);
        self.run(workdir, args)
    }

    fn simulate(&self, workdir: &Path, request: &MdrunRequest) -> Result<(), EngineError> {
        let args = request.args()?;
        info!("Running mdrun for {}", request.name);
        self.run(workdir, args)
    }
}
