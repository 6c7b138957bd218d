//! # GROMACS Parameter Files
//!
//! Builds and writes the `.mdp` run-parameter files for the five stages each umbrella
//! window goes through. Every stage shares the same non-bonded settings and the same
//! centre-of-mass pull block; the stages differ in integrator, run length, output
//! frequencies and coupling.
//!
//! Files are produced from an [`MdpParameters`] record rather than from text templates,
//! so the shared settings live in exactly one place.

use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_GROUP1_NAME: &str = "PYR1";
pub const DEFAULT_GROUP2_NAME: &str = "PYR2";
pub const DEFAULT_SPRING_CONSTANT: f64 = 5000.0;

const KEY_WIDTH: usize = 25;
const REFERENCE_TEMPERATURE: f64 = 298.15;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StageError {
    #[error("Unrecognized stage kind {0}; expected a value in 0..=4")]
    UnknownKind(u8),

    #[error("Unrecognized stage name '{0}'; expected one of min, min2, eql, eql2, prd or 0..=4")]
    UnknownName(String),
}

#[derive(Debug, Error)]
pub enum MdpError {
    #[error("The name for the mdp file cannot be empty")]
    EmptyFileName,

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One of the five simulation stages run in every umbrella window, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Minimization,
    UnrestrainedMinimization,
    NvtEquilibration,
    NptEquilibration,
    Production,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Minimization,
        Stage::UnrestrainedMinimization,
        Stage::NvtEquilibration,
        Stage::NptEquilibration,
        Stage::Production,
    ];

    /// Short name used as the prefix of every file the stage produces.
    pub fn prefix(self) -> &'static str {
        match self {
            Stage::Minimization => "min",
            Stage::UnrestrainedMinimization => "min2",
            Stage::NvtEquilibration => "eql",
            Stage::NptEquilibration => "eql2",
            Stage::Production => "prd",
        }
    }

    pub fn kind(self) -> u8 {
        self as u8
    }

    /// File stem for this stage in the given window, e.g. `eql2.7`.
    pub fn file_stem(self, window: usize) -> String {
        format!("{}.{}", self.prefix(), window)
    }

    /// The stage whose output this stage starts from.
    pub fn previous(self) -> Option<Stage> {
        match self {
            Stage::Minimization => None,
            Stage::UnrestrainedMinimization => Some(Stage::Minimization),
            Stage::NvtEquilibration => Some(Stage::UnrestrainedMinimization),
            Stage::NptEquilibration => Some(Stage::NvtEquilibration),
            Stage::Production => Some(Stage::NptEquilibration),
        }
    }

    /// Value for `grompp -maxwarn`. Dropping the flexible-water define between the two
    /// minimisations triggers one known grompp warning.
    pub fn max_warnings(self) -> u32 {
        match self {
            Stage::UnrestrainedMinimization => 1,
            _ => 0,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Minimization => "Minimization",
            Stage::UnrestrainedMinimization => "Unrestrained minimization",
            Stage::NvtEquilibration => "NVT equilibration",
            Stage::NptEquilibration => "NPT equilibration",
            Stage::Production => "Production",
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = StageError;

    fn try_from(kind: u8) -> Result<Self, Self::Error> {
        Stage::ALL
            .get(kind as usize)
            .copied()
            .ok_or(StageError::UnknownKind(kind))
    }
}

impl FromStr for Stage {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(stage) = Stage::ALL.iter().find(|st| st.prefix() == s) {
            return Ok(*stage);
        }
        match s.parse::<u8>() {
            Ok(kind) => Stage::try_from(kind),
            Err(_) => Err(StageError::UnknownName(s.to_string())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The pulled coordinate shared by every stage of a window.
#[derive(Debug, Clone, PartialEq)]
pub struct PullSettings {
    pub group1_name: String,
    pub group2_name: String,
    /// Reference distance of the umbrella potential, in nm.
    pub position: f64,
    /// Umbrella force constant, in kJ mol^-1 nm^-2.
    pub spring_constant: f64,
}

impl PullSettings {
    pub fn new(position: f64) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_groups(mut self, group1: impl Into<String>, group2: impl Into<String>) -> Self {
        self.group1_name = group1.into();
        self.group2_name = group2.into();
        self
    }

    pub fn with_spring_constant(mut self, k: f64) -> Self {
        self.spring_constant = k;
        self
    }
}

impl Default for PullSettings {
    fn default() -> Self {
        Self {
            group1_name: DEFAULT_GROUP1_NAME.to_string(),
            group2_name: DEFAULT_GROUP2_NAME.to_string(),
            position: 0.0,
            spring_constant: DEFAULT_SPRING_CONSTANT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrator {
    SteepestDescent,
    LeapFrog,
}

impl Integrator {
    fn as_mdp(self) -> &'static str {
        match self {
            Integrator::SteepestDescent => "steep",
            Integrator::LeapFrog => "md",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thermostat {
    pub tau_t: f64,
    pub ref_t: f64,
    pub chain_length: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Barostat {
    pub tau_p: f64,
    pub compressibility: f64,
    pub ref_p: f64,
}

/// Every parameter written to an `.mdp` file. `None` fields are omitted from the output.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpParameters {
    pub define: Option<&'static str>,
    pub integrator: Integrator,
    /// Time step in ps; only meaningful for dynamics.
    pub dt: Option<f64>,
    pub nsteps: u64,
    pub emtol: Option<f64>,

    pub nstenergy: u64,
    pub nstlog: u64,
    pub nstxout_compressed: u64,

    pub gen_temp: Option<f64>,
    pub continuation: bool,
    pub h_bond_constraints: bool,

    pub rlist: Option<f64>,
    pub rcoulomb: f64,
    pub rvdw: f64,

    pub thermostat: Option<Thermostat>,
    pub barostat: Option<Barostat>,

    pub pull: PullSettings,
}

impl MdpParameters {
    /// Assembles the parameter record for `stage` around the shared pull block.
    pub fn for_stage(stage: Stage, pull: &PullSettings) -> Self {
        let base = Self::base(pull);
        match stage {
            Stage::Minimization => Self {
                define: Some("-DFLEXIBLE"),
                nsteps: 1_000,
                h_bond_constraints: true,
                ..base
            },
            Stage::UnrestrainedMinimization => Self {
                nsteps: 50_000,
                ..base
            },
            Stage::NvtEquilibration => Self {
                gen_temp: Some(REFERENCE_TEMPERATURE),
                nsteps: 50_000,
                ..Self::dynamics(base, 200, 2_000, 10_000)
            },
            Stage::NptEquilibration => Self {
                nsteps: 500_000,
                continuation: true,
                rlist: Some(1.0),
                barostat: Some(Self::parrinello_rahman()),
                ..Self::dynamics(base, 200, 2_000, 10_000)
            },
            Stage::Production => Self {
                nsteps: 2_500_000,
                continuation: true,
                barostat: Some(Self::parrinello_rahman()),
                ..Self::dynamics(base, 5_000, 5_000, 2_000)
            },
        }
    }

    fn base(pull: &PullSettings) -> Self {
        Self {
            define: None,
            integrator: Integrator::SteepestDescent,
            dt: None,
            nsteps: 0,
            emtol: Some(500.0),
            nstenergy: 500,
            nstlog: 500,
            nstxout_compressed: 1_000,
            gen_temp: None,
            continuation: false,
            h_bond_constraints: false,
            rlist: None,
            rcoulomb: 1.0,
            rvdw: 1.0,
            thermostat: None,
            barostat: None,
            pull: pull.clone(),
        }
    }

    fn dynamics(base: Self, nstenergy: u64, nstlog: u64, nstxout_compressed: u64) -> Self {
        Self {
            integrator: Integrator::LeapFrog,
            dt: Some(0.002),
            emtol: None,
            nstenergy,
            nstlog,
            nstxout_compressed,
            h_bond_constraints: true,
            thermostat: Some(Thermostat {
                tau_t: 2.0,
                ref_t: REFERENCE_TEMPERATURE,
                chain_length: 1,
            }),
            ..base
        }
    }

    fn parrinello_rahman() -> Barostat {
        Barostat {
            tau_p: 2.0,
            compressibility: 4.46e-5,
            ref_p: 1.0,
        }
    }

    /// Renders the record as `.mdp` text.
    pub fn render(&self) -> String {
        let mut out = MdpWriter::default();

        if let Some(define) = self.define {
            out.entry("define", define);
        }
        out.entry("integrator", self.integrator.as_mdp());
        if let Some(dt) = self.dt {
            out.entry_with_comment("dt", fmt_real(dt), &timestep(dt));
            out.entry_with_comment("nsteps", self.nsteps, &simulated_time(self.nsteps, dt));
        } else {
            out.entry("nsteps", self.nsteps);
        }
        if let Some(emtol) = self.emtol {
            out.entry("emtol", fmt_real(emtol));
        }

        out.blank();
        out.entry("nstenergy", self.nstenergy);
        out.entry("nstlog", self.nstlog);
        out.entry("nstxout-compressed", self.nstxout_compressed);

        if let Some(gen_temp) = self.gen_temp {
            out.blank();
            out.entry("gen-vel", "yes");
            out.entry("gen-temp", fmt_real(gen_temp));
        }

        if self.continuation || self.h_bond_constraints {
            out.blank();
            if self.continuation {
                out.entry("continuation", "yes");
            }
            if self.h_bond_constraints {
                out.entry("constraint-algorithm", "lincs");
                out.entry("constraints", "h-bonds");
            }
        }

        out.blank();
        out.entry("cutoff-scheme", "Verlet");
        if let Some(rlist) = self.rlist {
            out.entry("rlist", fmt_real(rlist));
        }

        out.blank();
        out.entry("coulombtype", "PME");
        out.entry("rcoulomb", fmt_real(self.rcoulomb));

        out.blank();
        out.entry("vdwtype", "Cut-off");
        out.entry("rvdw", fmt_real(self.rvdw));
        out.entry("DispCorr", "EnerPres");

        if let Some(t) = &self.thermostat {
            out.blank();
            out.entry("tcoupl", "Nose-Hoover");
            out.entry("tc-grps", "System");
            out.entry("tau-t", fmt_real(t.tau_t));
            out.entry("ref-t", fmt_real(t.ref_t));
            out.entry("nhchainlength", t.chain_length);
        }

        if let Some(p) = &self.barostat {
            out.blank();
            out.entry("pcoupl", "Parrinello-Rahman");
            out.entry("tau_p", fmt_real(p.tau_p));
            out.entry("compressibility", fmt_real(p.compressibility));
            out.entry("ref_p", fmt_real(p.ref_p));
        }

        out.blank();
        let pull = &self.pull;
        out.entry("pull", "yes");
        out.entry("pull-ngroups", 2);
        out.entry("pull-group1-name", &pull.group1_name);
        out.entry("pull-group2-name", &pull.group2_name);
        out.entry("pull-ncoords", 1);
        out.entry("pull-coord1-type", "umbrella");
        out.entry("pull-coord1-geometry", "distance");
        out.entry("pull-coord1-groups", "1 2");
        out.entry("pull-coord1-k", fmt_real(pull.spring_constant));
        out.entry("pull-coord1-rate", fmt_real(0.0));
        out.entry("pull-coord1-init", fmt_real(pull.position));
        out.entry("pull-coord1-start", "no");

        out.finish()
    }
}

impl fmt::Display for MdpParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Default)]
struct MdpWriter {
    buf: String,
}

impl MdpWriter {
    fn entry(&mut self, key: &str, value: impl fmt::Display) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.buf, "{:<width$}= {}", key, value, width = KEY_WIDTH);
    }

    fn entry_with_comment(&mut self, key: &str, value: impl fmt::Display, comment: &str) {
        let value = value.to_string();
        let _ = writeln!(
            self.buf,
            "{:<kw$}= {:<10}; {}",
            key,
            value,
            comment,
            kw = KEY_WIDTH
        );
    }

    fn blank(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Shortest round-trip representation that always keeps a decimal point or exponent,
/// e.g. `1.0`, `0.05`, `4.46e-5`.
pub fn fmt_real(value: f64) -> String {
    format!("{:?}", value)
}

fn timestep(dt_ps: f64) -> String {
    let fs = dt_ps * 1000.0;
    if (fs - fs.round()).abs() < 1e-9 {
        format!("{} fs", fs.round() as u64)
    } else {
        format!("{} fs", fmt_real(fs))
    }
}

fn simulated_time(nsteps: u64, dt_ps: f64) -> String {
    let ps = nsteps as f64 * dt_ps;
    if ps >= 1000.0 {
        format!("{:.1} ns", ps / 1000.0)
    } else {
        format!("{} ps", ps.round() as u64)
    }
}

/// Writes the `.mdp` file for `stage` to `<dir>/<stem>.mdp`, replacing any existing file.
///
/// # Errors
///
/// Returns [`MdpError::EmptyFileName`] without touching the filesystem if `stem` is empty,
/// or [`MdpError::Io`] if the file cannot be written.
pub fn write_mdp_file(
    dir: &Path,
    stem: &str,
    stage: Stage,
    pull: &PullSettings,
) -> Result<PathBuf, MdpError> {
    if stem.is_empty() {
        return Err(MdpError::EmptyFileName);
    }
    let path = dir.join(format!("{}.mdp", stem));
    let text = MdpParameters::for_stage(stage, pull).render();
    fs::write(&path, text).map_err(|source| MdpError::Io {
        path: path.clone(),
        source,
    })?;
    debug!("Wrote {} parameters to {:?}", stage.description(), path);
    Ok(path)
}
