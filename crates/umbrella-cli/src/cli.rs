use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use umbrella::core::mdp::Stage;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Paul Bauer",
    version,
    about = "umbrella - set up and run umbrella-sampling windows for a GROMACS free-energy tutorial.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of threads used when windows are processed in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the umbrella window directories and optionally run every stage with GROMACS.
    Run(RunArgs),
    /// Write a single stage parameter (.mdp) file.
    Mdp(MdpArgs),
    /// Write the hand-made topology for the two-pyrimidine system.
    Topology(TopologyArgs),
    /// Report where an executable would be found on PATH.
    Which {
        /// Program name or path to check.
        #[arg(required = true)]
        program: String,
    },
    /// Move a file or directory to the next free #NAME.N# backup name.
    Backup {
        /// Path to back up.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// List the entries of a directory.
    Ls {
        /// Directory to list.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Sampling ---
    /// Number of umbrella windows.
    #[arg(short, long, value_name = "INT")]
    pub windows: Option<usize>,

    /// Distance of the first window, in nm.
    #[arg(long, value_name = "FLOAT")]
    pub min_distance: Option<f64>,

    /// Upper bound of the sampled distance, in nm.
    #[arg(long, value_name = "FLOAT")]
    pub max_distance: Option<f64>,

    // --- Pulling ---
    /// Name of the first pull group in the index file.
    #[arg(long, value_name = "NAME")]
    pub group1: Option<String>,

    /// Name of the second pull group in the index file.
    #[arg(long, value_name = "NAME")]
    pub group2: Option<String>,

    /// Umbrella force constant, in kJ/mol/nm^2.
    #[arg(short = 'k', long, value_name = "FLOAT")]
    pub spring_constant: Option<f64>,

    // --- Paths ---
    /// Directory containing index.ndx, ions.gro and topol.top.
    #[arg(short, long, value_name = "PATH")]
    pub input_dir: Option<PathBuf>,

    /// Directory in which the run-N window directories are created.
    #[arg(short, long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    // --- Execution ---
    /// GROMACS executable to invoke (e.g. gmx_mpi or an absolute path).
    #[arg(long, value_name = "NAME_OR_PATH")]
    pub gmx: Option<String>,

    #[command(flatten)]
    pub mode: RunMode,

    /// Process windows concurrently instead of one after another.
    #[arg(long)]
    pub parallel: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S sampling.windows=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive switches selecting whether GROMACS is invoked.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct RunMode {
    /// Run grompp and mdrun for every stage of every window.
    #[arg(long)]
    pub production: bool,
    /// Only write the window directories and parameter files, even if the config enables production.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `mdp` subcommand.
#[derive(Args, Debug)]
pub struct MdpArgs {
    /// Stage to write: min, min2, eql, eql2, prd (or 0-4).
    #[arg(short, long, value_name = "STAGE")]
    pub stage: Stage,

    /// Umbrella reference distance, in nm.
    #[arg(short, long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub position: f64,

    /// Output file stem; `.mdp` is appended.
    #[arg(short, long, value_name = "STEM")]
    pub output: String,

    /// Directory to write into.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub dir: PathBuf,

    /// Name of the first pull group.
    #[arg(long, value_name = "NAME", default_value = umbrella::core::mdp::DEFAULT_GROUP1_NAME)]
    pub group1: String,

    /// Name of the second pull group.
    #[arg(long, value_name = "NAME", default_value = umbrella::core::mdp::DEFAULT_GROUP2_NAME)]
    pub group2: String,

    /// Umbrella force constant, in kJ/mol/nm^2.
    #[arg(short = 'k', long, value_name = "FLOAT", default_value_t = umbrella::core::mdp::DEFAULT_SPRING_CONSTANT)]
    pub spring_constant: f64,
}

/// Arguments for the `topology` subcommand.
#[derive(Args, Debug)]
pub struct TopologyArgs {
    /// Output topology file.
    #[arg(short, long, value_name = "PATH", default_value = umbrella::core::topology::DEFAULT_TOPOLOGY_NAME)]
    pub output: PathBuf,

    /// Directory prefix for the #include paths (the directory that contains 0-files/).
    /// Defaults to the current working directory.
    #[arg(long, value_name = "DIR")]
    pub include_root: Option<String>,

    /// Back up an existing output file instead of overwriting it.
    #[arg(long)]
    pub backup: bool,
}
