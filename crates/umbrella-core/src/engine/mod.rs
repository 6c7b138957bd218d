//! # Engine Module
//!
//! The machinery behind the umbrella-sampling workflow: the validated run configuration,
//! the window geometry along the pulled coordinate, progress reporting, error types, and
//! the runners that hand each stage to the external GROMACS executables.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run parameters and their builder with validation
//! - **Windows** ([`window`]) - Sampling positions and per-window directory naming
//! - **GROMACS** ([`gromacs`]) - `grompp`/`mdrun` command construction and execution
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod config;
pub mod error;
pub mod gromacs;
pub mod progress;
pub mod window;
