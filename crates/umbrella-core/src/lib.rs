//! # umbrella
//!
//! A small library for preparing and driving umbrella-sampling free-energy calculations
//! with GROMACS. It lays out one working directory per sampling window along a distance
//! reaction coordinate, writes the stage-specific `.mdp` parameter files for each window,
//! and optionally chains `gmx grompp` / `gmx mdrun` through the five simulation stages.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: numbered backups, executable
//!   lookup, directory listing, and the `.mdp` and topology file writers.
//!
//! - **[`engine`]: The Machinery.** The validated run configuration, error types, progress
//!   reporting, window geometry, and the runners that invoke the external GROMACS tools.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the complete
//!   umbrella-sampling pipeline.
//!
//! No function in this crate changes the process working directory. Every path is passed
//! explicitly and child processes are started inside their window directory.

pub mod core;
pub mod engine;
pub mod workflows;
