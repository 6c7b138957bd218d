//! # Workflows Module
//!
//! High-level entry points that run a complete procedure from validated configuration to
//! files on disk.
//!
//! - **Umbrella Sampling** ([`umbrella`]) - Lays out the sampling windows along the pulled
//!   distance and, in production mode, drives every window through minimisation,
//!   equilibration and production with GROMACS.

pub mod umbrella;
