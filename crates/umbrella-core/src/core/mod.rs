//! Stateless building blocks shared by the engine and the workflows.

pub mod fs;
pub mod mdp;
pub mod topology;
