pub mod files;
pub mod mdp;
pub mod run;
pub mod topology;
