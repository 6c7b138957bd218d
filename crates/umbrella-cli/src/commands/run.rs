use crate::cli::RunArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use umbrella::engine::gromacs::GmxEngine;
use umbrella::engine::progress::ProgressReporter;
use umbrella::workflows::{self, umbrella::UmbrellaReport};
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;

    let engine = GmxEngine::new(config.gmx_executable.clone());
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    if config.production {
        println!(
            "Running {} umbrella windows with '{}'...",
            config.sampling.windows,
            engine.executable()
        );
    } else {
        println!(
            "Preparing {} umbrella windows (parameter files only)...",
            config.sampling.windows
        );
    }
    info!("Invoking the umbrella sampling workflow...");

    let report = workflows::umbrella::run(&config, &engine, &reporter)?;
    print_summary(&report);

    Ok(())
}

fn print_summary(report: &UmbrellaReport) {
    for backup in report.backups() {
        println!("  Backed up previous output to {}", backup.display());
    }
    for window in &report.windows {
        println!(
            "  {:<8} {:>8.4} nm  {}",
            window.window.dir_name(),
            window.window.position,
            window.directory.display()
        );
    }
    println!("✓ {} windows written.", report.windows.len());
}
