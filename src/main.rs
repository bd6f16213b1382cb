//! # SOA Recipe Demo
//!
//! Loads the config files given on the command line (or the defaults under `config/`),
//! builds the declared services and runs their lifecycle.

use std::path::PathBuf;

use clap::Parser;
use soa_recipe::lifecycle::tracing::setup_tracing;
use soa_recipe::lifecycle::{Application, ApplicationConfig};
use soa_recipe::services;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "soa-recipe")]
#[command(about = "Builds and launches the services declared in layered config files")]
struct Cli {
    /// Config files to merge, in order. Missing files are skipped.
    #[arg(default_values = ["config/app.global.json", "config/app.local.json"])]
    files: Vec<PathBuf>,

    /// Treat unknown lookups and duplicate registrations as errors from the start
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    setup_tracing();
    info!(files = ?cli.files, "Starting application");

    let mut app = Application::new();
    if cli.strict {
        app.registry().set_strict_mode(true);
    }
    services::register_all(app.catalog_mut());
    app.configure_with(ApplicationConfig::from_files(cli.files));

    if let Err(e) = app.start() {
        error!(error = %e, "Application failed to start");
        return Err(e.to_string());
    }

    info!(services = ?app.launched_services(), "Application started");
    Ok(())
}
