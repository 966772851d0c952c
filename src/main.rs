//! Slouch detector: webcam posture monitoring with a live-trained classifier.

use anyhow::Result;
use clap::Parser;
use log::info;
use slouch_detector::{app::SlouchApp, cli::Args, config::{Config, EXAMPLE_CONFIG}};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Slouch Detector");

    // Load configuration if provided
    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line flags override the file
    let app_config = args.app_config(config);
    app_config.config.validate()?;

    // Create and run application
    let mut app = SlouchApp::new(app_config)?;
    app.run()?;

    Ok(())
}
