//! Hello triangle bootstrap
//!
//! Opens an 800x600 window, brings up a Vulkan instance and logical device,
//! and waits for the window to close. An optional `.toml` or `.ron` config
//! file can be passed as the first argument.

use std::process::ExitCode;
use vk_bootstrap::foundation::logging;
use vk_bootstrap::prelude::*;

fn load_config() -> Result<BootstrapConfig, BootstrapError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            Ok(BootstrapConfig::load_from_file(&path)?)
        }
        None => Ok(BootstrapConfig::default()),
    }
}

fn run() -> Result<(), BootstrapError> {
    let config = load_config()?;
    log::info!(
        "Starting \"{}\" ({}x{}, validation {})",
        config.application_name,
        config.window_width,
        config.window_height,
        if config.validation_enabled() { "on" } else { "off" }
    );

    let mut app = HelloApplication::new(config)?;
    app.run();
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => {
            log::info!("Shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Initialization failed: {:?}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
