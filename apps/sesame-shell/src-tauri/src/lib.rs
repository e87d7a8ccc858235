//! Sesame shell - a desktop window around the Sesame voice demo
//!
//! This is the main library entry point that sets up and runs the Tauri application.

pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod host;
pub mod logging;
pub mod patches;

use std::path::PathBuf;

use app::{handle_run_event, handle_window_event};
use config::ShellConfig;

/// Startup options collected from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Config file to read instead of the per-user default
    pub config_path: Option<PathBuf>,
    /// Overrides `primaryUrl` from the config file
    pub primary_url: Option<String>,
}

/// Run the application
pub fn run(options: RunOptions) {
    // Initialize logging
    logging::init();
    tracing::info!("Starting Sesame shell");

    let config = resolve_config(&options);

    tauri::Builder::default()
        .enable_macos_default_menu(false)
        .setup(move |app| {
            let gate = app::init_state(app, &config)?;
            app::create_primary_window(app, &config, &gate)?;
            app::run_startup_tasks(app, &gate);
            Ok(())
        })
        .on_window_event(handle_window_event)
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(handle_run_event);
}

/// Load the config file and apply command line overrides.
///
/// A broken config never stops the shell: it is logged and the built-in
/// defaults are used instead.
fn resolve_config(options: &RunOptions) -> ShellConfig {
    let mut config = match config::load(options.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config, using defaults: {}", e);
            ShellConfig::default()
        }
    };

    if let Some(url) = &options.primary_url {
        let candidate = ShellConfig {
            primary_url: url.clone(),
            ..config.clone()
        };
        match candidate.validate() {
            Ok(()) => config = candidate,
            Err(e) => tracing::error!("Ignoring --url override: {}", e),
        }
    }

    config
}
