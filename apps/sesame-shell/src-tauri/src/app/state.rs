//! Application state initialization
//!
//! The navigation gate is the only managed state. Host callbacks reach it
//! through `AppHandle::try_state`.

use std::sync::Arc;
use tauri::{App, Manager};
use tracing::{info, warn};

use crate::config::ShellConfig;
use crate::error::Result;
use crate::gate::NavigationGate;
use crate::host::{TauriHost, WebviewCookieStore};

use super::PRIMARY_WINDOW_LABEL;

/// The gate as wired to the Tauri runtime
pub type ShellGate = NavigationGate<TauriHost>;

/// Build the gate and register it with the app
pub fn init_state(app: &App, config: &ShellConfig) -> Result<Arc<ShellGate>> {
    let data_dir = config.partition_dir()?;
    info!("Using credential partition {:?}", data_dir);

    let host = TauriHost::new(app.handle().clone(), data_dir, config.auth_window.clone());
    let gate = Arc::new(ShellGate::new(config.gate_config(), host));
    app.manage(Arc::clone(&gate));

    Ok(gate)
}

/// Run startup tasks that depend on the primary window
pub fn run_startup_tasks(app: &App, gate: &Arc<ShellGate>) {
    let Some(window) = app.get_webview_window(PRIMARY_WINDOW_LABEL) else {
        warn!("Primary window missing, skipping credential check");
        return;
    };

    // Informational only; the primary page loads either way
    let gate = Arc::clone(gate);
    tauri::async_runtime::spawn(async move {
        let store = WebviewCookieStore::new(window);
        let found = gate.check_authenticated(&store).await;
        info!("Authentication cookies found: {}", found);
    });
}
