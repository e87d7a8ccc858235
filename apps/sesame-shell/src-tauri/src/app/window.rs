//! Primary window construction

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tauri::webview::PageLoadEvent;
use tauri::{App, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tracing::{info, warn};

use super::ShellGate;
use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::gate::SurfaceRef;
use crate::host::media;
use crate::host::runtime::{navigation_hook, new_window_hook, report_page_load};
use crate::patches;

pub const PRIMARY_WINDOW_LABEL: &str = "main";

/// Create the primary window on the external target page.
///
/// The window starts hidden and is revealed `showDelayMs` after the first
/// page load, so the user never sees the page restyle itself.
pub fn create_primary_window(
    app: &App,
    config: &ShellConfig,
    gate: &ShellGate,
) -> Result<WebviewWindow> {
    let url: Url = config.primary_url.parse().map_err(|e| {
        ShellError::config(format!("invalid primaryUrl {}: {}", config.primary_url, e))
    })?;
    let script = patches::init_script(&config.patches)?;
    let handle = app.handle();

    let shown = AtomicBool::new(false);
    let show_delay = config.show_delay();

    info!("Loading URL: {}", url);
    let page = WebviewUrl::External(url.clone());
    let window = WebviewWindowBuilder::new(app, PRIMARY_WINDOW_LABEL, page)
        .title(&config.window.title)
        .inner_size(config.window.width, config.window.height)
        .resizable(config.window.resizable)
        .maximizable(false)
        .decorations(config.window.decorations)
        .center()
        .visible(false)
        .data_directory(gate.host().data_dir().to_path_buf())
        .initialization_script(&script)
        .on_navigation(navigation_hook(handle, SurfaceRef::Primary))
        .on_new_window(new_window_hook(handle, SurfaceRef::Primary))
        .on_page_load(move |window, payload| {
            report_page_load(&window, &SurfaceRef::Primary, &payload);
            let finished = matches!(payload.event(), PageLoadEvent::Finished);
            if finished && !shown.swap(true, Ordering::SeqCst) {
                reveal_after(window, show_delay);
            }
        })
        .build()?;

    if config.patches.grant_microphone {
        if let Err(e) = media::grant_microphone(&window, &url) {
            warn!("Failed to install microphone permission handler: {}", e);
        }
    }

    Ok(window)
}

fn reveal_after(window: WebviewWindow, delay: Duration) {
    info!("Window ready to show, applying {:?} delay", delay);
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = window.show().and_then(|_| window.set_focus()) {
            warn!("Failed to show primary window: {}", e);
        }
    });
}
