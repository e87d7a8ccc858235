//! Tauri binding of the host window runtime
//!
//! Translates webview callbacks into [`SurfaceEvent`]s for the gate and
//! implements window creation, scheduling and cookie access on top of Tauri.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tauri::webview::{NewWindowFeatures, NewWindowResponse, PageLoadEvent, PageLoadPayload};
use tauri::{AppHandle, Manager, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder, Wry};
use tracing::{error, warn};

use super::{AuthSurface, SurfaceHost, Task};
use crate::app::{ShellGate, PRIMARY_WINDOW_LABEL};
use crate::config::AuthWindowConfig;
use crate::credentials::{CookieRecord, CredentialStore};
use crate::error::{Result, ShellError};
use crate::gate::{SurfaceEvent, SurfaceRef};

/// Creates auth windows next to the primary window
pub struct TauriHost {
    app: AppHandle,
    /// Webview data directory shared by every window (the credential partition)
    data_dir: PathBuf,
    window: AuthWindowConfig,
}

impl TauriHost {
    pub fn new(app: AppHandle, data_dir: PathBuf, window: AuthWindowConfig) -> Self {
        Self {
            app,
            data_dir,
            window,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl SurfaceHost for TauriHost {
    type Surface = TauriAuthSurface;

    fn create_auth_surface(&self, label: &str, url: &str) -> Result<TauriAuthSurface> {
        let parent = self
            .app
            .get_webview_window(PRIMARY_WINDOW_LABEL)
            .ok_or_else(|| ShellError::surface("primary window is not available"))?;
        let url: Url = url
            .parse()
            .map_err(|e| ShellError::surface(format!("invalid auth URL {}: {}", url, e)))?;

        let surface = SurfaceRef::auth(label);
        let window = WebviewWindowBuilder::new(&self.app, label, WebviewUrl::External(url))
            .title(&self.window.title)
            .inner_size(self.window.width, self.window.height)
            .center()
            .data_directory(self.data_dir.clone())
            .parent(&parent)?
            .on_navigation(navigation_hook(&self.app, surface.clone()))
            .on_new_window(new_window_hook(&self.app, surface.clone()))
            .on_page_load(move |window, payload| report_page_load(&window, &surface, &payload))
            .build()?;

        Ok(TauriAuthSurface { window })
    }

    /// Tasks run on the event loop thread, so zero-delay tasks run one at a
    /// time in the order they were scheduled.
    fn run_later(&self, delay: Duration, task: Task) {
        if delay.is_zero() {
            run_on_event_loop(&self.app, task);
            return;
        }

        let app = self.app.clone();
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            run_on_event_loop(&app, task);
        });
    }
}

fn run_on_event_loop(app: &AppHandle, task: Task) {
    if let Err(e) = app.run_on_main_thread(task) {
        error!("Failed to schedule work on the event loop: {}", e);
    }
}

/// An auth window owned by the gate
pub struct TauriAuthSurface {
    window: WebviewWindow,
}

impl AuthSurface for TauriAuthSurface {
    fn label(&self) -> &str {
        self.window.label()
    }

    fn close(&self) -> Result<()> {
        self.window.close()?;
        Ok(())
    }
}

/// Cookie jar of a window's credential partition
pub struct WebviewCookieStore {
    window: WebviewWindow,
}

impl WebviewCookieStore {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl CredentialStore for WebviewCookieStore {
    async fn cookies(&self) -> Result<Vec<CookieRecord>> {
        // The cookie API can deadlock when called on the main thread on Windows
        let window = self.window.clone();
        let cookies = tauri::async_runtime::spawn_blocking(move || window.cookies()).await??;

        Ok(cookies
            .iter()
            .map(|cookie| CookieRecord::new(cookie.domain().unwrap_or_default(), cookie.name()))
            .collect())
    }
}

/// Deliver an event to the managed gate.
///
/// `fallback` is returned when the gate is not available; request events
/// pass `false` so that navigation stays closed.
pub(crate) fn dispatch(
    app: &AppHandle,
    surface: SurfaceRef,
    event: SurfaceEvent,
    fallback: bool,
) -> bool {
    match app.try_state::<Arc<ShellGate>>() {
        Some(gate) => gate.handle(surface, event),
        None => {
            warn!("Navigation gate not available, dropping {:?} from {}", event, surface);
            fallback
        }
    }
}

pub(crate) fn navigation_hook(
    app: &AppHandle,
    surface: SurfaceRef,
) -> impl Fn(&Url) -> bool + Send + 'static {
    let app = app.clone();
    move |url: &Url| {
        let event = SurfaceEvent::NavigationRequested {
            url: url.to_string(),
        };
        dispatch(&app, surface.clone(), event, false)
    }
}

pub(crate) fn new_window_hook(
    app: &AppHandle,
    surface: SurfaceRef,
) -> impl Fn(Url, NewWindowFeatures) -> NewWindowResponse<Wry> + Send + Sync + 'static {
    let app = app.clone();
    move |url: Url, _features: NewWindowFeatures| {
        let event = SurfaceEvent::WindowOpenRequested {
            url: url.to_string(),
        };
        if dispatch(&app, surface.clone(), event, false) {
            NewWindowResponse::Allow
        } else {
            NewWindowResponse::Deny
        }
    }
}

/// Report a finished page load. Webviews signal failed loads by ending on a
/// non-web page (`about:blank`, `chrome-error://`), which is reported as
/// `LoadFailed`.
pub(crate) fn report_page_load(
    window: &WebviewWindow,
    surface: &SurfaceRef,
    payload: &PageLoadPayload<'_>,
) {
    if !matches!(payload.event(), PageLoadEvent::Finished) {
        return;
    }

    let url = payload.url();
    let event = if matches!(url.scheme(), "http" | "https") {
        SurfaceEvent::NavigationCompleted {
            url: url.to_string(),
        }
    } else {
        SurfaceEvent::LoadFailed {
            url: url.to_string(),
            reason: format!("webview ended on a {} page", url.scheme()),
        }
    };
    dispatch(window.app_handle(), surface.clone(), event, true);
}
