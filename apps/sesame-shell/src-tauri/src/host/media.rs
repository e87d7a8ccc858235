//! Microphone access for the voice demo
//!
//! The demo page needs `getUserMedia`. Requests from the primary page's
//! origin are granted without a prompt where the webview exposes a
//! permission hook (WebView2, WebKitGTK). Requests from any other origin are
//! left to the webview's default handling. On macOS, WKWebView asks the
//! user through the system prompt described by `NSMicrophoneUsageDescription`
//! in `Info.plist`.

use tauri::{Url, WebviewWindow};
use tracing::info;

use crate::error::Result;

/// Whether a media request from `requesting_url` comes from the primary origin
pub fn is_primary_origin(primary: &Url, requesting_url: &str) -> bool {
    match Url::parse(requesting_url) {
        Ok(url) => url.origin().is_tuple() && url.origin() == primary.origin(),
        Err(_) => false,
    }
}

/// Grant microphone requests made by `primary`'s origin in `window`
pub fn grant_microphone(window: &WebviewWindow, primary: &Url) -> Result<()> {
    info!(
        "Granting microphone access to {}",
        primary.origin().ascii_serialization()
    );
    install_permission_handler(window, primary.clone())
}

#[cfg(windows)]
fn install_permission_handler(window: &WebviewWindow, primary: Url) -> Result<()> {
    use tracing::{debug, warn};
    use webview2_com::Microsoft::Web::WebView2::Win32::{
        COREWEBVIEW2_PERMISSION_KIND, COREWEBVIEW2_PERMISSION_KIND_MICROPHONE,
        COREWEBVIEW2_PERMISSION_STATE_ALLOW,
    };
    use webview2_com::{take_pwstr, PermissionRequestedEventHandler};
    use windows_core::PWSTR;

    window.with_webview(move |webview| unsafe {
        let core = match webview.controller().CoreWebView2() {
            Ok(core) => core,
            Err(e) => {
                warn!("WebView2 core unavailable, microphone not granted: {}", e);
                return;
            }
        };

        let handler = PermissionRequestedEventHandler::create(Box::new(move |_, args| {
            let Some(args) = args else {
                return Ok(());
            };
            let mut kind = COREWEBVIEW2_PERMISSION_KIND::default();
            args.PermissionKind(&mut kind)?;
            if kind != COREWEBVIEW2_PERMISSION_KIND_MICROPHONE {
                return Ok(());
            }

            let mut uri = PWSTR::null();
            args.Uri(&mut uri)?;
            let uri = take_pwstr(uri);
            if is_primary_origin(&primary, &uri) {
                debug!("Granting microphone to {}", uri);
                args.SetState(COREWEBVIEW2_PERMISSION_STATE_ALLOW)?;
            }
            Ok(())
        }));

        let mut token: i64 = 0;
        if let Err(e) = core.add_PermissionRequested(&handler, &mut token) {
            warn!("Failed to register microphone permission handler: {}", e);
        }
    })?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn install_permission_handler(window: &WebviewWindow, primary: Url) -> Result<()> {
    use tracing::debug;
    use webkit2gtk::glib::prelude::*;
    use webkit2gtk::{PermissionRequestExt, UserMediaPermissionRequest, WebViewExt};

    window.with_webview(move |webview| {
        webview
            .inner()
            .connect_permission_request(move |view, request| {
                if !request.is::<UserMediaPermissionRequest>() {
                    return false;
                }
                let Some(uri) = view.uri() else {
                    return false;
                };
                if !is_primary_origin(&primary, uri.as_str()) {
                    return false;
                }
                debug!("Granting microphone to {}", uri);
                request.allow();
                true
            });
    })?;
    Ok(())
}

#[cfg(not(any(windows, target_os = "linux")))]
fn install_permission_handler(_window: &WebviewWindow, _primary: Url) -> Result<()> {
    tracing::debug!("Microphone access goes through the system prompt on this platform");
    Ok(())
}
