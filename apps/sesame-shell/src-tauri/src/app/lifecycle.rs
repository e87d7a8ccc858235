//! Application lifecycle event handling
//!
//! This module handles window events and application run events.

use std::sync::Arc;
use tauri::{AppHandle, Manager, RunEvent, WindowEvent};
use tracing::info;

use super::{ShellGate, PRIMARY_WINDOW_LABEL};
use crate::gate::{SurfaceEvent, SurfaceRef};
use crate::host::is_auth_label;

/// Handle window events
///
/// Destroyed windows are reported to the gate so it never holds a handle to
/// a window the user already closed.
pub fn handle_window_event(window: &tauri::Window, event: &WindowEvent) {
    if !matches!(event, WindowEvent::Destroyed) {
        return;
    }

    let label = window.label();
    let surface = if is_auth_label(label) {
        SurfaceRef::auth(label)
    } else if label == PRIMARY_WINDOW_LABEL {
        SurfaceRef::Primary
    } else {
        return;
    };

    if let Some(gate) = window.try_state::<Arc<ShellGate>>() {
        gate.handle(surface, SurfaceEvent::Closed);
    }
}

/// Handle application run events
pub fn handle_run_event(_app: &AppHandle, event: RunEvent) {
    if let RunEvent::Exit = event {
        info!("Application quitting.");
    }
}
