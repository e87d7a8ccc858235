//! Host window runtime seam
//!
//! The navigation gate only talks to the windowing layer through these
//! traits. `runtime` holds the production binding; tests use a recording fake.

pub mod media;
pub mod runtime;

use std::time::Duration;

use crate::error::Result;

pub use runtime::{TauriAuthSurface, TauriHost, WebviewCookieStore};

/// A unit of deferred work handed to the host runtime
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Label prefix of authentication windows
pub const AUTH_LABEL_PREFIX: &str = "auth-";

/// A live authentication window
pub trait AuthSurface: Send + 'static {
    /// Window label, unique for the life of the process
    fn label(&self) -> &str;

    /// Close the window. Closing an already closed window is not an error
    /// the gate cares about; it only logs the result.
    fn close(&self) -> Result<()>;
}

/// Window creation and scheduling provided by the host runtime
pub trait SurfaceHost: Send + Sync + 'static {
    type Surface: AuthSurface;

    /// Create a modal auth window on `url`, parented to the primary window and
    /// sharing its credential partition.
    fn create_auth_surface(&self, label: &str, url: &str) -> Result<Self::Surface>;

    /// Run `task` after `delay`. Fire-and-forget; a zero delay runs it on the
    /// next turn of the runtime rather than inline. The gate does not rely on
    /// tasks running one at a time or in order.
    fn run_later(&self, delay: Duration, task: Task);
}

/// Generate a fresh auth window label
pub fn new_auth_label() -> String {
    format!("{}{}", AUTH_LABEL_PREFIX, uuid::Uuid::new_v4().simple())
}

/// Whether a window label belongs to an auth surface
pub fn is_auth_label(label: &str) -> bool {
    label.starts_with(AUTH_LABEL_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_labels_are_unique_and_recognized() {
        let a = new_auth_label();
        let b = new_auth_label();
        assert_ne!(a, b);
        assert!(is_auth_label(&a));
        assert!(!is_auth_label("main"));
    }

    #[test]
    fn test_auth_labels_use_window_safe_characters() {
        let label = new_auth_label();
        assert!(label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }
}
