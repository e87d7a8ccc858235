//! Types shared by the navigation gate and its host bindings

use std::fmt;
use std::time::Duration;

use crate::credentials::CredentialPolicy;

/// Which content surface raised an event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceRef {
    /// The window showing the externally hosted target page
    Primary,
    /// The authentication window, identified by its window label
    Auth(String),
}

impl SurfaceRef {
    pub fn auth(label: impl Into<String>) -> Self {
        Self::Auth(label.into())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl fmt::Display for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Auth(label) => write!(f, "auth:{}", label),
        }
    }
}

/// How the page asked to leave its current document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Navigate,
    OpenWindow,
}

/// A single navigation or window-open request from a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub target_url: String,
    pub triggering_surface: SurfaceRef,
    pub kind: IntentKind,
}

impl NavigationIntent {
    pub fn navigate(target_url: impl Into<String>, surface: SurfaceRef) -> Self {
        Self {
            target_url: target_url.into(),
            triggering_surface: surface,
            kind: IntentKind::Navigate,
        }
    }

    pub fn open_window(target_url: impl Into<String>, surface: SurfaceRef) -> Self {
        Self {
            target_url: target_url.into(),
            triggering_surface: surface,
            kind: IntentKind::OpenWindow,
        }
    }
}

/// Outcome of classifying a [`NavigationIntent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the host perform the default navigation
    Allow,
    /// Cancel the default action and open the target in the auth surface
    RouteToAuth,
    /// Cancel the default action silently
    Deny,
}

impl GateDecision {
    /// Whether the host should let its default action proceed
    pub fn permits_default(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Events the host window runtime reports for a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Cancelable top-level navigation
    NavigationRequested { url: String },
    /// Cancelable `window.open` / `target=_blank` request
    WindowOpenRequested { url: String },
    /// A document finished loading
    NavigationCompleted { url: String },
    /// A document failed to load
    LoadFailed { url: String, reason: String },
    /// The surface's window was destroyed
    Closed,
}

/// Lifecycle phase of the auth surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    NoAuthSurface,
    Open,
    /// Login completed; teardown is armed and waiting for the grace delay
    Closing,
}

/// Immutable gate configuration, fixed at startup
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// The allow-listed destination. Same-document fragment navigation is allowed.
    pub primary_url_prefix: String,
    /// Targets starting with this prefix are opened in the auth surface
    pub auth_url_prefix: String,
    /// Substring of the auth surface URL that signals a completed login
    pub login_complete_url: String,
    /// Wait between login completion and auth surface teardown
    pub grace_delay: Duration,
    pub credentials: CredentialPolicy,
}
