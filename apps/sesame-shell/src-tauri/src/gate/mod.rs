//! Navigation gate
//!
//! The single authority over every navigation and window-open request raised
//! by the primary surface and the auth surface. It also owns the one auth
//! surface allowed to exist at a time.
//!
//! ```text
//! NoAuthSurface --RouteToAuth--> Open
//! Open --login complete--> Closing --grace delay--> NoAuthSurface
//! Open --closed by user--> NoAuthSurface
//! Open | Closing --RouteToAuth--> old surface closed, Open with the new URL
//! ```
//!
//! All host calls are made with the state lock released, so host callbacks
//! that re-enter the gate (window destroyed, page loaded) never block on it.
//! Auth opens are serialized on a separate lock and stamped with the order
//! their intents arrived in: an open that runs after a newer one is dropped,
//! whatever order the host happens to run the deferred work in.

pub mod policy;
pub mod types;

pub use policy::classify;
pub use types::{
    AuthPhase, GateConfig, GateDecision, IntentKind, NavigationIntent, SurfaceEvent, SurfaceRef,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::credentials::{self, CredentialStore};
use crate::host::{new_auth_label, AuthSurface, SurfaceHost};

enum AuthState<S> {
    NoAuthSurface,
    Open(S),
    Closing(S),
}

impl<S: AuthSurface> AuthState<S> {
    fn surface(&self) -> Option<&S> {
        match self {
            AuthState::Open(surface) | AuthState::Closing(surface) => Some(surface),
            AuthState::NoAuthSurface => None,
        }
    }

    fn holds(&self, label: &str) -> bool {
        self.surface().is_some_and(|surface| surface.label() == label)
    }

    fn phase(&self) -> AuthPhase {
        match self {
            AuthState::NoAuthSurface => AuthPhase::NoAuthSurface,
            AuthState::Open(_) => AuthPhase::Open,
            AuthState::Closing(_) => AuthPhase::Closing,
        }
    }

    /// Move to `next`, returning the surface that was held before
    fn replace(&mut self, next: AuthState<S>) -> Option<S> {
        match std::mem::replace(self, next) {
            AuthState::Open(surface) | AuthState::Closing(surface) => Some(surface),
            AuthState::NoAuthSurface => None,
        }
    }

    fn take(&mut self) -> Option<S> {
        self.replace(AuthState::NoAuthSurface)
    }
}

/// Navigation policy and auth surface supervisor
pub struct NavigationGate<H: SurfaceHost> {
    config: GateConfig,
    host: H,
    auth: Mutex<AuthState<H::Surface>>,
    /// Sequence number handed to the next auth intent
    next_intent: AtomicU64,
    /// Held for a whole open; guards the sequence number of the last intent served
    opening: Mutex<u64>,
}

impl<H: SurfaceHost> NavigationGate<H> {
    pub fn new(config: GateConfig, host: H) -> Self {
        Self {
            config,
            host,
            auth: Mutex::new(AuthState::NoAuthSurface),
            next_intent: AtomicU64::new(0),
            opening: Mutex::new(0),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn phase(&self) -> AuthPhase {
        self.lock_auth().phase()
    }

    /// Label of the live auth surface, if any
    pub fn active_surface_label(&self) -> Option<String> {
        self.lock_auth()
            .surface()
            .map(|surface| surface.label().to_string())
    }

    pub fn classify(&self, intent: &NavigationIntent) -> GateDecision {
        classify(intent, &self.config)
    }

    /// Entry point for host runtime events.
    ///
    /// Returns whether the host should let its default action proceed. Only
    /// meaningful for the cancelable request events; notifications always
    /// return `true`.
    pub fn handle(self: &Arc<Self>, surface: SurfaceRef, event: SurfaceEvent) -> bool {
        match event {
            SurfaceEvent::NavigationRequested { url } => self
                .on_intent(NavigationIntent::navigate(url, surface))
                .permits_default(),
            SurfaceEvent::WindowOpenRequested { url } => self
                .on_intent(NavigationIntent::open_window(url, surface))
                .permits_default(),
            SurfaceEvent::NavigationCompleted { url } => {
                match surface {
                    SurfaceRef::Auth(label) => {
                        self.on_auth_surface_navigated(&label, &url);
                    }
                    SurfaceRef::Primary => debug!("Primary page finished loading: {}", url),
                }
                true
            }
            SurfaceEvent::LoadFailed { url, reason } => {
                match surface {
                    SurfaceRef::Primary => {
                        error!("Failed to load primary page {}: {}", url, reason)
                    }
                    SurfaceRef::Auth(label) => {
                        warn!("Auth window {} failed to load {}: {}", label, url, reason)
                    }
                }
                true
            }
            SurfaceEvent::Closed => {
                match surface {
                    SurfaceRef::Auth(label) => self.on_auth_surface_closed(&label),
                    SurfaceRef::Primary => info!("Primary window closed"),
                }
                true
            }
        }
    }

    /// Apply the policy to one intent.
    ///
    /// `RouteToAuth` schedules the auth surface on the host instead of
    /// creating it inline: intents arrive inside webview callbacks, where
    /// building another webview is not safe on every platform.
    pub fn on_intent(self: &Arc<Self>, intent: NavigationIntent) -> GateDecision {
        // The login flow has to be free to visit identity providers
        if intent.triggering_surface.is_auth() && intent.kind == IntentKind::Navigate {
            debug!("Allowing auth window navigation to {}", intent.target_url);
            return GateDecision::Allow;
        }

        let decision = self.classify(&intent);
        match decision {
            GateDecision::Allow => {
                debug!(surface = %intent.triggering_surface, "Allowing navigation to {}", intent.target_url)
            }
            GateDecision::Deny => {
                info!(
                    surface = %intent.triggering_surface,
                    "Preventing {:?} to {}", intent.kind, intent.target_url
                )
            }
            GateDecision::RouteToAuth => {
                info!("Detected auth URL: {}", intent.target_url);
                let gate = Arc::clone(self);
                let url = intent.target_url;
                let seq = self.next_intent_seq();
                self.host.run_later(
                    Duration::ZERO,
                    Box::new(move || {
                        gate.open_in_order(seq, &url);
                    }),
                );
            }
        }
        decision
    }

    /// Open `url` in a fresh auth surface, closing any existing one first.
    ///
    /// Returns the new surface's label, or `None` when the host could not
    /// create it (the gate then stays at `NoAuthSurface`) or a newer login
    /// was already opened.
    pub fn open_auth_surface(&self, url: &str) -> Option<String> {
        self.open_in_order(self.next_intent_seq(), url)
    }

    /// Open the surface for auth intent `seq` unless a later intent was
    /// already served.
    fn open_in_order(&self, seq: u64, url: &str) -> Option<String> {
        let mut served = self.opening.lock().unwrap_or_else(PoisonError::into_inner);
        if seq <= *served {
            debug!("Skipping auth URL {}, a newer login is already open", url);
            return None;
        }
        *served = seq;

        let previous = self.lock_auth().take();
        if let Some(previous) = previous {
            info!("Replacing auth window {}", previous.label());
            close_surface(&previous);
        }

        let label = new_auth_label();
        let surface = match self.host.create_auth_surface(&label, url) {
            Ok(surface) => surface,
            Err(e) => {
                error!("Failed to create auth window for {}: {}", url, e);
                return None;
            }
        };
        info!("Auth window {} opened with URL: {}", label, url);

        // Only an open can fill the slot, and opens hold `opening`
        let stale = self.lock_auth().replace(AuthState::Open(surface));
        debug_assert!(stale.is_none(), "two auth windows were live at once");
        if let Some(stale) = stale {
            error!("Auth window {} was still live, closing it", stale.label());
            close_surface(&stale);
        }
        Some(label)
    }

    /// React to a finished load in the auth surface.
    ///
    /// Returns `true` when the URL signals a completed login and teardown has
    /// been armed.
    pub fn on_auth_surface_navigated(self: &Arc<Self>, label: &str, url: &str) -> bool {
        let marker = &self.config.login_complete_url;
        if marker.is_empty() || !url.contains(marker.as_str()) {
            debug!("Auth window {} at {}", label, url);
            return false;
        }

        {
            let mut auth = self.lock_auth();
            match std::mem::replace(&mut *auth, AuthState::NoAuthSurface) {
                AuthState::Open(surface) if surface.label() == label => {
                    *auth = AuthState::Closing(surface);
                }
                other => {
                    *auth = other;
                    debug!("Ignoring login completion from auth window {}", label);
                    return false;
                }
            }
        }

        info!(
            "Authentication completed, closing auth window {} in {:?}",
            label, self.config.grace_delay
        );
        let gate = Arc::clone(self);
        let label = label.to_string();
        self.host.run_later(
            self.config.grace_delay,
            Box::new(move || gate.finish_teardown(&label)),
        );
        true
    }

    /// Close the auth surface `label` if it is still the live one.
    ///
    /// Runs when the grace delay elapses. The user may have closed the
    /// window or a new login may have replaced it in the meantime, so this
    /// is a no-op for any label that is no longer held.
    pub fn finish_teardown(&self, label: &str) {
        let surface = {
            let mut auth = self.lock_auth();
            if !auth.holds(label) {
                debug!("Auth window {} already gone, nothing to tear down", label);
                return;
            }
            auth.take()
        };

        if let Some(surface) = surface {
            close_surface(&surface);
            info!("Auth window {} closed after login", label);
        }
    }

    /// The host reports that auth window `label` is gone.
    ///
    /// Clears the handle if it refers to that window. Safe to call any number
    /// of times.
    pub fn on_auth_surface_closed(&self, label: &str) {
        let mut auth = self.lock_auth();
        if auth.holds(label) {
            auth.take();
            info!("Auth window {} closed", label);
        } else {
            debug!("Ignoring close of auth window {} (not the live surface)", label);
        }
    }

    /// Informational session check. Never gates loading of the primary page.
    pub async fn check_authenticated<S>(&self, store: &S) -> bool
    where
        S: CredentialStore + ?Sized,
    {
        credentials::check_authenticated(store, &self.config.credentials).await
    }

    fn next_intent_seq(&self) -> u64 {
        self.next_intent.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_auth(&self) -> MutexGuard<'_, AuthState<H::Surface>> {
        self.auth.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn close_surface<S: AuthSurface>(surface: &S) {
    if let Err(e) = surface.close() {
        warn!("Failed to close auth window {}: {}", surface.label(), e);
    }
}
