//! Navigation classification
//!
//! A pure function of the intent and the gate configuration. The policy is
//! default-closed: anything that is neither the primary document nor an
//! authentication handler is denied.

use super::types::{GateConfig, GateDecision, IntentKind, NavigationIntent};

/// Classify a navigation or window-open intent
pub fn classify(intent: &NavigationIntent, config: &GateConfig) -> GateDecision {
    let url = intent.target_url.as_str();

    if is_auth_url(url, &config.auth_url_prefix) {
        return GateDecision::RouteToAuth;
    }

    // No secondary windows other than the auth surface
    if intent.kind == IntentKind::OpenWindow {
        return GateDecision::Deny;
    }

    if is_primary_url(url, &config.primary_url_prefix) {
        GateDecision::Allow
    } else {
        GateDecision::Deny
    }
}

fn is_auth_url(url: &str, auth_prefix: &str) -> bool {
    !auth_prefix.is_empty() && url.starts_with(auth_prefix)
}

fn is_primary_url(url: &str, primary: &str) -> bool {
    if primary.is_empty() {
        return false;
    }
    url == primary || url.starts_with(document_url(primary))
}

/// The primary URL without its fragment
fn document_url(url: &str) -> &str {
    url.split_once('#').map_or(url, |(document, _)| document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialPolicy;
    use crate::gate::types::SurfaceRef;
    use std::time::Duration;

    fn config(primary: &str, auth: &str) -> GateConfig {
        GateConfig {
            primary_url_prefix: primary.to_string(),
            auth_url_prefix: auth.to_string(),
            login_complete_url: "https://example.com/login".to_string(),
            grace_delay: Duration::from_millis(2000),
            credentials: CredentialPolicy::default(),
        }
    }

    fn example() -> GateConfig {
        config(
            "https://example.com/research/demo#demo",
            "https://example.com/__/auth/handler",
        )
    }

    fn navigate(url: &str) -> NavigationIntent {
        NavigationIntent::navigate(url, SurfaceRef::Primary)
    }

    fn open_window(url: &str) -> NavigationIntent {
        NavigationIntent::open_window(url, SurfaceRef::Primary)
    }

    #[test]
    fn test_primary_url_is_allowed() {
        let decision = classify(&navigate("https://example.com/research/demo#demo"), &example());
        assert_eq!(decision, GateDecision::Allow);
    }

    #[test]
    fn test_fragment_navigation_is_allowed() {
        let cfg = example();
        for url in [
            "https://example.com/research/demo",
            "https://example.com/research/demo#",
            "https://example.com/research/demo#team",
            "https://example.com/research/demo?ref=1#demo",
        ] {
            assert_eq!(classify(&navigate(url), &cfg), GateDecision::Allow, "{}", url);
        }
    }

    #[test]
    fn test_prefix_without_fragment_allows_fragment_suffix() {
        let cfg = config("https://example.com/app", "https://example.com/__/auth/handler");
        assert_eq!(
            classify(&navigate("https://example.com/app#settings"), &cfg),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_auth_url_routes_to_auth_for_any_kind() {
        let cfg = example();
        let url = "https://example.com/__/auth/handler?x=1";
        assert_eq!(classify(&navigate(url), &cfg), GateDecision::RouteToAuth);
        assert_eq!(classify(&open_window(url), &cfg), GateDecision::RouteToAuth);
    }

    #[test]
    fn test_open_window_is_denied_unless_auth() {
        let cfg = example();
        assert_eq!(classify(&open_window("https://evil.example/"), &cfg), GateDecision::Deny);
        // Even the primary page may not be opened in a second window
        assert_eq!(
            classify(&open_window("https://example.com/research/demo#demo"), &cfg),
            GateDecision::Deny
        );
    }

    #[test]
    fn test_other_navigation_is_denied() {
        let cfg = example();
        for url in [
            "https://evil.example/",
            "https://example.com/",
            "https://example.com/research",
            "http://example.com/research/demo#demo",
            "file:///etc/passwd",
            "",
        ] {
            assert_eq!(classify(&navigate(url), &cfg), GateDecision::Deny, "{:?}", url);
        }
    }

    #[test]
    fn test_empty_auth_prefix_never_routes() {
        let cfg = config("https://example.com/research/demo#demo", "");
        assert_eq!(
            classify(&navigate("https://evil.example/"), &cfg),
            GateDecision::Deny
        );
        assert_eq!(
            classify(&open_window("https://evil.example/"), &cfg),
            GateDecision::Deny
        );
    }

    #[test]
    fn test_only_allow_permits_default() {
        assert!(GateDecision::Allow.permits_default());
        assert!(!GateDecision::RouteToAuth.permits_default());
        assert!(!GateDecision::Deny.permits_default());
    }
}
