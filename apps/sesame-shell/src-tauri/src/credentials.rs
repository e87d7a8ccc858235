//! Informational session check against the shared cookie jar
//!
//! The shell never writes credentials. It only asks the webview's cookie
//! store whether a session for the primary site is present, and treats any
//! failure as "not authenticated".

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

/// The parts of a cookie the check looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub domain: String,
    pub name: String,
}

impl CookieRecord {
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }
}

/// Read-only view of a credential partition's cookies
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn cookies(&self) -> Result<Vec<CookieRecord>>;
}

/// Which cookies count as a session
#[derive(Debug, Clone)]
pub struct CredentialPolicy {
    /// Substring the cookie domain must contain
    pub cookie_domain: String,
    /// Substrings, any of which the lower-cased cookie name must contain
    pub name_markers: Vec<String>,
    pub query_timeout: Duration,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            cookie_domain: "sesame.com".to_string(),
            name_markers: vec!["auth".to_string(), "session".to_string()],
            query_timeout: Duration::from_millis(5000),
        }
    }
}

impl CredentialPolicy {
    /// Whether a single cookie looks like a session cookie for the site
    pub fn matches(&self, cookie: &CookieRecord) -> bool {
        if !cookie.domain.contains(&self.cookie_domain) {
            return false;
        }
        let name = cookie.name.to_ascii_lowercase();
        self.name_markers
            .iter()
            .any(|marker| name.contains(&marker.to_ascii_lowercase()))
    }
}

/// Whether the store holds a session cookie for the primary site.
///
/// Errors and timeouts yield `false`.
pub async fn check_authenticated<S>(store: &S, policy: &CredentialPolicy) -> bool
where
    S: CredentialStore + ?Sized,
{
    let cookies = match tokio::time::timeout(policy.query_timeout, store.cookies()).await {
        Ok(Ok(cookies)) => cookies,
        Ok(Err(e)) => {
            warn!("Cookie query failed, assuming not authenticated: {}", e);
            return false;
        }
        Err(_) => {
            warn!(
                "Cookie query timed out after {:?}, assuming not authenticated",
                policy.query_timeout
            );
            return false;
        }
    };

    debug!("Cookie jar holds {} cookies", cookies.len());
    cookies.iter().any(|cookie| policy.matches(cookie))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;

    struct FixedStore(Vec<CookieRecord>);

    #[async_trait]
    impl CredentialStore for FixedStore {
        async fn cookies(&self) -> Result<Vec<CookieRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl CredentialStore for FailingStore {
        async fn cookies(&self) -> Result<Vec<CookieRecord>> {
            Err(ShellError::credential("cookie manager unavailable"))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl CredentialStore for StalledStore {
        async fn cookies(&self) -> Result<Vec<CookieRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![CookieRecord::new("example.com", "session_token")])
        }
    }

    fn example_policy() -> CredentialPolicy {
        CredentialPolicy {
            cookie_domain: "example.com".to_string(),
            ..CredentialPolicy::default()
        }
    }

    #[tokio::test]
    async fn test_session_cookie_is_detected() {
        let store = FixedStore(vec![CookieRecord::new("example.com", "session_token")]);
        assert!(check_authenticated(&store, &example_policy()).await);
    }

    #[tokio::test]
    async fn test_empty_jar_is_not_authenticated() {
        let store = FixedStore(Vec::new());
        assert!(!check_authenticated(&store, &example_policy()).await);
    }

    #[tokio::test]
    async fn test_cookie_for_other_domain_is_ignored() {
        let store = FixedStore(vec![
            CookieRecord::new("evil.example", "session_token"),
            CookieRecord::new(".example.com", "_ga"),
        ]);
        assert!(!check_authenticated(&store, &example_policy()).await);
    }

    #[tokio::test]
    async fn test_marker_match_ignores_case_and_leading_dot() {
        let store = FixedStore(vec![CookieRecord::new(".example.com", "FirebaseAuthToken")]);
        assert!(check_authenticated(&store, &example_policy()).await);
    }

    #[tokio::test]
    async fn test_query_failure_is_not_authenticated() {
        assert!(!check_authenticated(&FailingStore, &example_policy()).await);
    }

    #[tokio::test]
    async fn test_query_timeout_is_not_authenticated() {
        let policy = CredentialPolicy {
            query_timeout: Duration::from_millis(20),
            ..example_policy()
        };
        assert!(!check_authenticated(&StalledStore, &policy).await);
    }
}
