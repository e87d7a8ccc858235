//! Shell configuration
//!
//! Loaded once at startup from a JSONC file in the per-user config directory.
//! Every key is optional; anything missing falls back to the built-in
//! defaults, which point at the Sesame voice demo.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::credentials::CredentialPolicy;
use crate::error::{Result, ShellError};
use crate::gate::GateConfig;

const CONFIG_FILENAME: &str = "config.jsonc";

pub const DEFAULT_PRIMARY_URL: &str =
    "https://www.sesame.com/research/crossing_the_uncanny_valley_of_voice#demo";
pub const DEFAULT_AUTH_URL_PREFIX: &str = "https://www.sesame.com/__/auth/handler";
pub const DEFAULT_LOGIN_COMPLETE_URL: &str = "https://www.sesame.com/login";

/// Primary window appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub resizable: bool,
    /// Native title bar and borders
    pub decorations: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sesame".to_string(),
            width: 720.0,
            height: 530.0,
            resizable: false,
            decorations: false,
        }
    }
}

/// Auth window appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthWindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
}

impl Default for AuthWindowConfig {
    fn default() -> Self {
        Self {
            title: "Sign in".to_string(),
            width: 500.0,
            height: 600.0,
        }
    }
}

/// Cosmetic patches injected into the primary page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatchConfig {
    pub hide_scrollbars: bool,
    pub block_shortcuts: bool,
    pub disable_context_menu: bool,
    pub disable_text_selection: bool,
    /// Grant microphone requests from the primary page's origin
    pub grant_microphone: bool,
    /// CSS selectors hidden with `display: none`
    pub hidden_selectors: Vec<String>,
    /// CSS selectors of links made inert (kept visible, not clickable)
    pub inert_links: Vec<String>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            hide_scrollbars: true,
            block_shortcuts: true,
            disable_context_menu: true,
            disable_text_selection: true,
            grant_microphone: true,
            hidden_selectors: vec![
                r#"button[data-mebu-button="true"]"#.to_string(),
                "#navigation-menu".to_string(),
            ],
            inert_links: vec![r#"header a[href="/"]"#.to_string()],
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    pub primary_url: String,
    pub auth_url_prefix: String,
    pub login_complete_url: String,
    pub cookie_domain: String,
    pub auth_cookie_markers: Vec<String>,
    /// Wait after login completion before closing the auth window
    pub auth_grace_delay_ms: u64,
    /// Wait after the first page load before showing the primary window
    pub show_delay_ms: u64,
    pub credential_query_timeout_ms: u64,
    /// Name of the credential partition shared by all windows
    pub partition: String,
    pub window: WindowConfig,
    pub auth_window: AuthWindowConfig,
    pub patches: PatchConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let credentials = CredentialPolicy::default();
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            auth_url_prefix: DEFAULT_AUTH_URL_PREFIX.to_string(),
            login_complete_url: DEFAULT_LOGIN_COMPLETE_URL.to_string(),
            cookie_domain: credentials.cookie_domain,
            auth_cookie_markers: credentials.name_markers,
            auth_grace_delay_ms: 2000,
            show_delay_ms: 2000,
            credential_query_timeout_ms: credentials.query_timeout.as_millis() as u64,
            partition: "sesame-auth".to_string(),
            window: WindowConfig::default(),
            auth_window: AuthWindowConfig::default(),
            patches: PatchConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Check that the configuration can drive the gate safely
    pub fn validate(&self) -> Result<()> {
        require_web_url("primaryUrl", &self.primary_url)?;
        require_web_url("authUrlPrefix", &self.auth_url_prefix)?;

        for (key, value) in [
            ("loginCompleteUrl", &self.login_complete_url),
            ("cookieDomain", &self.cookie_domain),
            ("partition", &self.partition),
        ] {
            if value.trim().is_empty() {
                return Err(ShellError::config(format!("{} must not be empty", key)));
            }
        }

        if self.partition.contains(['/', '\\']) || self.partition.contains("..") {
            return Err(ShellError::config(format!(
                "partition must be a plain name, got {:?}",
                self.partition
            )));
        }

        if !self.auth_cookie_markers.iter().any(|m| !m.is_empty()) {
            return Err(ShellError::config(
                "authCookieMarkers must contain at least one non-empty marker",
            ));
        }

        for (key, value) in [
            ("window.width", self.window.width),
            ("window.height", self.window.height),
            ("authWindow.width", self.auth_window.width),
            ("authWindow.height", self.auth_window.height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ShellError::config(format!("{} must be positive", key)));
            }
        }

        Ok(())
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.auth_grace_delay_ms)
    }

    pub fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }

    /// The immutable gate configuration derived from this file
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            primary_url_prefix: self.primary_url.clone(),
            auth_url_prefix: self.auth_url_prefix.clone(),
            login_complete_url: self.login_complete_url.clone(),
            grace_delay: self.grace_delay(),
            credentials: CredentialPolicy {
                cookie_domain: self.cookie_domain.clone(),
                name_markers: self
                    .auth_cookie_markers
                    .iter()
                    .filter(|m| !m.is_empty())
                    .cloned()
                    .collect(),
                query_timeout: Duration::from_millis(self.credential_query_timeout_ms),
            },
        }
    }

    /// Webview data directory backing the credential partition, created on demand
    pub fn partition_dir(&self) -> Result<PathBuf> {
        let dir = project_dirs()?.data_dir().join(&self.partition);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("Created session directory: {:?}", dir);
        }
        Ok(dir)
    }
}

fn require_web_url(key: &str, value: &str) -> Result<()> {
    let url = tauri::Url::parse(value)
        .map_err(|e| ShellError::config(format!("{} is not a valid URL ({}): {}", key, value, e)))?;
    match url.scheme() {
        "https" | "http" => Ok(()),
        scheme => Err(ShellError::config(format!(
            "{} must be an http(s) URL, got scheme {:?}",
            key, scheme
        ))),
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "sesame", "sesame-shell")
        .ok_or_else(|| ShellError::config("Failed to determine the user's home directory"))
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILENAME))
}

/// Parse a JSONC string (JSON with comments) into a config
fn parse_jsonc(content: &str) -> Result<ShellConfig> {
    // Use json_comments to strip comments, then parse with serde_json
    let stripped = json_comments::StripComments::new(content.as_bytes());
    Ok(serde_json::from_reader(stripped)?)
}

/// Read and validate a config file. A missing or blank file yields defaults.
pub fn load_from(path: &Path) -> Result<ShellConfig> {
    if !path.exists() {
        debug!("Config file does not exist: {:?}", path);
        return Ok(ShellConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = if content.trim().is_empty() {
        ShellConfig::default()
    } else {
        parse_jsonc(&content)?
    };

    config.validate()?;
    info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Load the config from `path`, or from the default location
pub fn load(path: Option<&Path>) -> Result<ShellConfig> {
    match path {
        Some(path) => load_from(path),
        None => load_from(&default_config_path()?),
    }
}
