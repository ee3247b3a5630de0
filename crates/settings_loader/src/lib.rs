//! # Settings Loader
//!
//! Centralized configuration for the savings calculator service.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional JSON settings file (`settings.json` by default)
//! 3. Environment variables, including those from a `.env` file
//!
//! The email provider API key is only ever read from the environment and is
//! validated exactly once, here. The outcome is kept as a
//! `Result<EmailApiKey, ConfigError>` so the server can still start and
//! serve previews, and a submission fails with the stored error.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let settings = settings_loader::load_app_settings(Some(Path::new("settings.json")))?;
//! let key = settings.email_api_key.as_ref();
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

pub const API_KEY_ENV: &str = "RESEND_API_KEY";
pub const API_KEY_PREFIX: &str = "re_";
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_CRM_FORM_URL: &str =
    "https://api.hsforms.com/submissions/v3/integration/submit/8723359/623dd468-b19b-4891-9b8b-d54f80ead603";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("RESEND_API_KEY environment variable is empty or not set")]
    MissingApiKey,

    #[error("Invalid email API key format: key should start with 're_'")]
    MalformedApiKey,
}

/// Validated email provider key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailApiKey(String);

impl EmailApiKey {
    pub fn parse(raw: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let key = raw.map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if !key.starts_with(API_KEY_PREFIX) || key.len() == API_KEY_PREFIX.len() {
            return Err(ConfigError::MalformedApiKey);
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EmailApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmailApiKey(***)")
    }
}

fn missing_key() -> std::result::Result<EmailApiKey, ConfigError> {
    Err(ConfigError::MissingApiKey)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub email_api_url: String,
    pub email_from: String,
    /// Internal address that receives a copy of every report
    pub internal_recipient: String,
    pub crm_form_url: String,
    pub http_timeout_secs: u64,
    #[serde(skip, default = "missing_key")]
    pub email_api_key: std::result::Result<EmailApiKey, ConfigError>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            email_api_url: "https://api.resend.com/emails".to_string(),
            email_from: "onboarding@resend.dev".to_string(),
            internal_recipient: "leads@example.com".to_string(),
            crm_form_url: DEFAULT_CRM_FORM_URL.to_string(),
            http_timeout_secs: 30,
            email_api_key: missing_key(),
        }
    }
}

impl AppSettings {
    /// Applies environment overrides through `lookup` and validates the API key.
    ///
    /// Unparseable numeric values keep the current setting.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(url) = lookup("EMAIL_API_URL") {
            self.email_api_url = url;
        }
        if let Some(from) = lookup("EMAIL_FROM") {
            self.email_from = from;
        }
        if let Some(recipient) = lookup("INTERNAL_RECIPIENT") {
            self.internal_recipient = recipient;
        }
        if let Some(url) = lookup("CRM_FORM_URL") {
            self.crm_form_url = url;
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            self.http_timeout_secs = secs;
        }
        self.email_api_key = EmailApiKey::parse(lookup(API_KEY_ENV).as_deref());
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<AppSettings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: AppSettings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads the given settings file, falling back to `settings.json` and then to
/// built-in defaults when no file exists. A file that exists but does not
/// parse is an error.
pub fn load_settings_with_fallback(path: Option<&Path>) -> Result<AppSettings> {
    if let Some(settings_path) = path {
        if settings_file_exists(settings_path) {
            return load_settings(settings_path);
        }
        tracing::warn!("Settings file {} not found, trying defaults", settings_path.display());
    }

    if settings_file_exists(DEFAULT_SETTINGS_FILE) {
        return load_settings(DEFAULT_SETTINGS_FILE);
    }

    Ok(AppSettings::default())
}

/// Full load used at startup: file layer, `.env`, then process environment.
pub fn load_app_settings(path: Option<&Path>) -> Result<AppSettings> {
    // A missing .env is normal in production
    let _ = dotenvy::dotenv();

    let mut settings = load_settings_with_fallback(path)?;
    settings.apply_env(|name| std::env::var(name).ok());

    match &settings.email_api_key {
        Ok(_) => tracing::info!("Email API key loaded"),
        Err(e) => tracing::warn!("Email delivery unavailable: {}", e),
    }

    Ok(settings)
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_api_key_validation() {
        assert_eq!(EmailApiKey::parse(None), Err(ConfigError::MissingApiKey));
        assert_eq!(EmailApiKey::parse(Some("   ")), Err(ConfigError::MissingApiKey));
        assert_eq!(EmailApiKey::parse(Some("sk_live_123")), Err(ConfigError::MalformedApiKey));
        assert_eq!(EmailApiKey::parse(Some("re_")), Err(ConfigError::MalformedApiKey));

        let key = EmailApiKey::parse(Some("  re_abc123\n")).unwrap();
        assert_eq!(key.expose(), "re_abc123");
        assert_eq!(format!("{:?}", key), "EmailApiKey(***)");
    }

    #[test]
    fn test_defaults_without_key() {
        let settings = AppSettings::default();
        assert_eq!(settings.bind_address(), "127.0.0.1:3000");
        assert_eq!(settings.email_api_url, "https://api.resend.com/emails");
        assert_eq!(settings.email_api_key, Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("PORT", "8080"),
            ("HTTP_TIMEOUT_SECS", "not-a-number"),
            ("INTERNAL_RECIPIENT", "sales@example.org"),
            ("RESEND_API_KEY", "re_test_key"),
        ]);
        let mut settings = AppSettings::default();
        settings.apply_env(|name| vars.get(name).cloned());

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.http_timeout_secs, 30);
        assert_eq!(settings.internal_recipient, "sales@example.org");
        assert_eq!(settings.email_api_key.unwrap().expose(), "re_test_key");
    }

    #[test]
    fn test_malformed_key_from_env() {
        let vars = env(&[("RESEND_API_KEY", "pk_oops")]);
        let mut settings = AppSettings::default();
        settings.apply_env(|name| vars.get(name).cloned());
        assert_eq!(settings.email_api_key, Err(ConfigError::MalformedApiKey));
    }

    #[test]
    fn test_load_partial_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "port": 4000, "email_from": "reports@example.net" }}"#).unwrap();

        let settings = load_settings_with_fallback(Some(file.path())).unwrap();
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.email_from, "reports@example.net");
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.email_api_key, Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn test_malformed_settings_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(load_settings_with_fallback(Some(file.path())).is_err());
    }
}
