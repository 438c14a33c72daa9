//! Dashboard preferences, persisted in the browser's `localStorage`.

use tracing::{info, warn};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const BACKEND_URL_KEY: &str = "mldash.backend_url";
pub const LOG_LEVEL_KEY: &str = "mldash.log_level";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub backend_url: Url,
    /// Filter directive handed to the tracing subscriber.
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn default_backend_url() -> Url {
    parse_backend_url(DEFAULT_BACKEND_URL).expect("built-in backend URL must be valid")
}

impl DashboardConfig {
    /// Build the config from a preference lookup. Invalid stored values fall back to defaults.
    pub fn from_preferences(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = get(BACKEND_URL_KEY) {
            match parse_backend_url(&raw) {
                Ok(url) => config.backend_url = url,
                Err(e) => warn!("Ignoring stored backend URL: {}", e),
            }
        }

        if let Some(level) = get(LOG_LEVEL_KEY) {
            let level = level.trim();
            if !level.is_empty() {
                config.log_level = level.to_string();
            }
        }

        config
    }

    /// Read preferences from `localStorage`, or defaults when storage is unavailable.
    pub fn load() -> Self {
        match local_storage() {
            Ok(storage) => Self::from_preferences(|key| storage.get_item(key).ok().flatten()),
            Err(_) => Self::default(),
        }
    }
}

/// Parse a user-entered backend address. Only `http` and `https` are accepted, and the
/// path always ends in `/` so endpoint paths join beneath it.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub fn save_preference(key: &str, value: &str) -> Result<(), ConfigError> {
    let storage = local_storage()?;
    storage
        .set_item(key, value)
        .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?;
    info!("Saved preference {} = {}", key, value);
    Ok(())
}

fn local_storage() -> Result<web_sys::Storage, ConfigError> {
    web_sys::window()
        .ok_or_else(|| ConfigError::Storage("no browser window".to_string()))?
        .local_storage()
        .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?
        .ok_or_else(|| ConfigError::Storage("localStorage is disabled".to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_points_at_local_backend() {
        let config = DashboardConfig::default();
        assert_eq!(config.backend_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_parse_backend_url_normalizes_path() {
        let url = parse_backend_url("  https://ml.example.com/api?x=1 ").unwrap();
        assert_eq!(url.as_str(), "https://ml.example.com/api/");
        assert_eq!(url.join("predict").unwrap().as_str(), "https://ml.example.com/api/predict");
    }

    #[test]
    fn test_parse_backend_url_rejects_bad_input() {
        assert!(matches!(
            parse_backend_url("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            parse_backend_url("localhost"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_from_preferences_falls_back_on_invalid_values() {
        let mut prefs = HashMap::new();
        prefs.insert(BACKEND_URL_KEY, "not a url".to_string());
        prefs.insert(LOG_LEVEL_KEY, "mldash=debug".to_string());

        let config = DashboardConfig::from_preferences(|key| prefs.get(key).cloned());
        assert_eq!(config.backend_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.log_level, "mldash=debug");
    }

    #[test]
    fn test_from_preferences_reads_stored_url() {
        let config = DashboardConfig::from_preferences(|key| {
            (key == BACKEND_URL_KEY).then(|| "http://10.0.0.5:8080".to_string())
        });
        assert_eq!(config.backend_url.as_str(), "http://10.0.0.5:8080/");
    }
}
