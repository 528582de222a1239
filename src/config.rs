use std::path::PathBuf;
use std::time::Duration;

use crate::types::ResponseMode;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_STOCK_DIR: &str = "../stock/";
pub const DEFAULT_EXTENSION: &str = "eps";
pub const DEFAULT_LIMIT: usize = 5;

/// Runtime settings for one keywording run.
#[derive(Debug, Clone)]
pub struct KeyworderConfig {
    /// Gemini API key
    pub api_key: String,
    /// Model name (e.g. "gemini-2.5-flash")
    pub model: String,
    /// Base URL up to and including `/models`
    pub endpoint: String,
    /// Request timeout (default: 120s)
    pub timeout: Duration,
    /// Directory scanned for candidate files
    pub stock_dir: PathBuf,
    /// File extension to offer, without the dot
    pub extension: String,
    /// How many of the newest files to offer
    pub limit: usize,
    /// Text template or strict JSON
    pub mode: ResponseMode,
    /// exiftool binary
    pub exiftool: PathBuf,
    /// Ghostscript binary used to rasterise EPS
    pub ghostscript: PathBuf,
}

impl Default for KeyworderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
            stock_dir: PathBuf::from(DEFAULT_STOCK_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            limit: DEFAULT_LIMIT,
            mode: ResponseMode::default(),
            exiftool: PathBuf::from("exiftool"),
            ghostscript: PathBuf::from("gs"),
        }
    }
}

impl KeyworderConfig {
    /// Build a config from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if values should come from `.env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if `GEMINI_API_KEY` is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::with_api_key(api_key);

        if let Some(model) = lookup("GEMINI_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(endpoint) = lookup("GEMINI_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("KEYWORDER_STOCK_DIR").filter(|v| !v.trim().is_empty()) {
            config.stock_dir = PathBuf::from(dir.trim());
        }
        if let Some(path) = lookup("EXIFTOOL_PATH").filter(|v| !v.trim().is_empty()) {
            config.exiftool = PathBuf::from(path.trim());
        }
        if let Some(path) = lookup("GHOSTSCRIPT_PATH").filter(|v| !v.trim().is_empty()) {
            config.ghostscript = PathBuf::from(path.trim());
        }

        Ok(config)
    }

    /// Create a config with defaults and the given key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stock_dir = dir.into();
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Full `generateContent` URL for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Errors raised while assembling the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("'GEMINI_API_KEY' not found")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = KeyworderConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert_eq!(err.to_string(), "'GEMINI_API_KEY' not found");
    }

    #[test]
    fn blank_key_is_an_error() {
        let result = KeyworderConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = KeyworderConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "k")])).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.stock_dir, PathBuf::from(DEFAULT_STOCK_DIR));
        assert_eq!(config.extension, "eps");
        assert_eq!(config.limit, 5);
        assert_eq!(config.mode, ResponseMode::Json);
    }

    #[test]
    fn overrides_are_read() {
        let config = KeyworderConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "k"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_ENDPOINT", "http://localhost:9999/models/"),
            ("KEYWORDER_STOCK_DIR", "/tmp/stock"),
            ("EXIFTOOL_PATH", "/opt/exiftool"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.generate_url(),
            "http://localhost:9999/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(config.stock_dir, PathBuf::from("/tmp/stock"));
        assert_eq!(config.exiftool, PathBuf::from("/opt/exiftool"));
    }

    #[test]
    fn extension_setter_strips_dot() {
        let config = KeyworderConfig::with_api_key("k").extension(".EPS");
        assert_eq!(config.extension, "EPS");
    }
}
