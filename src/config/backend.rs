use crate::error::FolioError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

/// Used when `SUPABASE_URL` is absent. Never resolves, so every backend call fails loudly.
pub const FALLBACK_URL: &str = "<SUPABASE_URL>";
/// Used when `SUPABASE_ANON_KEY` is absent. Will not authenticate.
pub const FALLBACK_ANON_KEY: &str = "<SUPABASE_ANON_KEY>";

/// Hosted backend configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend base URL, e.g. `https://xyzcompany.supabase.co`.
    /// Env: `SUPABASE_URL`. TOML: `backend.url`.
    #[serde(default)]
    pub url: String,

    /// Anonymous API key sent with every request.
    /// Env: `SUPABASE_ANON_KEY`. TOML: `backend.anon_key`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub anon_key: String,

    /// Table holding project rows.
    /// TOML: `backend.projects_table`. Default: `projects`.
    #[serde(default = "default_projects_table")]
    pub projects_table: String,

    /// Bucket holding thumbnails and gallery images.
    /// TOML: `backend.storage_bucket`. Default: `project-images`.
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,

    /// Whole-request timeout for backend calls, in seconds.
    /// TOML: `backend.request_timeout_secs`. Default: `60`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional outbound HTTP proxy for backend calls.
    /// TOML: `backend.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: FALLBACK_URL.to_string(),
            anon_key: FALLBACK_ANON_KEY.to_string(),
            projects_table: default_projects_table(),
            storage_bucket: default_storage_bucket(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy: None,
        }
    }
}

impl BackendConfig {
    /// Replaces blank secrets with the placeholder values.
    pub fn fill_placeholders(&mut self) {
        if self.url.trim().is_empty() {
            self.url = FALLBACK_URL.to_string();
        }
        if self.anon_key.trim().is_empty() {
            self.anon_key = FALLBACK_ANON_KEY.to_string();
        }
    }

    /// True while either secret is still the placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.url == FALLBACK_URL || self.anon_key == FALLBACK_ANON_KEY
    }

    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url, FolioError> {
        Url::parse(self.url.trim()).map_err(|err| {
            FolioError::Config(format!("backend.url {:?} is not a URL: {err}", self.url))
        })
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for backend.anon_key",
        )),
    }
}

fn default_projects_table() -> String {
    "projects".to_string()
}

fn default_storage_bucket() -> String {
    "project-images".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_url_does_not_parse() {
        let cfg = BackendConfig::default();
        assert!(matches!(cfg.base_url(), Err(FolioError::Config(_))));
    }

    #[test]
    fn real_url_parses() {
        let cfg = BackendConfig {
            url: " https://demo.supabase.co ".to_string(),
            ..BackendConfig::default()
        };
        assert_eq!(
            cfg.base_url().expect("valid url").as_str(),
            "https://demo.supabase.co/"
        );
    }
}
