mod backend;
mod basic;

pub use backend::{BackendConfig, FALLBACK_ANON_KEY, FALLBACK_URL};
pub use basic::BasicConfig;

use crate::error::FolioError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Env var carrying the backend base URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
/// Env var carrying the backend anonymous API key.
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// HTTP server and logging settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Hosted backend settings (see `backend` table in config.toml).
    #[serde(default)]
    pub backend: BackendConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults, an optional `config.toml`, `FOLIO_*` overrides
    /// (`FOLIO_BASIC__LISTEN_PORT=9000`) and the two backend secrets.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment
            .merge(Env::prefixed("FOLIO_").split("__"))
            .merge(backend_secrets())
    }

    /// Extracts a config from any figment, substituting placeholders for missing secrets.
    pub fn from_figment(figment: &Figment) -> Result<Self, FolioError> {
        let mut cfg: Self = figment
            .extract()
            .map_err(|err| FolioError::Config(err.to_string()))?;
        cfg.backend.fill_placeholders();
        Ok(cfg)
    }

    /// Loads configuration from defaults, `config.toml` (if present) and the environment.
    pub fn load() -> Result<Self, FolioError> {
        Self::from_figment(&Self::figment())
    }
}

/// `SUPABASE_URL` / `SUPABASE_ANON_KEY` mapped onto `backend.url` / `backend.anon_key`.
fn backend_secrets() -> Env {
    Env::raw()
        .only(&[SUPABASE_URL_ENV, SUPABASE_ANON_KEY_ENV])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case(SUPABASE_URL_ENV) {
                "backend.url".into()
            } else if key.as_str().eq_ignore_ascii_case(SUPABASE_ANON_KEY_ENV) {
                "backend.anon_key".into()
            } else {
                key.as_str().to_owned().into()
            }
        })
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|err| panic!("failed to extract configuration: {err}"))
});
