//! Runtime configuration: explicit flag, then environment, then default.

use std::path::PathBuf;

use crate::request::FeatureBounds;
use crate::types::{CreditError, CreditResult};

/// Base URL used when neither a flag nor the environment names one.
pub const DEFAULT_SERVER_URL: &str = "https://ocp7-dbbackend.herokuapp.com";

const SERVER_URL_ENV: &str = "CREDITLENS_SERVER_URL";
const CACHE_DIR_ENV: &str = "CREDITLENS_CACHE_DIR";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub cache_dir: PathBuf,
    pub feature_bounds: FeatureBounds,
}

impl Config {
    /// Resolve configuration with flag > environment > default precedence.
    pub fn resolve(server_flag: Option<&str>, cache_dir_flag: Option<&str>) -> CreditResult<Self> {
        let server_url = match server_flag {
            Some(url) => url.to_string(),
            None => std::env::var(SERVER_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
        };
        let parsed = url::Url::parse(&server_url)
            .map_err(|e| CreditError::InvalidParameter(format!("server url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CreditError::InvalidParameter(format!(
                "server url scheme must be http or https, got {}",
                parsed.scheme()
            )));
        }

        let cache_dir = match cache_dir_flag {
            Some(dir) => PathBuf::from(dir),
            None => match std::env::var(CACHE_DIR_ENV) {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => default_cache_dir(),
            },
        };

        Ok(Self {
            server_url,
            cache_dir,
            feature_bounds: FeatureBounds::default(),
        })
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".creditlens")
        .join("cache")
}
