use std::time::Duration;

use url::Url;

use crate::core::{
    error::{CurrentTimeError, CurrentTimeResult},
    utils::{self, GEO_LOOKUP_TIMEOUT},
};

/// Geolocation lookup configuration, fixed once at startup
#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl GeoConfig {
    /// Build a configuration from a provider base URL and an optional API key.
    ///
    /// Only `http` and `https` base URLs are accepted. A blank key counts as absent.
    pub fn new(base_url: &str, api_key: Option<String>) -> CurrentTimeResult<Self> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| CurrentTimeError::InvalidConfig {
            message: format!("base URL '{}': {}", base_url, e),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CurrentTimeError::InvalidConfig {
                message: format!("base URL '{}' must use http or https", base_url),
            });
        }

        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            base_url,
            api_key,
            timeout: GEO_LOOKUP_TIMEOUT,
            user_agent: utils::user_agent(),
        })
    }

    /// Base URL for display, with the API key never included
    pub fn describe(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{} (key {})", self.base_url, utils::redact(key)),
            None => self.base_url.to_string(),
        }
    }
}
