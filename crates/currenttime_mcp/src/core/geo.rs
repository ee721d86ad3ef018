use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use url::Url;

use crate::config::GeoConfig;
use crate::core::{
    error::{CurrentTimeError, CurrentTimeResult, GeoLookupError, GeoLookupResult},
    models::GeoLocation,
};

const UNKNOWN_PROVIDER_ERROR: &str = "Unknown provider error";

/// Status and body of a provider response, before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound side of a geolocation lookup
#[async_trait]
pub trait GeoTransport: Send + Sync {
    /// Perform a single GET against `url`. No retries.
    async fn fetch(&self, url: &Url) -> GeoLookupResult<RawResponse>;
}

/// Transport shared behind a trait object
pub type SharedTransport = Arc<dyn GeoTransport>;

#[async_trait]
impl<T: GeoTransport + ?Sized> GeoTransport for Arc<T> {
    async fn fetch(&self, url: &Url) -> GeoLookupResult<RawResponse> {
        (**self).fetch(url).await
    }
}

/// `reqwest` backed transport
#[derive(Clone)]
pub struct HttpGeoTransport {
    client: Client,
}

impl HttpGeoTransport {
    pub fn new(config: &GeoConfig) -> CurrentTimeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| CurrentTimeError::ClientBuild {
                message: e.to_string(),
            })?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CurrentTimeError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl GeoTransport for HttpGeoTransport {
    async fn fetch(&self, url: &Url) -> GeoLookupResult<RawResponse> {
        let to_error = |e: reqwest::Error| {
            let url = redacted(url);
            if e.is_timeout() {
                GeoLookupError::Timeout { url }
            } else {
                GeoLookupError::Transport {
                    url,
                    message: e.to_string(),
                }
            }
        };

        let response = self.client.get(url.clone()).send().await.map_err(to_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(to_error)?;

        Ok(RawResponse { status, body })
    }
}

/// Looks up caller location, folding every failure mode into [`GeoLookupError`]
#[derive(Clone)]
pub struct GeoClient<T> {
    transport: T,
    config: GeoConfig,
}

impl<T: GeoTransport> GeoClient<T> {
    pub fn new(transport: T, config: GeoConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    /// Look up `ip`, or the caller's own public address when `ip` is `None`.
    ///
    /// A malformed `ip` is rejected before any request is made.
    pub async fn lookup(&self, ip: Option<&str>) -> GeoLookupResult<GeoLocation> {
        let ip = ip.map(parse_ip).transpose()?;
        let url = self.lookup_url(ip.as_ref());

        tracing::debug!("Geolocation lookup: {}", redacted(&url));

        let response = self.transport.fetch(&url).await.inspect_err(|e| {
            tracing::warn!("Geolocation request failed: {}", e);
        })?;

        interpret_response(response).inspect_err(|e| {
            tracing::warn!("Geolocation lookup rejected: {}", e);
        })
    }

    fn lookup_url(&self, ip: Option<&IpAddr>) -> Url {
        let mut url = self.config.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        let path = match ip {
            Some(ip) => format!("{}/{}/json/", base_path, ip),
            None => format!("{}/json/", base_path),
        };
        url.set_path(&path);
        url.set_query(None);

        if let Some(key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        url
    }
}

fn parse_ip(ip: &str) -> GeoLookupResult<IpAddr> {
    ip.trim()
        .parse::<IpAddr>()
        .map_err(|_| GeoLookupError::InvalidIp { ip: ip.to_string() })
}

/// Status check, then body shape, then the in-band error flag
fn interpret_response(response: RawResponse) -> GeoLookupResult<GeoLocation> {
    if !(200..300).contains(&response.status) {
        return Err(GeoLookupError::HttpStatus {
            status: response.status,
        });
    }

    let payload: Value =
        serde_json::from_str(&response.body).map_err(|e| GeoLookupError::MalformedResponse {
            message: e.to_string(),
        })?;

    let Value::Object(fields) = &payload else {
        return Err(GeoLookupError::MalformedResponse {
            message: "expected a JSON object".to_string(),
        });
    };

    if fields.get("error").is_some_and(is_truthy) {
        let reason = ["reason", "message"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .unwrap_or(UNKNOWN_PROVIDER_ERROR);
        return Err(GeoLookupError::Provider {
            reason: reason.to_string(),
        });
    }

    serde_json::from_value(payload).map_err(|e| GeoLookupError::MalformedResponse {
        message: e.to_string(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// URL with the `key` parameter masked, for logs and error text
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "****".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    if pairs.is_empty() {
        return url.to_string();
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
