use std::collections::BTreeMap;

use rmcp::schemars;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Helper function to deserialize and trim strings
fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Trim an optional string, treating blank input as absent
fn deserialize_optional_trimmed_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Accept strings and numbers; anything else decodes to `None`
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept numbers and numeric strings; anything else decodes to `None`
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Request for tools that look up the caller by IP
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ClientIpRequest {
    /// Optional IPv4 or IPv6 address. If omitted, the server's own public IP is used
    #[serde(default, deserialize_with = "deserialize_optional_trimmed_string")]
    pub client_ip: Option<String>,
}

/// Request to get current time in a named timezone
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetTimeForTimezoneRequest {
    /// IANA timezone name (e.g., 'America/New_York', 'Asia/Seoul', 'Europe/London')
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    pub timezone_name: String,
}

/// Location payload returned by the geolocation provider.
///
/// Every field is optional; the provider omits or nulls fields freely.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoLocation {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub country_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub country_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub postal: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub calling_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub languages: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub asn: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub org: Option<String>,
}

/// Current instant rendered through a timezone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeReading {
    /// ISO 8601 datetime with offset
    pub current_time: String,
    /// Timezone name the reading was produced for
    pub timezone: String,
    /// Signed offset from UTC, `±HHMM`
    pub utc_offset: String,
    /// `YYYY-MM-DD HH:MM:SS <abbreviation>`
    pub formatted_time: String,
    /// Unix epoch seconds, fractional
    pub timestamp: f64,
    /// Whether daylight saving time is in effect
    pub is_dst: bool,
}

/// Location summary attached to a successful current time reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub ip: Option<String>,
}

impl From<&GeoLocation> for LocationSummary {
    fn from(location: &GeoLocation) -> Self {
        Self {
            city: location.city.clone(),
            region: location.region.clone(),
            country: location.country_name.clone(),
            country_code: location.country_code.clone(),
            ip: location.ip.clone(),
        }
    }
}

/// Result of `get_current_time`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentTimeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub reading: TimeReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSummary>,
}

/// Result of `get_time_for_timezone`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimezoneTimeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub reading: TimeReading,
}

/// Flattened provider payload returned by `get_client_info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDetails {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub postal: Option<String>,
    pub calling_code: Option<String>,
    pub currency: Option<String>,
    pub languages: Option<String>,
    pub asn: Option<String>,
    pub org: Option<String>,
}

impl From<GeoLocation> for ClientDetails {
    fn from(location: GeoLocation) -> Self {
        Self {
            ip: location.ip,
            city: location.city,
            region: location.region,
            country: location.country_name,
            country_code: location.country_code,
            timezone: location.timezone,
            latitude: location.latitude,
            longitude: location.longitude,
            postal: location.postal,
            calling_code: location.calling_code,
            currency: location.currency,
            languages: location.languages,
            asn: location.asn,
            org: location.org,
        }
    }
}

/// Successful `get_client_info` result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientInfoFound {
    pub success: bool,
    #[serde(flatten)]
    pub details: ClientDetails,
}

/// Failed `get_client_info` result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientInfoFailed {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Result of `get_client_info`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClientInfoResponse {
    Found(ClientInfoFound),
    Failed(ClientInfoFailed),
}

impl ClientInfoResponse {
    pub fn found(location: GeoLocation) -> Self {
        Self::Found(ClientInfoFound {
            success: true,
            details: location.into(),
        })
    }

    pub fn failed(error: impl Into<String>, details: Option<String>) -> Self {
        Self::Failed(ClientInfoFailed {
            success: false,
            error: error.into(),
            details,
        })
    }
}

/// Result of `list_common_timezones`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonTimezonesResponse {
    pub success: bool,
    pub common_timezones: BTreeMap<&'static str, Vec<&'static str>>,
    pub total_available: usize,
    pub note: &'static str,
}

/// Envelope used when an operation fails unexpectedly
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationFailure {
    pub success: bool,
    pub error: String,
}

impl OperationFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_trimming() {
        let request: ClientIpRequest = serde_json::from_str(r#"{"client_ip": "  1.2.3.4  "}"#).unwrap();
        assert_eq!(request.client_ip.as_deref(), Some("1.2.3.4"));

        let request: ClientIpRequest = serde_json::from_str(r#"{"client_ip": "   "}"#).unwrap();
        assert!(request.client_ip.is_none());

        let request: ClientIpRequest = serde_json::from_str("{}").unwrap();
        assert!(request.client_ip.is_none());
    }

    #[test]
    fn test_timezone_name_trimming() {
        let json = r#"{"timezone_name": "   Africa/Cairo   "}"#;
        let request: GetTimeForTimezoneRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.timezone_name, "Africa/Cairo");
    }

    #[test]
    fn test_geo_location_lenient_decoding() {
        let json = r#"{
            "ip": "8.8.8.8",
            "city": null,
            "latitude": "37.751",
            "longitude": -97.822,
            "postal": 94043,
            "asn": "AS15169",
            "languages": ["en"],
            "unexpected": {"nested": true}
        }"#;
        let location: GeoLocation = serde_json::from_str(json).unwrap();

        assert_eq!(location.ip.as_deref(), Some("8.8.8.8"));
        assert!(location.city.is_none());
        assert_eq!(location.latitude, Some(37.751));
        assert_eq!(location.longitude, Some(-97.822));
        assert_eq!(location.postal.as_deref(), Some("94043"));
        assert!(location.languages.is_none());
        assert!(location.timezone.is_none());
    }

    #[test]
    fn test_current_time_response_is_flat() {
        let response = CurrentTimeResponse {
            success: true,
            error: None,
            details: None,
            reading: TimeReading {
                current_time: "2024-01-01T12:00:00.000000+00:00".to_string(),
                timezone: "UTC".to_string(),
                utc_offset: "+0000".to_string(),
                formatted_time: "2024-01-01 12:00:00 UTC".to_string(),
                timestamp: 1_704_110_400.0,
                is_dst: false,
            },
            location: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["timezone"], "UTC");
        assert_eq!(value["utc_offset"], "+0000");
        assert!(value.get("error").is_none());
        assert!(value.get("location").is_none());
        assert!(value.get("reading").is_none());
    }

    #[test]
    fn test_client_info_failure_shape() {
        let response = ClientInfoResponse::failed(
            "Could not retrieve client information",
            Some("connection refused".to_string()),
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Could not retrieve client information");
        assert_eq!(value["details"], "connection refused");
    }
}
