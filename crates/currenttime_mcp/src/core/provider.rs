use crate::core::{
    error::GeoLookupError,
    geo::{GeoClient, GeoTransport},
    models::{
        ClientInfoResponse, CommonTimezonesResponse, CurrentTimeResponse, LocationSummary,
        TimezoneTimeResponse,
    },
    timezone::{self, ResolvedTimezone},
    utils::UTC_ZONE_NAME,
};

const TIMEZONE_DETECTION_FAILED: &str = "Could not detect timezone, using UTC";
const CLIENT_INFO_FAILED: &str = "Could not retrieve client information";
const COMMON_TIMEZONES_NOTE: &str = "Use get_time_for_timezone() with any of these timezone names";

/// Current time operations, optionally located through a geolocation lookup
#[derive(Clone)]
pub struct CurrentTimeProvider<T> {
    geo: GeoClient<T>,
}

impl<T: GeoTransport> CurrentTimeProvider<T> {
    pub fn new(geo: GeoClient<T>) -> Self {
        Self { geo }
    }

    pub fn geo(&self) -> &GeoClient<T> {
        &self.geo
    }

    /// Current time in the zone of `client_ip`, or UTC when the lookup fails
    pub async fn get_current_time(&self, client_ip: Option<&str>) -> CurrentTimeResponse {
        match self.geo.lookup(client_ip).await {
            Ok(location) => {
                let zone_name = location.timezone.as_deref().unwrap_or(UTC_ZONE_NAME);
                let resolved = timezone::resolve_timezone(Some(zone_name));
                if resolved.fell_back {
                    tracing::debug!("Provider timezone '{}' is unknown, reading UTC", zone_name);
                }

                CurrentTimeResponse {
                    success: true,
                    error: None,
                    details: None,
                    reading: timezone::read_now(&resolved),
                    location: Some(LocationSummary::from(&location)),
                }
            }
            Err(e) => {
                let (error, details) = failure_message(&e, TIMEZONE_DETECTION_FAILED);
                utc_fallback(error, details)
            }
        }
    }

    /// Current time in a named zone; unknown names read as UTC
    pub fn get_time_for_timezone(&self, timezone_name: &str) -> TimezoneTimeResponse {
        let resolved = timezone::resolve_timezone(Some(timezone_name));

        TimezoneTimeResponse {
            success: true,
            reading: timezone::read_now(&resolved),
        }
    }

    /// Provider payload for `client_ip`, passed through field by field
    pub async fn get_client_info(&self, client_ip: Option<&str>) -> ClientInfoResponse {
        match self.geo.lookup(client_ip).await {
            Ok(location) => ClientInfoResponse::found(location),
            Err(e) => {
                let (error, details) = failure_message(&e, CLIENT_INFO_FAILED);
                ClientInfoResponse::failed(error, details)
            }
        }
    }

    pub fn list_common_timezones(&self) -> CommonTimezonesResponse {
        CommonTimezonesResponse {
            success: true,
            common_timezones: timezone::common_timezones(),
            total_available: timezone::total_available_timezones(),
            note: COMMON_TIMEZONES_NOTE,
        }
    }
}

/// Failed `get_current_time` result, still carrying a UTC reading
pub fn utc_fallback(error: String, details: Option<String>) -> CurrentTimeResponse {
    CurrentTimeResponse {
        success: false,
        error: Some(error),
        details,
        reading: timezone::read_now(&ResolvedTimezone::utc()),
        location: None,
    }
}

/// Invalid input is reported as is; lookup failures get a summary plus the reason
fn failure_message(error: &GeoLookupError, summary: &str) -> (String, Option<String>) {
    match error {
        GeoLookupError::InvalidIp { ip } => {
            tracing::debug!("Rejected malformed client IP '{}'", ip);
            (error.to_string(), None)
        }
        _ => (summary.to_string(), Some(error.to_string())),
    }
}
