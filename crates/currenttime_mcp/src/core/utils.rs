use std::time::Duration;

// Constants for format strings and lookup defaults
pub const FORMATTED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";
pub const UTC_OFFSET_FORMAT: &str = "%z";
pub const UTC_ZONE_NAME: &str = "UTC";

pub const DEFAULT_GEO_BASE_URL: &str = "https://ipapi.co";
pub const GEO_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Available resource URIs for the CurrentTime MCP Server
pub const AVAILABLE_RESOURCES: &[&str] = &[
    "currenttime://status",
    "currenttime://help",
    "currenttime://timezones",
];

/// Identifying header value sent with every geolocation request
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Hide everything but the last four characters of a secret
///
/// # Arguments
///
/// * `secret` - The value to redact
///
/// # Returns
///
/// A string safe to show in status output
pub fn redact(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}
