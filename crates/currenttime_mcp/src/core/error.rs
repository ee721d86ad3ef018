use rmcp::ErrorData as McpError;
use rmcp::serde_json::json;

use crate::core::utils::AVAILABLE_RESOURCES;

// Error codes
const ERROR_INVALID_CONFIG: &str = "invalid_config";
const ERROR_CLIENT_BUILD: &str = "client_build_failed";
const ERROR_SERIALIZATION: &str = "serialization_failed";
const ERROR_RESOURCE_NOT_FOUND: &str = "resource_not_found";
const ERROR_LOGGING_INIT: &str = "logging_initialization_failed";

/// Reasons a geolocation lookup did not produce a usable location.
///
/// The display string is the human-readable reason surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoLookupError {
    #[error("Invalid IP address format")]
    InvalidIp { ip: String },
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Geolocation provider returned HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("Malformed geolocation response: {message}")]
    MalformedResponse { message: String },
    #[error("Geolocation provider error: {reason}")]
    Provider { reason: String },
}

/// Server level failures
#[derive(Debug, thiserror::Error)]
pub enum CurrentTimeError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("Failed to build HTTP client: {message}")]
    ClientBuild { message: String },
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },
    #[error("Logging initialization failed: {0}")]
    LoggingInitialization(String),
}

impl From<CurrentTimeError> for McpError {
    fn from(err: CurrentTimeError) -> Self {
        match err {
            CurrentTimeError::InvalidConfig { message } => {
                McpError::invalid_params(ERROR_INVALID_CONFIG, Some(json!({"message": message})))
            }
            CurrentTimeError::ClientBuild { message } => {
                McpError::internal_error(ERROR_CLIENT_BUILD, Some(json!({"message": message})))
            }
            CurrentTimeError::Serialization(e) => McpError::internal_error(
                ERROR_SERIALIZATION,
                Some(json!({"message": e.to_string()})),
            ),
            CurrentTimeError::ResourceNotFound { uri } => McpError::resource_not_found(
                ERROR_RESOURCE_NOT_FOUND,
                Some(json!({
                    "uri": uri,
                    "available_resources": AVAILABLE_RESOURCES
                })),
            ),
            CurrentTimeError::LoggingInitialization(message) => {
                McpError::internal_error(ERROR_LOGGING_INIT, Some(json!({"message": message})))
            }
        }
    }
}

pub type GeoLookupResult<T> = Result<T, GeoLookupError>;
pub type CurrentTimeResult<T> = Result<T, CurrentTimeError>;
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::{CurrentTimeError, GeoLookupError};
    use crate::core::error::McpError;

    #[test]
    fn test_error_conversion() {
        let error = CurrentTimeError::ResourceNotFound {
            uri: "currenttime://missing".to_string(),
        };
        let mcp_error: McpError = error.into();

        assert!(mcp_error.to_string().contains("resource_not_found"));
    }

    #[test]
    fn test_invalid_ip_reason() {
        let error = GeoLookupError::InvalidIp {
            ip: "999.1.1.1".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid IP address format");
    }

    #[test]
    fn test_provider_reason_is_preserved() {
        let error = GeoLookupError::Provider {
            reason: "Reserved IP Address".to_string(),
        };
        assert!(error.to_string().contains("Reserved IP Address"));
    }
}
