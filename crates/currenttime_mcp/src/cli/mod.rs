use clap::Parser;

use crate::config::GeoConfig;
use crate::core::{error::CurrentTimeResult, utils::DEFAULT_GEO_BASE_URL};

/// CurrentTime MCP Server
///
/// Returns the current time, optionally detecting the caller's timezone from an
/// IP address through an ipapi-compatible geolocation provider.
///
/// ## Development
/// ```bash
/// npx @modelcontextprotocol/inspector cargo run --bin mcp-server-currenttime
/// ```
///
/// ## Configuration
/// Add to your MCP client configuration:
/// ```json
/// {
///   "mcpServers": {
///     "currenttime": {
///       "command": "mcp-server-currenttime",
///       "env": {
///         "IPAPI_API_KEY": "<optional key>",
///         "LOG_LEVEL": "info"
///       }
///     }
///   }
/// }
/// ```
///
/// ## Environment Variables
/// - `IPAPI_BASE_URL`: Geolocation provider base URL
/// - `IPAPI_API_KEY`: Optional provider API key, sent as the `key` query parameter
/// - `LOG_LEVEL`: Enables logging to stderr at the given level
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-server-currenttime")]
#[command(about = "An MCP server for current time with IP-based timezone detection")]
#[command(version)]
pub struct Cli {
    /// Base URL of the geolocation provider
    #[arg(long, env = "IPAPI_BASE_URL", default_value = DEFAULT_GEO_BASE_URL)]
    pub base_url: String,

    /// API key for the geolocation provider
    #[arg(long, env = "IPAPI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    /// Parse CLI arguments and convert to configuration
    pub fn parse_config() -> CurrentTimeResult<GeoConfig> {
        Self::parse().into_config()
    }

    pub fn into_config(self) -> CurrentTimeResult<GeoConfig> {
        GeoConfig::new(&self.base_url, self.api_key)
    }
}
