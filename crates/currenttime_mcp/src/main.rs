use std::env;
use tracing_subscriber::{self, EnvFilter};

mod cli;
mod config;
mod core;
mod server;

use cli::Cli;
use crate::core::error::{CurrentTimeError, CurrentTimeResult};

/// Initialize logging only if the LOG_LEVEL environment variable is set.
///
/// Logs go to stderr; stdout carries the MCP stream.
fn init_logging() -> CurrentTimeResult<bool> {
    let Ok(log_level) = env::var("LOG_LEVEL") else {
        return Ok(false);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| CurrentTimeError::LoggingInitialization(e.to_string()))?;

    tracing::info!("Starting CurrentTime MCP server with log level: {}", log_level);
    Ok(true)
}

/// CurrentTime MCP Server
///
/// Tools: get_current_time, get_time_for_timezone, get_client_info, list_common_timezones
///
/// Usage: npx @modelcontextprotocol/inspector cargo run --bin mcp-server-currenttime
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse_config()?;
    let logging = init_logging()?;

    if let Err(e) = server::run(config).await {
        if logging {
            tracing::error!("Error running CurrentTime MCP server: {}", e);
        }
        return Err(e);
    }

    Ok(())
}
