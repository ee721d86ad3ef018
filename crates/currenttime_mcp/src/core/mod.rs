//! # CurrentTime MCP Server Core
//!
//! Current time readings with optional IP-based timezone detection.
//!
//! ## Features
//! - Geolocation lookup against an ipapi-compatible provider
//! - Timezone resolution that degrades to UTC instead of failing
//! - Current time rendering with offset, abbreviation, and DST flag
//!
//! ## Modules
//! - `error`: Lookup and server error types
//! - `geo`: Geolocation client and its HTTP transport
//! - `models`: Request and response structures
//! - `provider`: The tool operations, composed from `geo` and `timezone`
//! - `timezone`: Timezone resolution and time formatting
//! - `utils`: Shared constants and helpers

pub mod error;
pub mod geo;
pub mod models;
pub mod provider;
pub mod timezone;
pub mod utils;
