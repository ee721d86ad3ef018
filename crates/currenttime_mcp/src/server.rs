use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    RoleServer, ServerHandler,
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::*,
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use crate::config::GeoConfig;
use crate::core::{
    error::{CurrentTimeError, CurrentTimeResult, McpResult},
    geo::{GeoClient, HttpGeoTransport, SharedTransport},
    models::{ClientIpRequest, GetTimeForTimezoneRequest, OperationFailure},
    provider::{self, CurrentTimeProvider},
    timezone::{self, ResolvedTimezone},
};

/// CurrentTime MCP Server
#[derive(Clone)]
pub struct CurrentTimeService {
    provider: CurrentTimeProvider<SharedTransport>,
    local_timezone: ResolvedTimezone,
    tool_router: ToolRouter<CurrentTimeService>,
    prompt_router: PromptRouter<CurrentTimeService>,
}

impl CurrentTimeService {
    pub fn new(config: GeoConfig) -> CurrentTimeResult<Self> {
        let transport = HttpGeoTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: SharedTransport, config: GeoConfig) -> Self {
        Self {
            provider: CurrentTimeProvider::new(GeoClient::new(transport, config)),
            local_timezone: timezone::local_timezone(),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    fn create_resource_text(&self, uri: &str, name: &str) -> Resource {
        RawResource::new(uri, name.to_string()).no_annotation()
    }

    fn generate_status_content(&self) -> String {
        let local = timezone::read_now(&self.local_timezone);
        let utc = timezone::read_now(&ResolvedTimezone::utc());

        format!(
            r#"CurrentTime MCP Server Status

Server: Running
Local Timezone: {}
Current Local Time: {}
Current UTC Time: {}
DST Active: {}
Geolocation Provider: {}
Lookup Timeout: {}s
Tools Available: 4
Prompts Available: 1
Resources Available: 3

Capabilities:
- Current time with IP-based timezone detection
- Current time for any IANA timezone
- Client location lookup
- Common timezone listing"#,
            local.timezone,
            local.formatted_time,
            utc.formatted_time,
            local.is_dst,
            self.provider.geo().config().describe(),
            self.provider.geo().config().timeout.as_secs(),
        )
    }

    fn generate_help_content(&self) -> &'static str {
        r#"CurrentTime MCP Server Help

TOOLS:
- get_current_time: Current time with automatic timezone detection from IP
  - client_ip: IPv4 or IPv6 address (optional, defaults to the server's public IP)
  - Example: {"client_ip": "8.8.8.8"}

- get_time_for_timezone: Current time in a specific timezone
  - timezone_name: IANA timezone name (required)
  - Example: {"timezone_name": "Asia/Seoul"}

- get_client_info: Location and timezone details for an IP address
  - client_ip: IPv4 or IPv6 address (optional)

- list_common_timezones: Common timezones grouped by region

PROMPTS:
- timezone_guidance: Tips for using the tools

RESOURCES:
- currenttime://status: Server status and local time
- currenttime://help: This help documentation
- currenttime://timezones: Common timezone names by region

RESPONSE FIELDS:
- current_time: ISO 8601 timestamp with offset
- timezone: Timezone used for the reading
- utc_offset: Offset as +HHMM / -HHMM
- formatted_time: YYYY-MM-DD HH:MM:SS ZONE
- timestamp: Unix epoch seconds
- is_dst: Whether daylight saving time is active

FAILURES:
- Lookup failures return success=false with an error and details
- get_current_time still returns a UTC reading when the lookup fails
- Unknown timezone names read as UTC"#
    }

    fn generate_timezone_list_content(&self) -> String {
        let mut content = String::from("Common IANA Timezone Names\n");
        for (region, zones) in timezone::common_timezones() {
            content.push_str(&format!("\n{}:\n", region.to_uppercase()));
            for zone in zones {
                content.push_str(&format!("- {}\n", zone));
            }
        }
        content.push_str(&format!(
            "\nTotal timezones available: {}",
            timezone::total_available_timezones()
        ));
        content
    }
}

/// Serialize an operation's response; a panic is rendered through `on_panic`
async fn guarded<F, R, P, E>(operation: &str, response: F, on_panic: P) -> McpResult<CallToolResult>
where
    F: Future<Output = R>,
    R: Serialize,
    P: FnOnce(String) -> E,
    E: Serialize,
{
    let text = match AssertUnwindSafe(response).catch_unwind().await {
        Ok(response) => serde_json::to_string_pretty(&response),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("{} failed unexpectedly: {}", operation, message);
            serde_json::to_string_pretty(&on_panic(message))
        }
    }
    .map_err(CurrentTimeError::from)?;

    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unexpected internal error".to_string()
    }
}

#[tool_router]
impl CurrentTimeService {
    #[tool(description = "Get the current time with automatic timezone detection based on IP address")]
    pub(crate) async fn get_current_time(
        &self,
        Parameters(req): Parameters<ClientIpRequest>,
    ) -> McpResult<CallToolResult> {
        guarded(
            "get_current_time",
            self.provider.get_current_time(req.client_ip.as_deref()),
            |message| provider::utc_fallback(message, None),
        )
        .await
    }

    #[tool(description = "Get the current time for a specific IANA timezone")]
    pub(crate) async fn get_time_for_timezone(
        &self,
        Parameters(req): Parameters<GetTimeForTimezoneRequest>,
    ) -> McpResult<CallToolResult> {
        guarded(
            "get_time_for_timezone",
            async { self.provider.get_time_for_timezone(&req.timezone_name) },
            |message| OperationFailure::new(message),
        )
        .await
    }

    #[tool(description = "Get client location and timezone information based on IP address")]
    pub(crate) async fn get_client_info(
        &self,
        Parameters(req): Parameters<ClientIpRequest>,
    ) -> McpResult<CallToolResult> {
        guarded(
            "get_client_info",
            self.provider.get_client_info(req.client_ip.as_deref()),
            |message| OperationFailure::new(message),
        )
        .await
    }

    #[tool(description = "Get a list of common timezones grouped by region")]
    pub(crate) async fn list_common_timezones(&self) -> McpResult<CallToolResult> {
        guarded(
            "list_common_timezones",
            async { self.provider.list_common_timezones() },
            |message| OperationFailure::new(message),
        )
        .await
    }
}

#[prompt_router]
impl CurrentTimeService {
    /// Generate guidance for using the current time tools
    #[prompt(name = "timezone_guidance")]
    async fn timezone_guidance(
        &self,
        _ctx: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<Vec<PromptMessage>> {
        let guidance = format!(
            r#"CurrentTime Tool Guidance:

1. **Detecting the caller's time**
   - Call get_current_time with the caller's public IP as client_ip
   - Without client_ip the lookup uses this server's own public IP
   - Malformed IP addresses are rejected before any lookup

2. **Known timezones**
   - Use get_time_for_timezone with a full IANA name (e.g., 'Asia/Seoul')
   - Avoid abbreviations like 'EST' or 'KST'
   - Unknown names are not errors: the reading comes back in UTC with timezone 'UTC'
   - Compare the returned timezone with the one you asked for to catch typos

3. **Reading the result**
   - Always check 'success'
   - When get_current_time fails it still returns a UTC reading
   - 'is_dst' reflects daylight saving time at the moment of the call

4. **Server local timezone**
   - Detected as: {}"#,
            self.local_timezone.name
        );

        Ok(vec![PromptMessage {
            role: PromptMessageRole::Assistant,
            content: PromptMessageContent::text(guidance),
        }])
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for CurrentTimeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "CurrentTime MCP Server. Tools: get_current_time (IP-based timezone detection), get_time_for_timezone, get_client_info, list_common_timezones. Use IANA timezone names."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ListResourcesResult> {
        Ok(ListResourcesResult {
            resources: vec![
                self.create_resource_text("currenttime://status", "server-status"),
                self.create_resource_text("currenttime://help", "help-documentation"),
                self.create_resource_text("currenttime://timezones", "timezone-list"),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ReadResourceResult> {
        let content = match uri.as_str() {
            "currenttime://status" => self.generate_status_content(),
            "currenttime://help" => self.generate_help_content().to_string(),
            "currenttime://timezones" => self.generate_timezone_list_content(),
            _ => {
                return Err(CurrentTimeError::ResourceNotFound {
                    uri: uri.to_string(),
                }
                .into());
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(content, uri)],
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ListResourceTemplatesResult> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<InitializeResult> {
        tracing::info!("CurrentTime MCP Server initialized successfully");
        Ok(self.get_info())
    }
}

pub async fn run(config: GeoConfig) -> Result<(), Box<dyn std::error::Error>> {
    use rmcp::{ServiceExt, transport::stdio};

    tracing::info!("Using geolocation provider {}", config.describe());

    let service = CurrentTimeService::new(config)?
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    service.waiting().await?;
    Ok(())
}
