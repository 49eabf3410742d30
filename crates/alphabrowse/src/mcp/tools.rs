use crate::backend::BrowseBackend;
use crate::prelude::*;
use crate::service::BrowseService;
use serde::{Deserialize, Serialize};

use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

fn internal_error(e: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError::new(-32603, format!("Internal error: {e}"))
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments.unwrap_or(serde_json::json!({})))
        .map_err(|e| JsonRpcError::new(-32602, format!("Invalid arguments: {e}")))
}

/// Map service errors: bad input is the caller's fault, the rest is ours
fn tool_error(err: Error) -> JsonRpcError {
    match err {
        Error::InvalidRequest(_) | Error::PermissionDenied(_) => {
            JsonRpcError::new(-32602, err.to_string())
        }
        _ => JsonRpcError::new(-32603, format!("Tool execution error: {err}")),
    }
}

fn text_result(value: &impl Serialize) -> Result<serde_json::Value, JsonRpcError> {
    let json_string = serde_json::to_string_pretty(value)
        .map_err(|e| JsonRpcError::new(-32603, format!("Serialization error: {e}")))?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(internal_error)
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "alphabrowse".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "alphabrowse".to_string(),
            description: "Browse an alphabetical heading index (subjects, authors, titles, call numbers) starting at a given term. Returns a page of headings with record counts, the row nearest to the term, and the page indices to continue browsing backwards or forwards.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "source": {
                        "type": "string",
                        "description": "Browse index to use (see alphabrowse_types), e.g. 'topic', 'author', 'title', 'lcc'"
                    },
                    "from": {
                        "type": "string",
                        "description": "Heading to start browsing from"
                    },
                    "page": {
                        "type": "number",
                        "description": "Page relative to the starting heading, negative pages go backwards (default: 0)"
                    }
                },
                "required": ["source", "from"]
            }),
        },
        Tool {
            name: "alphabrowse_nearby".to_string(),
            description: "List titled records shelved near a call number. Returns the records whose call numbers sort just before and after the given one.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "from": {
                        "type": "string",
                        "description": "Call number to look around"
                    }
                },
                "required": ["from"]
            }),
        },
        Tool {
            name: "alphabrowse_types".to_string(),
            description: "List the browse indexes available to the alphabrowse tool, with their labels.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(internal_error)
}

pub async fn handle_tools_call<B: BrowseBackend>(
    params: Option<serde_json::Value>,
    service: &BrowseService<B>,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::new(-32602, format!("Invalid params: {e}")))?;

    match params.name.as_str() {
        "alphabrowse" => handle_alphabrowse(params.arguments, service).await,
        "alphabrowse_nearby" => handle_nearby(params.arguments, service).await,
        "alphabrowse_types" => text_result(&service.types()),
        _ => Err(JsonRpcError::new(
            -32602,
            format!("Unknown tool: {}", params.name),
        )),
    }
}

async fn handle_alphabrowse<B: BrowseBackend>(
    arguments: Option<serde_json::Value>,
    service: &BrowseService<B>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct AlphabrowseArgs {
        source: String,
        from: String,
        page: Option<i64>,
    }

    let args: AlphabrowseArgs = parse_arguments(arguments)?;

    log::debug!(
        "Calling alphabrowse: source={}, from={}, page={:?}",
        args.source,
        args.from,
        args.page
    );

    let output = service
        .browse(&args.source, Some(args.from), args.page.unwrap_or(0))
        .await
        .map_err(tool_error)?;

    text_result(&output)
}

async fn handle_nearby<B: BrowseBackend>(
    arguments: Option<serde_json::Value>,
    service: &BrowseService<B>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct NearbyArgs {
        from: String,
    }

    let args: NearbyArgs = parse_arguments(arguments)?;
    log::debug!("Calling alphabrowse_nearby: from={}", args.from);

    let output = service.nearby(&args.from).await.map_err(tool_error)?;
    text_result(&output)
}
