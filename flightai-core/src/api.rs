// flightai-core/src/api.rs

//! Handles the HTTP plumbing shared by the remote AI services.

use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::{ToolChoice, ToolDefinition};
use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client, Method, Response, Url};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

/// Helper function to format headers for logging, excluding Authorization.
fn format_headers_for_log(headers: &header::HeaderMap) -> String {
    let mut formatted = String::from("{");
    for (name, value) in headers.iter() {
        if name != header::AUTHORIZATION {
            if formatted.len() > 1 {
                formatted.push_str(", ");
            }
            formatted.push_str(&format!(
                "\"{}\": \"{}\"",
                name.as_str(),
                value.to_str().unwrap_or("<invalid header value>")
            ));
        }
    }
    formatted.push('}');
    formatted
}

/// Builds the one HTTP client the providers share.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Builds an OpenAI-compatible chat completion request body.
///
/// `tool_choice` is only sent when tools are advertised.
pub fn build_chat_payload(
    model_name: &str,
    messages: &[ChatMessage],
    tools: Option<&[ToolDefinition]>,
    tool_choice: ToolChoice,
    parameters: Option<&toml::Value>,
) -> Result<Value> {
    let mut payload = Map::new();
    payload.insert("model".to_string(), json!(model_name));
    payload.insert("messages".to_string(), json!(messages));

    if let Some(tools) = tools.filter(|t| !t.is_empty()) {
        let tools_with_type: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    }
                })
            })
            .collect();
        payload.insert("tools".to_string(), json!(tools_with_type));
        payload.insert("tool_choice".to_string(), json!(tool_choice.as_str()));
        trace!(num_tools = tools.len(), "Added tools to chat payload.");
    }

    if let Some(params_table) = parameters.and_then(toml::Value::as_table) {
        for (key, value) in params_table {
            let json_value: Value = value.clone().try_into().map_err(|e| {
                error!(key = %key, error = %e, "Failed to convert TOML parameter to JSON");
                anyhow!("Failed to convert TOML parameter '{}' to JSON: {}", key, e)
            })?;
            payload.insert(key.clone(), json_value);
            trace!(key = %key, "Added parameter to chat payload.");
        }
    }

    Ok(Value::Object(payload))
}

/// POSTs a JSON body with bearer authentication and fails on non-2xx.
pub async fn post_json(
    http_client: &Client,
    endpoint_str: &str,
    api_key: &str,
    payload: &Value,
) -> Result<Response> {
    let endpoint = Url::parse(endpoint_str)
        .with_context(|| format!("Failed to parse endpoint URL: {}", endpoint_str))?;

    if api_key.is_empty() {
        warn!("API key is empty. API call might fail if endpoint requires authentication.");
    }
    if tracing::enabled!(tracing::Level::TRACE) {
        trace!(payload = %serde_json::to_string_pretty(payload).unwrap_or_default(), "Full request payload");
    }

    let mut request_builder = http_client
        .request(Method::POST, endpoint.clone())
        .header(header::CONTENT_TYPE, "application/json");
    if !api_key.is_empty() {
        request_builder = request_builder.bearer_auth(api_key);
    }
    let request = request_builder
        .json(payload)
        .build()
        .context("Failed to build request object")?;

    debug!(
        endpoint = %request.url(),
        method = %request.method(),
        headers = %format_headers_for_log(request.headers()),
        "Sending API request"
    );

    let response = http_client.execute(request).await.map_err(|e| {
        error!(error = %e, endpoint = %endpoint.as_str(), "Failed to send request or receive response headers");
        anyhow!(e).context(format!("Failed to send request to {}", endpoint.as_str()))
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .context("Failed to read API error response body")?;
        debug!(status = %status, body = %error_text, "API request failed.");
        return Err(anyhow!("API error: {} - {}", status, error_text));
    }
    Ok(response)
}

/// Makes a chat completion request and parses the response.
pub async fn call_chat_completion_api(
    http_client: &Client,
    endpoint: &str,
    api_key: &str,
    payload: &Value,
) -> Result<ApiResponse> {
    let response = post_json(http_client, endpoint, api_key, payload).await?;
    let body = response
        .text()
        .await
        .context("Failed to read API response body")?;
    trace!(body = %body, "Raw chat completion response");
    parse_chat_response(&body)
}

/// Parses a chat completion body, inserting a synthetic `id` if the server
/// omitted one.
pub fn parse_chat_response(body: &str) -> Result<ApiResponse> {
    let response_value: Value = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse API response as JSON: {}", body))?;

    let mut response_json_obj = match response_value {
        Value::Object(map) => map,
        other => return Err(anyhow!("API response was not a JSON object: {:?}", other)),
    };

    if !response_json_obj.contains_key("id") {
        let new_id = format!("chatcmpl-{}", Uuid::new_v4());
        debug!("Added missing 'id' field to API response with value: {}", new_id);
        response_json_obj.insert("id".to_string(), json!(new_id));
    }

    let api_response: ApiResponse = serde_json::from_value(Value::Object(response_json_obj))
        .context("Failed to deserialize API response")?;

    match api_response.choices.first() {
        Some(choice) if choice.message.has_tool_calls() => {
            debug!(tool_calls = ?choice.message.tool_calls, "Response requests tool calls");
        }
        Some(_) => debug!("No tool calls"),
        None => debug!("Response has empty 'choices' array"),
    }
    Ok(api_response)
}
