// flightai-core/src/tools/mod.rs

//! Local functions the model may ask to run, and the dispatcher that runs them.
//!
//! Only one tool exists today, `get_ticket_price`. A request naming anything
//! else is rejected with [`ToolError::UnknownTool`]; the orchestrator turns
//! that into an apology for the turn rather than retrying.

pub mod ticket_price;

use crate::catalog::PriceCatalog;
use crate::errors::ToolError;
use crate::models::tools::{ToolCall, ToolDefinition, ToolResult};
use ticket_price::{TicketPriceArgs, TicketPriceOutput};
use tracing::{debug, info, warn};

/// A model-issued tool call, validated against the tool it names.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    GetTicketPrice { destination_city: String },
}

impl TryFrom<&ToolCall> for ToolRequest {
    type Error = ToolError;

    fn try_from(call: &ToolCall) -> Result<Self, Self::Error> {
        match call.function.name.as_str() {
            ticket_price::NAME => {
                let args: TicketPriceArgs = serde_json::from_str(&call.function.arguments)
                    .map_err(|e| ToolError::MalformedArguments {
                        tool: ticket_price::NAME.to_string(),
                        reason: e.to_string(),
                    })?;
                if args.destination_city.trim().is_empty() {
                    return Err(ToolError::MalformedArguments {
                        tool: ticket_price::NAME.to_string(),
                        reason: "'destination_city' is empty".to_string(),
                    });
                }
                Ok(ToolRequest::GetTicketPrice {
                    destination_city: args.destination_city,
                })
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// What running a tool produced: the message-ready result plus the city the
/// call was about, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub result: ToolResult,
    pub destination_city: Option<String>,
}

/// Dispatches tool calls to their local implementation.
#[derive(Debug, Clone, Default)]
pub struct ToolInvoker {
    catalog: PriceCatalog,
}

impl ToolInvoker {
    pub fn new(catalog: PriceCatalog) -> Self {
        Self { catalog }
    }

    /// Schemas advertised to the model on the first request of a turn.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ticket_price::definition()]
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn invoke(&self, call: &ToolCall) -> Result<ToolInvocation, ToolError> {
        debug!(tool_call_id = %call.id, tool_name = %call.function.name, arguments = %call.function.arguments, "Processing request for tool '{}'.", call.function.name);

        let request = ToolRequest::try_from(call).inspect_err(|e| {
            warn!(tool_call_id = %call.id, error = %e, "Rejected tool call.");
        })?;

        match request {
            ToolRequest::GetTicketPrice { destination_city } => {
                let price = self.catalog.lookup(&destination_city);
                let payload = serde_json::to_string(&TicketPriceOutput {
                    destination_city: &destination_city,
                    price: &price,
                })
                .map_err(|e| ToolError::MalformedArguments {
                    tool: ticket_price::NAME.to_string(),
                    reason: format!("failed to serialize result: {}", e),
                })?;
                info!(tool_call_id = %call.id, city = %destination_city, price = %price, "Tool '{}' executed successfully.", ticket_price::NAME);
                Ok(ToolInvocation {
                    result: ToolResult {
                        tool_call_id: call.id.clone(),
                        payload,
                    },
                    destination_city: Some(destination_city),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tools::ToolFunction;
    use serde_json::{json, Value};

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_abc".to_string(),
            call_type: "function".to_string(),
            function: ToolFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[test]
    fn test_definition_requires_destination_city() {
        let defs = ToolInvoker::default().definitions();
        assert_eq!(defs.len(), 1);
        let value = serde_json::to_value(&defs[0]).unwrap();
        assert_eq!(value["name"], "get_ticket_price");
        assert_eq!(value["parameters"]["type"], "object");
        assert_eq!(value["parameters"]["required"], json!(["destination_city"]));
        assert_eq!(
            value["parameters"]["properties"]["destination_city"]["type"],
            "string"
        );
    }

    #[test]
    fn test_invoke_known_city() {
        let invoker = ToolInvoker::default();
        let invocation = invoker
            .invoke(&call("get_ticket_price", r#"{"destination_city":"Berlin"}"#))
            .unwrap();
        assert_eq!(invocation.destination_city.as_deref(), Some("Berlin"));
        assert_eq!(invocation.result.tool_call_id, "call_abc");
        let payload: Value = serde_json::from_str(&invocation.result.payload).unwrap();
        assert_eq!(payload, json!({ "destination_city": "Berlin", "price": "$499" }));
    }

    #[test]
    fn test_invoke_unknown_city_reports_sentinel() {
        let invocation = ToolInvoker::default()
            .invoke(&call("get_ticket_price", r#"{"destination_city":"Gotham"}"#))
            .unwrap();
        let payload: Value = serde_json::from_str(&invocation.result.payload).unwrap();
        assert_eq!(payload["price"], "Unknown");
        assert_eq!(invocation.destination_city.as_deref(), Some("Gotham"));
    }

    #[test]
    fn test_invoke_missing_argument_is_malformed() {
        let err = ToolInvoker::default()
            .invoke(&call("get_ticket_price", r#"{"city":"Paris"}"#))
            .unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { ref tool, .. } if tool == "get_ticket_price"));
    }

    #[test]
    fn test_invoke_invalid_json_is_malformed() {
        let err = ToolInvoker::default()
            .invoke(&call("get_ticket_price", "not json"))
            .unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn test_invoke_blank_city_is_malformed() {
        let err = ToolInvoker::default()
            .invoke(&call("get_ticket_price", r#"{"destination_city":"  "}"#))
            .unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn test_invoke_unknown_tool() {
        let err = ToolInvoker::default()
            .invoke(&call("book_flight", r#"{"destination_city":"Paris"}"#))
            .unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("book_flight".to_string()));
    }

    #[test]
    fn test_invoke_uses_configured_catalog() {
        let invoker = ToolInvoker::new(PriceCatalog::from_entries([("Lisbon", "$610")]));
        let invocation = invoker
            .invoke(&call("get_ticket_price", r#"{"destination_city":"LISBON"}"#))
            .unwrap();
        let payload: Value = serde_json::from_str(&invocation.result.payload).unwrap();
        assert_eq!(payload, json!({ "destination_city": "LISBON", "price": "$610" }));
    }
}
