// flightai-core/src/tools/ticket_price.rs
use crate::models::tools::{
    ToolDefinition, ToolParameter, ToolParameterType, ToolParametersDefinition,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NAME: &str = "get_ticket_price";

/// Arguments the model must send with a `get_ticket_price` call.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TicketPriceArgs {
    pub destination_city: String,
}

/// Payload handed back to the model after a lookup.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TicketPriceOutput<'a> {
    pub destination_city: &'a str,
    pub price: &'a str,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: "Get the price of a return ticket to the destination city. Call this whenever you need to know the ticket price.".to_string(),
        parameters: ToolParametersDefinition {
            param_type: "object".to_string(),
            properties: BTreeMap::from([(
                "destination_city".to_string(),
                ToolParameter {
                    param_type: ToolParameterType::String,
                    description: "The city that the customer wants to travel to.".to_string(),
                },
            )]),
            required: vec!["destination_city".to_string()],
        },
    }
}
