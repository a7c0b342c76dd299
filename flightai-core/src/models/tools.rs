// flightai-core/src/models/tools.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- Structs for AI Tool Interaction ---

/// Represents a tool call requested by the AI model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String, // Usually "function"
    pub function: ToolFunction,
}

fn default_call_type() -> String {
    "function".to_string()
}

/// Represents the function call details within a ToolCall.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolFunction {
    pub name: String,
    /// Arguments are expected to be a JSON string by the AI model
    pub arguments: String,
}

/// The output of a local tool, correlated to its [`ToolCall`] by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    /// Serialized JSON payload handed back to the model.
    pub payload: String,
}

// --- Tool Definition ---

/// Defines the schema for a tool that can be presented to the AI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParametersDefinition,
}

/// Defines the parameters structure for a tool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParametersDefinition {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: BTreeMap<String, ToolParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// Defines a single parameter within a tool's schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: String,
}

/// Represents the type of a tool parameter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// How the model may pick tools on a request that advertises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
            ToolChoice::Required => "required",
        }
    }
}
