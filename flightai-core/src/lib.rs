// flightai-core/src/lib.rs

//! Core library for FlightAI, a ticket-price assistant for a fictional
//! airline.
//!
//! A turn sends the conversation to a chat model that may ask for the
//! `get_ticket_price` tool. When it does, the [`Orchestrator`] answers the
//! call from the [`PriceCatalog`], asks for an illustration of the
//! destination and lets the model write the final reply, which the
//! [`Narrator`] then reads aloud.

pub mod api;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod narrator;
pub mod orchestrator;
pub mod providers;
pub mod tools;

pub mod models {
    pub mod chat;
    pub mod image;
    pub mod tools;
}


pub use async_trait::async_trait;

pub use catalog::{PriceCatalog, UNKNOWN_PRICE};
pub use config::FlightAiConfig;
pub use errors::{FlightAiError, ToolError, TurnError};
pub use models::chat::{ApiResponse, ChatMessage, Choice, Role, Transcript};
pub use models::image::GeneratedImage;
pub use models::tools::{ToolCall, ToolDefinition, ToolFunction, ToolResult};
pub use narrator::Narrator;
pub use orchestrator::{
    Orchestrator, TurnOutcome, CONNECTIVITY_FAILURE_REPLY, TOOL_FAILURE_REPLY,
};
pub use tools::{ToolInvocation, ToolInvoker, ToolRequest};
