// flightai-core/src/errors.rs
use thiserror::Error;

/// Errors raised while setting the assistant up, before any turn runs.
#[derive(Error, Debug)]
pub enum FlightAiError {
    /// Error related to configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// The credential for the remote services is not available.
    #[error("API key not found: set the {0} environment variable or add it to .env")]
    MissingApiKey(String),

    /// Local audio playback is unavailable or failed.
    #[error("Audio Error: {0}")]
    Audio(String),
}

impl FlightAiError {
    pub fn config(msg: impl Into<String>) -> Self {
        FlightAiError::Config(msg.into())
    }
}

/// Failures of a model-issued tool call. Always local to the turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool requested: '{0}'")]
    UnknownTool(String),

    #[error("Malformed arguments for tool '{tool}': {reason}")]
    MalformedArguments { tool: String, reason: String },
}

/// Why a turn could not produce a model-written reply.
#[derive(Error, Debug)]
pub enum TurnError {
    /// The chat service failed or returned something unusable.
    #[error("Chat service error: {0:#}")]
    Chat(#[source] anyhow::Error),

    /// The requested tool could not be handled.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The model answered with neither content nor a tool call.
    #[error("Chat response contained no content")]
    MissingContent,
}
