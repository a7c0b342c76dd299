// flightai-core/src/providers/mod.rs

//! Remote AI services the orchestrator and narrator depend on.
//!
//! Each service sits behind a trait so turns can run against mocks; the
//! OpenAI implementations share one `reqwest::Client` and API key.

use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::image::GeneratedImage;
use crate::models::tools::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;

pub mod images;
pub mod openai;
pub mod speech;

pub use images::OpenAIImageGenerator;
pub use openai::OpenAIChatProvider;
pub use speech::OpenAISpeechSynthesizer;

/// Chat completion service.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends `messages`; when `tools` is `Some` and non-empty they are
    /// advertised with automatic tool choice.
    async fn get_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse>;
    fn name(&self) -> &str;
}

/// Image generation service. One image per prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Text-to-speech service. Returns compressed (MP3) audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
