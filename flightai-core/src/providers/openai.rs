// flightai-core/src/providers/openai.rs
use super::ChatProvider;
use crate::api;
use crate::config::FlightAiConfig;
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::{ToolChoice, ToolDefinition};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct OpenAIChatProvider {
    model_name: String,
    endpoint: String,
    parameters: Option<toml::Value>,
    http_client: Client,
    api_key: String,
}

impl OpenAIChatProvider {
    pub fn new(config: &FlightAiConfig, http_client: Client, api_key: String) -> Self {
        if api_key.is_empty() {
            warn!(
                "API key is empty for OpenAI chat model {}. The API call will likely fail.",
                config.chat.model_name
            );
        }
        Self {
            model_name: config.chat.model_name.clone(),
            endpoint: config.endpoint("chat/completions"),
            parameters: config.chat.parameters.clone(),
            http_client,
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatProvider for OpenAIChatProvider {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn get_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse> {
        debug!(
            model = %self.model_name,
            endpoint = %self.endpoint,
            num_messages = messages.len(),
            with_tools = tools.is_some_and(|t| !t.is_empty()),
            "Sending request to chat model."
        );
        let payload = api::build_chat_payload(
            &self.model_name,
            &messages,
            tools,
            ToolChoice::Auto,
            self.parameters.as_ref(),
        )?;
        api::call_chat_completion_api(&self.http_client, &self.endpoint, &self.api_key, &payload)
            .await
    }
}
