// flightai-core/src/orchestrator.rs

//! Drives one conversation turn against the chat model.
//!
//! A turn is a two-round protocol at most:
//!
//! ```text
//! AwaitingFirstResponse ──(no tool call)──────────────────────────────► Done
//!          │
//!          └─(tool call)─► ExecutingTool ─► AwaitingFinalResponse ─────► Done
//! ```
//!
//! Only the first tool call of a response is serviced. Failures never escape
//! a turn: they become one of two fixed apology replies.

use crate::api;
use crate::audio::AudioPlayer;
use crate::config::FlightAiConfig;
use crate::errors::TurnError;
use crate::models::chat::{ChatMessage, Transcript};
use crate::models::image::GeneratedImage;
use crate::models::tools::ToolDefinition;
use crate::narrator::Narrator;
use crate::providers::images::vacation_prompt;
use crate::providers::{
    ChatProvider, ImageGenerator, OpenAIChatProvider, OpenAIImageGenerator,
    OpenAISpeechSynthesizer,
};
use crate::tools::ToolInvoker;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Reply used when a requested tool could not be handled.
pub const TOOL_FAILURE_REPLY: &str = "Sorry, I encountered an error with my tools.";
/// Reply used when the chat service failed or answered with something unusable.
pub const CONNECTIVITY_FAILURE_REPLY: &str =
    "I'm sorry, I'm having trouble connecting to my services right now.";

/// What a turn hands back to the presentation layer.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The caller's transcript plus exactly one new assistant message.
    pub transcript: Transcript,
    pub image: Option<GeneratedImage>,
}

impl TurnOutcome {
    /// Text of the assistant message this turn appended.
    pub fn reply(&self) -> &str {
        self.transcript
            .last()
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default()
    }
}

struct TurnReply {
    text: String,
    image: Option<GeneratedImage>,
}

#[derive(Debug)]
enum TurnStep {
    AwaitingFirstResponse,
    /// Holds the assistant message that requested the tool.
    ExecutingTool(ChatMessage),
    AwaitingFinalResponse,
    Done(String),
}

pub struct Orchestrator {
    system_prompt: String,
    chat: Arc<dyn ChatProvider>,
    tools: ToolInvoker,
    images: Option<Arc<dyn ImageGenerator>>,
    narrator: Option<Narrator>,
}

impl Orchestrator {
    pub fn new(
        system_prompt: impl Into<String>,
        chat: Arc<dyn ChatProvider>,
        tools: ToolInvoker,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            chat,
            tools,
            images: None,
            narrator: None,
        }
    }

    pub fn with_images(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Wires the OpenAI-backed services described by `config`.
    pub fn from_config(
        config: &FlightAiConfig,
        api_key: String,
        player: Arc<dyn AudioPlayer>,
    ) -> Result<Self> {
        let http_client = api::build_http_client(config.timeout())?;
        let chat = Arc::new(OpenAIChatProvider::new(
            config,
            http_client.clone(),
            api_key.clone(),
        ));
        let mut orchestrator = Self::new(
            config.system_prompt.clone(),
            chat,
            ToolInvoker::new(config.catalog()),
        );
        if config.image.enabled {
            orchestrator = orchestrator.with_images(Arc::new(OpenAIImageGenerator::new(
                config,
                http_client.clone(),
                api_key.clone(),
            )));
        }
        if config.speech.enabled {
            let synthesizer = Arc::new(OpenAISpeechSynthesizer::new(config, http_client, api_key));
            orchestrator = orchestrator.with_narrator(Narrator::new(synthesizer, player));
        }
        info!(
            model = %config.chat.model_name,
            images = config.image.enabled,
            speech = config.speech.enabled,
            "Initialized orchestrator."
        );
        Ok(orchestrator)
    }

    /// Appends the user's text to `transcript` and runs a turn.
    pub async fn handle_user_message(
        &self,
        mut transcript: Transcript,
        user_text: &str,
    ) -> TurnOutcome {
        transcript.push_user(user_text);
        self.respond(transcript).await
    }

    /// Runs one turn over `transcript`, whose last message is normally the
    /// user's. Always appends exactly one assistant message.
    pub async fn respond(&self, mut transcript: Transcript) -> TurnOutcome {
        info!(num_messages = transcript.len(), "Starting turn.");

        let (reply, image) = match self.run_turn(&transcript).await {
            Ok(TurnReply { text, image }) => (text, image),
            Err(e @ TurnError::Tool(_)) => {
                error!(error = %e, "Tool handling failed; replying with apology.");
                (TOOL_FAILURE_REPLY.to_string(), None)
            }
            Err(e) => {
                error!(error = %e, "An error occurred in the chat logic.");
                (CONNECTIVITY_FAILURE_REPLY.to_string(), None)
            }
        };

        transcript.push_assistant(reply.clone());
        info!(has_image = image.is_some(), "Turn finished.");

        if let Some(narrator) = &self.narrator {
            narrator.speak(&reply).await;
        }

        TurnOutcome { transcript, image }
    }

    async fn run_turn(&self, transcript: &Transcript) -> Result<TurnReply, TurnError> {
        let mut messages = Vec::with_capacity(transcript.len() + 3);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend(transcript.messages().iter().cloned());

        let tool_definitions = self.tools.definitions();
        let mut image = None;
        let mut step = TurnStep::AwaitingFirstResponse;

        loop {
            trace!(step = ?step, "Turn step.");
            step = match step {
                TurnStep::AwaitingFirstResponse => {
                    let response = self.complete(&messages, Some(&tool_definitions)).await?;
                    if response.has_tool_calls() {
                        if response.content.as_deref().is_some_and(|c| !c.is_empty()) {
                            debug!("Discarding content that accompanied a tool call.");
                        }
                        TurnStep::ExecutingTool(response)
                    } else {
                        TurnStep::Done(response.content.ok_or(TurnError::MissingContent)?)
                    }
                }
                TurnStep::ExecutingTool(mut request) => {
                    let mut calls = request.tool_calls.take().unwrap_or_default();
                    if calls.len() > 1 {
                        warn!(
                            count = calls.len(),
                            "Model requested several tool calls; only the first is serviced."
                        );
                    }
                    calls.truncate(1);
                    let call = calls
                        .first()
                        .cloned()
                        .ok_or_else(|| TurnError::Chat(anyhow!("Tool call list was empty")))?;
                    // The model has to see its own request in the follow-up.
                    request.tool_calls = Some(calls);
                    messages.push(request);

                    let invocation = self.tools.invoke(&call)?;
                    messages.push(ChatMessage::tool(
                        invocation.result.tool_call_id,
                        invocation.result.payload,
                    ));

                    if let Some(city) = invocation.destination_city.as_deref() {
                        image = self.illustrate(city).await;
                    }
                    TurnStep::AwaitingFinalResponse
                }
                TurnStep::AwaitingFinalResponse => {
                    let response = self.complete(&messages, None).await?;
                    TurnStep::Done(response.content.ok_or(TurnError::MissingContent)?)
                }
                TurnStep::Done(text) => return Ok(TurnReply { text, image }),
            };
        }
    }

    /// One chat round trip; returns the first choice's message.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatMessage, TurnError> {
        debug!(
            provider = %self.chat.name(),
            num_messages = messages.len(),
            with_tools = tools.is_some(),
            "Requesting chat completion."
        );
        let response = self
            .chat
            .get_completion(messages.to_vec(), tools)
            .await
            .map_err(TurnError::Chat)?;
        response.into_first_message().ok_or_else(|| {
            error!("API response contained no choices.");
            TurnError::Chat(anyhow!("API response contained no choices"))
        })
    }

    async fn illustrate(&self, city: &str) -> Option<GeneratedImage> {
        let images = self.images.as_ref()?;
        info!(city = %city, "Generating image for {}", city);
        match images.generate(&vacation_prompt(city)).await {
            Ok(image) => Some(image),
            Err(e) => {
                error!(city = %city, error = %format!("{:#}", e), "Error generating image.");
                None
            }
        }
    }
}
