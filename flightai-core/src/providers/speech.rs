// flightai-core/src/providers/speech.rs
use super::SpeechSynthesizer;
use crate::api;
use crate::config::FlightAiConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

#[derive(Clone)]
pub struct OpenAISpeechSynthesizer {
    model: String,
    voice: String,
    endpoint: String,
    http_client: Client,
    api_key: String,
}

impl OpenAISpeechSynthesizer {
    pub fn new(config: &FlightAiConfig, http_client: Client, api_key: String) -> Self {
        Self {
            model: config.speech.model.clone(),
            voice: config.speech.voice.clone(),
            endpoint: config.endpoint("audio/speech"),
            http_client,
            api_key,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        debug!(model = %self.model, voice = %self.voice, chars = text.chars().count(), "Requesting speech synthesis.");
        let payload = json!({
            "model": self.model,
            "voice": self.voice,
            "input": text,
        });
        let response = api::post_json(&self.http_client, &self.endpoint, &self.api_key, &payload)
            .await?;
        let audio = response
            .bytes()
            .await
            .context("Failed to read speech synthesis response body")?;
        if audio.is_empty() {
            return Err(anyhow!("Speech synthesis returned no audio"));
        }
        debug!(bytes = audio.len(), "Received synthesized audio.");
        Ok(audio.to_vec())
    }
}
