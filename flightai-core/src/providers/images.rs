// flightai-core/src/providers/images.rs
use super::ImageGenerator;
use crate::api;
use crate::config::FlightAiConfig;
use crate::models::image::GeneratedImage;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Prompt used to illustrate a destination.
pub fn vacation_prompt(city: &str) -> String {
    format!(
        "An image representing a vacation in {city}, showing tourist spots and everything unique about {city}, in a vibrant pop-art style."
    )
}

#[derive(Deserialize, Debug)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    b64_json: Option<String>,
}

#[derive(Clone)]
pub struct OpenAIImageGenerator {
    model: String,
    size: String,
    endpoint: String,
    http_client: Client,
    api_key: String,
}

impl OpenAIImageGenerator {
    pub fn new(config: &FlightAiConfig, http_client: Client, api_key: String) -> Self {
        Self {
            model: config.image.model.clone(),
            size: config.image.size.clone(),
            endpoint: config.endpoint("images/generations"),
            http_client,
            api_key,
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAIImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        debug!(model = %self.model, size = %self.size, "Requesting image generation.");
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "size": self.size,
            "n": 1,
            "response_format": "b64_json",
        });
        let response = api::post_json(&self.http_client, &self.endpoint, &self.api_key, &payload)
            .await?;
        let body: ImagesResponse = response
            .json()
            .await
            .context("Failed to read image generation response as JSON")?;

        let encoded = body
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| anyhow!("Image generation response contained no image data"))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .context("Image payload is not valid base64")?;
        let image = GeneratedImage::from_bytes(bytes)?;
        info!(width = image.width, height = image.height, format = ?image.format, "Generated image.");
        Ok(image)
    }
}
