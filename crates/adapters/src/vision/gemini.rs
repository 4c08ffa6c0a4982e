//! Google Gemini API adapter

use async_trait::async_trait;
use autotweet_domain::{VisionDescriber, VisionError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DESCRIBE_PROMPT, VisionConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini image describer
pub struct GeminiDescriber {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: VisionConfig,
}

impl GeminiDescriber {
    pub fn new(api_key: SecretString, config: VisionConfig) -> Result<Self, VisionError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(
        api_key: SecretString,
        base_url: String,
        config: VisionConfig,
    ) -> Result<Self, VisionError> {
        let client = crate::http_client(Duration::from_secs(config.timeout_secs))
            .map_err(|e| VisionError::Api(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl VisionDescriber for GeminiDescriber {
    async fn describe(&self, jpeg: &[u8]) -> Result<String, VisionError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text {
                        text: DESCRIBE_PROMPT.to_string(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data: STANDARD.encode(jpeg),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::Timeout
                } else {
                    VisionError::Api(e.without_url().to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(VisionError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(VisionError::InvalidFormat("Empty response".to_string()));
        }

        tracing::debug!(model = %self.config.model, chars = text.len(), "Generated alt text");
        Ok(text.trim().to_string())
    }
}
