//! X API write adapter for media upload and post creation

use async_trait::async_trait;
use autotweet_domain::{PublishError, PublishResult, Publisher};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// X API publisher using an OAuth2 user-context token
pub struct XPublisher {
    client: Client,
    user_token: SecretString,
    base_url: String,
    max_chars: usize,
}

impl XPublisher {
    pub fn new(
        user_token: SecretString,
        max_chars: usize,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        Self::with_base_url(
            user_token,
            "https://api.x.com".to_string(),
            max_chars,
            timeout,
        )
    }

    pub fn with_base_url(
        user_token: SecretString,
        base_url: String,
        max_chars: usize,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        let client = crate::http_client(timeout).map_err(|e| PublishError::Api(e.to_string()))?;

        Ok(Self {
            client,
            user_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_chars,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.user_token.expose_secret())
    }

    /// Map auth/rate-limit/other failures, passing successful responses through
    async fn check(response: Response, what: &str) -> Result<Response, PublishError> {
        if response.status() == 401 {
            return Err(PublishError::Auth("Invalid user token".to_string()));
        }

        if response.status() == 429 {
            return Err(PublishError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api(format!(
                "Failed to {} ({}): {}",
                what, status, body
            )));
        }

        Ok(response)
    }
}

#[derive(Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia<'a>>,
}

#[derive(Serialize)]
struct TweetMedia<'a> {
    media_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct MediaMetadataRequest<'a> {
    id: &'a str,
    metadata: MediaMetadata<'a>,
}

#[derive(Serialize)]
struct MediaMetadata<'a> {
    alt_text: AltTextBody<'a>,
}

#[derive(Serialize)]
struct AltTextBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct DataResponse {
    data: IdData,
}

#[derive(Deserialize)]
struct IdData {
    id: String,
}

#[async_trait]
impl Publisher for XPublisher {
    async fn upload_media(&self, jpeg: &[u8]) -> Result<String, PublishError> {
        let part = Part::bytes(jpeg.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| PublishError::Media(e.to_string()))?;
        let form = Form::new()
            .text("media_category", "tweet_image")
            .part("media", part);

        let response = self
            .client
            .post(format!("{}/2/media/upload", self.base_url))
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Media(e.to_string()))?;

        let response = Self::check(response, "upload media").await?;
        let uploaded: DataResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Media(e.to_string()))?;

        Ok(uploaded.data.id)
    }

    async fn set_alt_text(&self, media_id: &str, alt_text: &str) -> Result<(), PublishError> {
        let request = MediaMetadataRequest {
            id: media_id,
            metadata: MediaMetadata {
                alt_text: AltTextBody { text: alt_text },
            },
        };

        let response = self
            .client
            .post(format!("{}/2/media/metadata", self.base_url))
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        Self::check(response, "set media alt text").await?;
        Ok(())
    }

    async fn create_post(
        &self,
        text: &str,
        media_id: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let len = text.chars().count();
        if len > self.max_chars {
            return Err(PublishError::ContentTooLong {
                len,
                max: self.max_chars,
            });
        }

        let request = CreateTweetRequest {
            text,
            media: media_id.map(|id| TweetMedia {
                media_ids: vec![id],
            }),
        };

        let response = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        let response = Self::check(response, "create tweet").await?;
        let tweet: DataResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        Ok(PublishResult {
            url: Some(format!("https://x.com/i/status/{}", tweet.data.id)),
            id: tweet.data.id,
        })
    }

    fn platform(&self) -> &'static str {
        "x"
    }
}
