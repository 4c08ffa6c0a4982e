//! X (Twitter) API adapters

mod write;

pub use write::XPublisher;

use async_trait::async_trait;
use autotweet_domain::{PublishError, PublishResult, Publisher};
use std::sync::Mutex;

/// A post captured by [`StubPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubPost {
    pub text: String,
    pub media_id: Option<String>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Default)]
struct StubState {
    uploads: usize,
    alt_texts: Vec<(String, String)>,
    posts: Vec<StubPost>,
}

/// Stub publisher for testing and offline mode
#[derive(Debug, Default)]
pub struct StubPublisher {
    state: Mutex<StubState>,
}

impl StubPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all posts that were published
    #[cfg(test)]
    pub fn get_published(&self) -> Vec<StubPost> {
        self.state
            .lock()
            .map(|s| s.posts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Publisher for StubPublisher {
    async fn upload_media(&self, jpeg: &[u8]) -> Result<String, PublishError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| PublishError::Media(e.to_string()))?;
        state.uploads += 1;
        let media_id = format!("stub_media_{}", state.uploads);
        tracing::info!(media_id = %media_id, bytes = jpeg.len(), "[STUB] Uploaded media");
        Ok(media_id)
    }

    async fn set_alt_text(&self, media_id: &str, alt_text: &str) -> Result<(), PublishError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| PublishError::Api(e.to_string()))?;
        state
            .alt_texts
            .push((media_id.to_string(), alt_text.to_string()));
        Ok(())
    }

    async fn create_post(
        &self,
        text: &str,
        media_id: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| PublishError::Api(e.to_string()))?;

        let alt_text = media_id.and_then(|id| {
            state
                .alt_texts
                .iter()
                .find(|(m, _)| m == id)
                .map(|(_, alt)| alt.clone())
        });
        state.posts.push(StubPost {
            text: text.to_string(),
            media_id: media_id.map(String::from),
            alt_text,
        });

        let id = format!("stub_{}", state.posts.len());
        tracing::info!(post_id = %id, text = %text, "[STUB] Created post");

        Ok(PublishResult {
            url: Some(format!("https://x.com/stub/status/{}", id)),
            id,
        })
    }

    fn platform(&self) -> &'static str {
        "stub"
    }
}
