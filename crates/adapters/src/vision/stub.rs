//! Stub describer for testing and offline mode

use async_trait::async_trait;
use autotweet_domain::{VisionDescriber, VisionError};

/// Stub describer that returns a configurable response
pub struct StubDescriber {
    response: Option<String>,
}

impl StubDescriber {
    /// Describe every image with the same text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
        }
    }

    /// Fail every request
    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl Default for StubDescriber {
    fn default() -> Self {
        Self::with_text("Illustration of the article")
    }
}

#[async_trait]
impl VisionDescriber for StubDescriber {
    async fn describe(&self, jpeg: &[u8]) -> Result<String, VisionError> {
        match &self.response {
            Some(text) => {
                tracing::debug!(bytes = jpeg.len(), "Stub description");
                Ok(text.clone())
            }
            None => Err(VisionError::Api("Stub describer configured to fail".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotweet_domain::{AltText, AltTextPolicy, usecases::AltTextGenerator};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stub_text() {
        let stub = StubDescriber::with_text("A map");
        assert_eq!(stub.describe(b"x").await.unwrap(), "A map");
    }

    #[tokio::test]
    async fn test_failing_stub_degrades_to_fallback() {
        let generator =
            AltTextGenerator::new(Some(Arc::new(StubDescriber::failing())), AltTextPolicy::default());

        let alt = generator.describe(b"x").await;

        assert_eq!(alt, AltText::Fallback("Image from article".to_string()));
    }
}
