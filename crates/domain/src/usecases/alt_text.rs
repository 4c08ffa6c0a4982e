//! Accessibility text - embedded alt, then vision model, then a generic fallback

use std::sync::Arc;

use crate::model::AltText;
use crate::policy::AltTextPolicy;
use crate::ports::VisionDescriber;

/// Generator for image accessibility text
pub struct AltTextGenerator {
    describer: Option<Arc<dyn VisionDescriber>>,
    policy: AltTextPolicy,
}

impl AltTextGenerator {
    pub fn new(describer: Option<Arc<dyn VisionDescriber>>, policy: AltTextPolicy) -> Self {
        Self { describer, policy }
    }

    /// Alt text for a prepared image, preferring text found in the markup
    pub async fn resolve(&self, embedded: Option<&str>, jpeg: &[u8]) -> AltText {
        match embedded.map(str::trim).filter(|a| !a.is_empty()) {
            Some(alt) => AltText::Embedded(alt.to_string()),
            None => self.describe(jpeg).await,
        }
    }

    /// Ask the vision model for a description, falling back on any failure
    pub async fn describe(&self, jpeg: &[u8]) -> AltText {
        let Some(describer) = &self.describer else {
            return self.fallback();
        };

        match describer.describe(jpeg).await {
            Ok(text) => {
                let trimmed: String = text.trim().chars().take(self.policy.max_chars).collect();
                if trimmed.is_empty() {
                    tracing::warn!("Vision model returned an empty description");
                    self.fallback()
                } else {
                    AltText::Generated(trimmed)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vision model failed, using fallback alt text");
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> AltText {
        AltText::Fallback(self.policy.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::VisionError;
    use async_trait::async_trait;

    struct FakeDescriber {
        response: Result<String, ()>,
    }

    #[async_trait]
    impl VisionDescriber for FakeDescriber {
        async fn describe(&self, _jpeg: &[u8]) -> Result<String, VisionError> {
            self.response
                .clone()
                .map_err(|_| VisionError::Api("boom".to_string()))
        }
    }

    fn generator(response: Option<Result<String, ()>>) -> AltTextGenerator {
        let describer = response
            .map(|response| Arc::new(FakeDescriber { response }) as Arc<dyn VisionDescriber>);
        AltTextGenerator::new(describer, AltTextPolicy::default())
    }

    #[tokio::test]
    async fn test_embedded_alt_wins() {
        let generator = generator(Some(Ok("model text".to_string())));
        let alt = generator.resolve(Some(" Deputies voting "), b"jpeg").await;
        assert_eq!(alt, AltText::Embedded("Deputies voting".to_string()));
    }

    #[tokio::test]
    async fn test_generated_text_truncated() {
        let generator = generator(Some(Ok("x".repeat(1500))));
        let alt = generator.resolve(None, b"jpeg").await;

        match alt {
            AltText::Generated(text) => assert_eq!(text.chars().count(), 1000),
            other => panic!("unexpected alt text: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_describer_uses_fallback() {
        let generator = generator(None);
        let alt = generator.resolve(None, b"jpeg").await;
        assert_eq!(alt, AltText::Fallback("Image from article".to_string()));
    }

    #[tokio::test]
    async fn test_describer_error_uses_fallback() {
        let generator = generator(Some(Err(())));
        let alt = generator.resolve(Some("   "), b"jpeg").await;
        assert_eq!(alt.text(), "Image from article");
    }

    #[tokio::test]
    async fn test_empty_description_uses_fallback() {
        let generator = generator(Some(Ok("  \n ".to_string())));
        let alt = generator.describe(b"jpeg").await;
        assert!(matches!(alt, AltText::Fallback(_)));
    }
}
