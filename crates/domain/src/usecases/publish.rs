//! Publish use case - media upload, alt text, then post creation

use crate::model::{PublishOutcome, TweetDraft};
use crate::ports::{Clock, PublishError, PublishResult, Publisher};

/// Submit a draft, converting any failure into a failed outcome
pub async fn publish_draft(
    publisher: &dyn Publisher,
    clock: &dyn Clock,
    draft: &TweetDraft,
) -> PublishOutcome {
    let attempted_at = clock.now();

    match submit(publisher, draft).await {
        Ok(result) => {
            tracing::info!(
                platform = publisher.platform(),
                post_id = %result.id,
                url = ?result.url,
                "Tweet posted"
            );
            PublishOutcome {
                success: true,
                message: result
                    .url
                    .unwrap_or_else(|| format!("posted {}", result.id)),
                post_id: Some(result.id),
                attempted_at,
            }
        }
        Err(e) => {
            tracing::error!(platform = publisher.platform(), error = %e, "Tweet posting failed");
            PublishOutcome {
                success: false,
                message: e.to_string(),
                post_id: None,
                attempted_at,
            }
        }
    }
}

async fn submit(publisher: &dyn Publisher, draft: &TweetDraft) -> Result<PublishResult, PublishError> {
    let media_id = match &draft.media {
        Some(asset) => {
            let media_id = publisher.upload_media(&asset.encoded).await?;
            tracing::debug!(media_id = %media_id, bytes = asset.encoded.len(), "Uploaded media");
            if let Some(alt) = &draft.alt_text {
                publisher.set_alt_text(&media_id, alt.text()).await?;
            }
            Some(media_id)
        }
        None => None,
    };

    publisher.create_post(&draft.text, media_id.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AltText, ImageAsset};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    #[derive(Default)]
    struct RecordingPublisher {
        calls: Mutex<Vec<String>>,
        fail_upload: bool,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn upload_media(&self, jpeg: &[u8]) -> Result<String, PublishError> {
            self.calls.lock().unwrap().push(format!("upload:{}", jpeg.len()));
            if self.fail_upload {
                return Err(PublishError::Media("too large".to_string()));
            }
            Ok("m1".to_string())
        }

        async fn set_alt_text(&self, media_id: &str, alt_text: &str) -> Result<(), PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("alt:{}:{}", media_id, alt_text));
            Ok(())
        }

        async fn create_post(
            &self,
            text: &str,
            media_id: Option<&str>,
        ) -> Result<PublishResult, PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("post:{}:{:?}", text, media_id));
            Ok(PublishResult {
                id: "t1".to_string(),
                url: None,
            })
        }

        fn platform(&self) -> &'static str {
            "test"
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            OffsetDateTime::UNIX_EPOCH
        }
    }

    fn asset() -> ImageAsset {
        ImageAsset {
            source_len: 10,
            width: 2,
            height: 2,
            encoded: vec![1, 2, 3],
            quality: 95,
            resized: false,
        }
    }

    #[tokio::test]
    async fn test_text_only_post() {
        let publisher = RecordingPublisher::default();
        let draft = TweetDraft {
            text: "hello".to_string(),
            media: None,
            alt_text: None,
        };

        let outcome = publish_draft(&publisher, &FixedClock, &draft).await;

        assert!(outcome.success);
        assert_eq!(outcome.post_id.as_deref(), Some("t1"));
        assert_eq!(*publisher.calls.lock().unwrap(), vec!["post:hello:None"]);
    }

    #[tokio::test]
    async fn test_media_post_sequence() {
        let publisher = RecordingPublisher::default();
        let draft = TweetDraft {
            text: "hello".to_string(),
            media: Some(asset()),
            alt_text: Some(AltText::Generated("A chart".to_string())),
        };

        let outcome = publish_draft(&publisher, &FixedClock, &draft).await;

        assert!(outcome.success);
        assert_eq!(
            *publisher.calls.lock().unwrap(),
            vec!["upload:3", "alt:m1:A chart", "post:hello:Some(\"m1\")"]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_is_failed_outcome() {
        let publisher = RecordingPublisher {
            fail_upload: true,
            ..Default::default()
        };
        let draft = TweetDraft {
            text: "hello".to_string(),
            media: Some(asset()),
            alt_text: None,
        };

        let outcome = publish_draft(&publisher, &FixedClock, &draft).await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("too large"));
        assert_eq!(*publisher.calls.lock().unwrap(), vec!["upload:3"]);
    }
}
