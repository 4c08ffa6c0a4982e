//! Publish pipeline - sequences discovery, dedup, extraction, image, compose and publish

use std::sync::Arc;

use crate::{
    model::{
        ArticleCandidate, ArticleMetadata, DedupKey, ImagePreparation, ProcessResult, TweetDraft,
    },
    policy::PipelineConfig,
    ports::{
        ArticleReader, CandidateSource, Clock, DedupStore, ImageCodec, ImageFetcher, Pacer,
        Publisher,
    },
    usecases::{
        alt_text::AltTextGenerator, compose::TweetComposer, extract::extract_metadata,
        publish::publish_draft, transcode::ImageTranscoder,
    },
};

/// External collaborators of a pipeline run
pub struct PipelineDeps {
    pub source: Arc<dyn CandidateSource>,
    /// Absent when the memory store is not configured
    pub dedup: Option<Arc<dyn DedupStore>>,
    pub reader: Arc<dyn ArticleReader>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub alt_text: AltTextGenerator,
    pub publisher: Arc<dyn Publisher>,
    pub pacer: Arc<dyn Pacer>,
    pub clock: Arc<dyn Clock>,
}

/// Pipeline orchestrator
pub struct Pipeline<C: ImageCodec + 'static> {
    deps: PipelineDeps,
    transcoder: Arc<ImageTranscoder<C>>,
    composer: TweetComposer,
    config: PipelineConfig,
}

impl<C: ImageCodec + 'static> Pipeline<C> {
    pub fn new(deps: PipelineDeps, codec: C, config: PipelineConfig) -> Self {
        if deps.dedup.is_none() {
            tracing::warn!("Memory store not configured, continuing without dedup");
        }
        Self {
            transcoder: Arc::new(ImageTranscoder::new(codec, config.image.clone())),
            composer: TweetComposer::new(config.tweet.clone()),
            deps,
            config,
        }
    }

    /// Discover candidates and process them all
    pub async fn run_once(&self) -> Vec<(String, ProcessResult)> {
        let candidates = self.discover().await;
        if candidates.is_empty() {
            tracing::info!("No new articles found");
            return vec![];
        }
        self.run_candidates(candidates).await
    }

    /// Process the given candidates in order, pausing between announcements
    pub async fn run_candidates(
        &self,
        mut candidates: Vec<ArticleCandidate>,
    ) -> Vec<(String, ProcessResult)> {
        candidates.truncate(self.config.max_articles_per_run);
        let total = candidates.len();
        let mut results = Vec::with_capacity(total);

        for (idx, candidate) in candidates.into_iter().enumerate() {
            let result = self.process(&candidate).await;
            let paced = result.attempted_publish() && idx + 1 < total;
            results.push((candidate.path, result));

            if paced {
                tracing::debug!(pause = ?self.config.pause, "Pausing before next announcement");
                self.deps.pacer.pause(self.config.pause).await;
            }
        }

        results
    }

    async fn discover(&self) -> Vec<ArticleCandidate> {
        match self
            .deps
            .source
            .discover(self.config.max_articles_per_run)
            .await
        {
            Ok(candidates) => {
                tracing::info!(
                    candidates = ?candidates.iter().map(|c| &c.path).collect::<Vec<_>>(),
                    "Discovered articles"
                );
                candidates
            }
            Err(e) => {
                tracing::warn!(error = %e, "Candidate discovery failed");
                vec![]
            }
        }
    }

    /// Process a single candidate; never fails the run
    pub async fn process(&self, candidate: &ArticleCandidate) -> ProcessResult {
        let path = candidate.path.as_str();
        let key = DedupKey::from_path(path);

        if self.has_been_seen(&key).await {
            tracing::info!(path = %path, key = %key, "Skipping duplicate");
            return ProcessResult::Skipped {
                reason: "already announced".to_string(),
            };
        }

        let metadata = match self.load_metadata(path).await {
            Ok(metadata) => metadata,
            Err(reason) => {
                tracing::info!(path = %path, reason = %reason, "Skipping invalid article");
                return ProcessResult::Skipped { reason };
            }
        };

        let image = self.prepare_image(&metadata, path).await;
        let alt_text = match &image {
            ImagePreparation::Prepared {
                asset,
                embedded_alt,
            } => Some(
                self.deps
                    .alt_text
                    .resolve(embedded_alt.as_deref(), &asset.encoded)
                    .await,
            ),
            _ => None,
        };

        let url = self.composer.article_url(path);
        let text = self.composer.compose(&metadata.title, &metadata.hashtags, &url);
        let draft = TweetDraft {
            text: text.clone(),
            media: image.asset().cloned(),
            alt_text,
        };

        if self.config.dry_run {
            tracing::info!(
                path = %path,
                text = %draft.text,
                has_media = draft.media.is_some(),
                alt_text = ?draft.alt_text.as_ref().map(|a| a.text()),
                "[DRY RUN] Would publish"
            );
            return ProcessResult::DryRun { text };
        }

        let outcome = publish_draft(
            self.deps.publisher.as_ref(),
            self.deps.clock.as_ref(),
            &draft,
        )
        .await;

        // Marked even on failure, so a failed post is not retried next run
        self.mark_as_seen(&key).await;

        if outcome.success {
            ProcessResult::Published { outcome, text }
        } else {
            ProcessResult::Failed { outcome, text }
        }
    }

    async fn has_been_seen(&self, key: &DedupKey) -> bool {
        let Some(store) = &self.deps.dedup else {
            return false;
        };
        match store.has_been_seen(key).await {
            Ok(seen) => seen,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Memory check failed");
                false
            }
        }
    }

    async fn mark_as_seen(&self, key: &DedupKey) {
        let Some(store) = &self.deps.dedup else {
            return;
        };
        if let Err(e) = store.mark_as_seen(key).await {
            tracing::warn!(key = %key, error = %e, "Memory mark failed");
        }
    }

    async fn load_metadata(&self, path: &str) -> Result<ArticleMetadata, String> {
        let html = self
            .deps
            .reader
            .read_article(path)
            .await
            .map_err(|e| format!("unreadable article: {}", e))?;

        extract_metadata(&html, &self.config.tweet.brand_hashtag)
            .map_err(|e| format!("metadata extraction failed: {}", e))
    }

    async fn prepare_image(&self, metadata: &ArticleMetadata, path: &str) -> ImagePreparation {
        let Some(image) = &metadata.image else {
            return ImagePreparation::Absent;
        };

        let bytes = match self.deps.fetcher.fetch(&image.src, path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path, src = %image.src, error = %e, "Image fetch failed");
                return ImagePreparation::Degraded {
                    reason: e.to_string(),
                };
            }
        };

        // Decode, resample and encode are CPU-bound; keep them off the async workers
        let transcoder = Arc::clone(&self.transcoder);
        let prepared = match tokio::task::spawn_blocking(move || transcoder.prepare(&bytes)).await {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(path = %path, src = %image.src, error = %e, "Image task aborted");
                return ImagePreparation::Degraded {
                    reason: e.to_string(),
                };
            }
        };

        match prepared {
            Ok(asset) => {
                tracing::info!(
                    path = %path,
                    src = %image.src,
                    quality = asset.quality,
                    bytes = asset.encoded.len(),
                    resized = asset.resized,
                    "Prepared image"
                );
                ImagePreparation::Prepared {
                    asset,
                    embedded_alt: image.embedded_alt.clone(),
                }
            }
            Err(e) => {
                tracing::warn!(path = %path, src = %image.src, error = %e, "Image processing failed");
                ImagePreparation::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }
}
