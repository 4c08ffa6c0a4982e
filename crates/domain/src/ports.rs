//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{ArticleCandidate, DecodedImage, DedupKey};

/// Error type for candidate discovery
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read trigger event: {0}")]
    Event(String),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Port for resolving the candidate articles of a run
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Discover at most `limit` candidate articles
    async fn discover(&self, limit: usize) -> Result<Vec<ArticleCandidate>, SourceError>;
}

/// Error type for memory store operations
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Store error: {0}")]
    Store(String),
}

/// Port for the external memory of announced articles
///
/// Check-then-mark is not atomic: two overlapping runs can both see a key as
/// unseen before either marks it.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Whether the key has been marked before
    async fn has_been_seen(&self, key: &DedupKey) -> Result<bool, DedupError>;

    /// Record the key as announced
    async fn mark_as_seen(&self, key: &DedupKey) -> Result<(), DedupError>;
}

/// Error type for reading articles and images
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Port for loading article documents
#[async_trait]
pub trait ArticleReader: Send + Sync {
    /// Read the markup of the article at `path`
    async fn read_article(&self, path: &str) -> Result<String, FetchError>;
}

/// Port for retrieving image bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch `src`, resolving relative references against the directory of
    /// `article_path`
    async fn fetch(&self, src: &str, article_path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Error type for image codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Port for decoding, resampling and JPEG encoding
pub trait ImageCodec: Send + Sync {
    /// Decode any supported format to RGB8, dropping alpha and palettes
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError>;

    /// Resample to exactly `width` x `height` with a high-quality filter
    fn resize(&self, image: &DecodedImage, width: u32, height: u32) -> DecodedImage;

    /// Encode as JPEG at the given quality (1-100)
    fn encode_jpeg(&self, image: &DecodedImage, quality: u8) -> Result<Vec<u8>, CodecError>;
}

/// Error type for vision model calls
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Vision API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
}

/// Port for generating image descriptions
#[async_trait]
pub trait VisionDescriber: Send + Sync {
    /// Describe a JPEG image briefly for accessibility
    async fn describe(&self, jpeg: &[u8]) -> Result<String, VisionError>;
}

/// Error type for publisher operations
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Content too long: {len} > {max}")]
    ContentTooLong { len: usize, max: usize },
    #[error("Media upload failed: {0}")]
    Media(String),
}

/// Result of a successful post creation
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Platform-specific post ID
    pub id: String,
    /// URL to the published content, if available
    pub url: Option<String>,
}

/// Port for the social platform
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload JPEG bytes, returning the media identifier
    async fn upload_media(&self, jpeg: &[u8]) -> Result<String, PublishError>;

    /// Attach accessibility text to uploaded media
    async fn set_alt_text(&self, media_id: &str, alt_text: &str) -> Result<(), PublishError>;

    /// Create a post with optional media
    async fn create_post(
        &self,
        text: &str,
        media_id: Option<&str>,
    ) -> Result<PublishResult, PublishError>;

    /// Get the platform name (e.g., "x")
    fn platform(&self) -> &'static str;
}

/// Port for waiting between posts (enables deterministic testing)
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Pacer backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
