//! Domain models and value objects

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use time::OffsetDateTime;

/// An article discovered in a run, not yet confirmed as previously announced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCandidate {
    /// Location of the source document, relative to the content root
    pub path: String,
}

impl ArticleCandidate {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Deterministic identifier of a candidate in the memory store
///
/// Lowercase hex SHA-256 of the article path. Stable across runs and machines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn from_path(path: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the representative image of an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Remote URL or path relative to the article's directory
    pub src: String,
    /// Alt text or figure caption found next to an inline image
    pub embedded_alt: Option<String>,
}

impl ImageRef {
    /// Whether the reference must be fetched over HTTP
    pub fn is_remote(&self) -> bool {
        self.src.starts_with("http://") || self.src.starts_with("https://")
    }
}

/// Metadata extracted from one article document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub category: Option<String>,
    /// At most two tags, the brand tag first
    pub hashtags: Vec<String>,
    pub image: Option<ImageRef>,
}

/// Decoded image normalized to 8-bit RGB
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8 pixels, `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}

/// Image ready for upload
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Size of the fetched bytes before transcoding
    pub source_len: usize,
    pub width: u32,
    pub height: u32,
    /// JPEG bytes; within the byte budget unless `quality` is the floor
    pub encoded: Vec<u8>,
    /// Quality the final encoding was produced at
    pub quality: u8,
    /// Whether the image was downscaled to fit the dimension limit
    pub resized: bool,
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("source_len", &self.source_len)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoded", &self.encoded.len())
            .field("quality", &self.quality)
            .field("resized", &self.resized)
            .finish()
    }
}

/// Result of fetching and transcoding an article's image
#[derive(Debug, Clone)]
pub enum ImagePreparation {
    /// Image fetched and encoded within limits
    Prepared {
        asset: ImageAsset,
        embedded_alt: Option<String>,
    },
    /// The article references no image
    Absent,
    /// An image was referenced but could not be fetched or decoded
    Degraded { reason: String },
}

impl ImagePreparation {
    pub fn asset(&self) -> Option<&ImageAsset> {
        match self {
            Self::Prepared { asset, .. } => Some(asset),
            _ => None,
        }
    }
}

/// Accessibility text attached to an uploaded image, tagged by origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "text", rename_all = "snake_case")]
pub enum AltText {
    /// Taken from the article markup
    Embedded(String),
    /// Produced by the vision model
    Generated(String),
    /// Generic text used when no description is available
    Fallback(String),
}

impl AltText {
    pub fn text(&self) -> &str {
        match self {
            Self::Embedded(text) | Self::Generated(text) | Self::Fallback(text) => text,
        }
    }
}

/// Announcement ready for publishing
#[derive(Debug, Clone)]
pub struct TweetDraft {
    /// Text, at most the configured character limit
    pub text: String,
    pub media: Option<ImageAsset>,
    /// Only meaningful when `media` is present
    pub alt_text: Option<AltText>,
}

/// Outcome of a publish attempt; logged, never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub success: bool,
    pub message: String,
    /// Platform post ID on success
    pub post_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub attempted_at: OffsetDateTime,
}

/// Processing result for a single candidate
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// Announcement was posted
    Published { outcome: PublishOutcome, text: String },
    /// Publishing was attempted and failed; the candidate is still marked seen
    Failed { outcome: PublishOutcome, text: String },
    /// Candidate dropped before publishing
    Skipped { reason: String },
    /// Announcement composed but not sent
    DryRun { text: String },
}

impl ProcessResult {
    /// Whether a publish call happened (successful or not)
    pub fn attempted_publish(&self) -> bool {
        matches!(self, Self::Published { .. } | Self::Failed { .. })
    }
}
