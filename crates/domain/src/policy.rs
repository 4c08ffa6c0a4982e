//! Budgets, caps and thresholds for a pipeline run

use std::time::Duration;

/// Limits applied when preparing an image for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLimits {
    /// Largest allowed width or height in pixels
    pub max_dimension: u32,
    /// Target size of the encoded JPEG
    pub byte_budget: usize,
    /// Quality of the first encoding attempt
    pub start_quality: u8,
    /// Lowest quality tried before giving up on the budget
    pub quality_floor: u8,
    /// Quality decrement between attempts
    pub quality_step: u8,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
            // 4.8 MiB
            byte_budget: 5_033_164,
            start_quality: 95,
            quality_floor: 50,
            quality_step: 5,
        }
    }
}

/// Settings for composing announcement text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetPolicy {
    pub max_chars: usize,
    /// Phrase preceding the title
    pub prefix: String,
    /// Tag present on every announcement
    pub brand_hashtag: String,
    pub site_url: String,
    /// Tracking query appended to article URLs when set
    pub utm_params: Option<String>,
}

impl Default for TweetPolicy {
    fn default() -> Self {
        Self {
            max_chars: 280,
            prefix: "Nouvel article:".to_string(),
            brand_hashtag: "#HorizonLibre".to_string(),
            site_url: "https://horizon-libre.net".to_string(),
            utm_params: None,
        }
    }
}

/// Settings for accessibility text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltTextPolicy {
    /// Generated descriptions are cut to this many characters
    pub max_chars: usize,
    pub fallback: String,
}

impl Default for AltTextPolicy {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            fallback: "Image from article".to_string(),
        }
    }
}

/// Everything a pipeline run needs to know about limits
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum candidates handled per run
    pub max_articles_per_run: usize,
    /// Pause between successive published candidates
    pub pause: Duration,
    /// Compose but don't publish or mark
    pub dry_run: bool,
    pub tweet: TweetPolicy,
    pub image: ImageLimits,
    pub alt_text: AltTextPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_articles_per_run: 5,
            pause: Duration::from_secs(10),
            dry_run: false,
            tweet: TweetPolicy::default(),
            image: ImageLimits::default(),
            alt_text: AltTextPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Check that the limits describe a terminating, meaningful run
    pub fn validate(&self) -> Result<(), PolicyViolation> {
        if self.max_articles_per_run == 0 {
            return Err(PolicyViolation::Invalid(
                "max_articles_per_run must be at least 1".to_string(),
            ));
        }
        // room for at least the ellipsis
        if self.tweet.max_chars < 4 {
            return Err(PolicyViolation::Invalid(format!(
                "tweet max_chars too small: {}",
                self.tweet.max_chars
            )));
        }
        let image = &self.image;
        if image.max_dimension == 0 {
            return Err(PolicyViolation::Invalid(
                "image max_dimension must be positive".to_string(),
            ));
        }
        if image.quality_step == 0 {
            return Err(PolicyViolation::Invalid(
                "image quality_step must be positive".to_string(),
            ));
        }
        if image.start_quality > 100 || image.start_quality == 0 {
            return Err(PolicyViolation::Invalid(format!(
                "image start_quality out of range: {}",
                image.start_quality
            )));
        }
        if image.quality_floor > image.start_quality {
            return Err(PolicyViolation::QualityRange {
                floor: image.quality_floor,
                start: image.start_quality,
            });
        }
        Ok(())
    }
}

/// Policy violation error
#[derive(Debug, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Quality floor {floor} is above start quality {start}")]
    QualityRange { floor: u8, start: u8 },
    #[error("Invalid limit: {0}")]
    Invalid(String),
}
