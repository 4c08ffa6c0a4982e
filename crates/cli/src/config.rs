//! Configuration loading and management

use anyhow::{Context, Result};
use autotweet_domain::{AltTextPolicy, ImageLimits, PipelineConfig, TweetPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,

    #[serde(default)]
    pub tweet: TweetConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub vision: VisionSettings,

    #[serde(default)]
    pub x: XConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Directory (relative to the content root) holding article documents
    #[serde(default = "default_articles_dir")]
    pub articles_dir: String,

    /// Repository checkout that article paths are relative to
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    #[serde(default = "default_max_articles_per_run")]
    pub max_articles_per_run: usize,

    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Env var naming the JSON event file written by the CI runner
    #[serde(default = "default_event_path_env")]
    pub event_path_env: String,

    #[serde(default = "default_action")]
    pub action: String,

    #[serde(default = "default_empty_tree_sha")]
    pub empty_tree_sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetConfig {
    #[serde(default = "default_tweet_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_brand_hashtag")]
    pub brand_hashtag: String,

    #[serde(default)]
    pub utm_enabled: bool,

    #[serde(default = "default_utm_params")]
    pub utm_params: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    #[serde(default = "default_byte_budget")]
    pub byte_budget: usize,

    #[serde(default = "default_start_quality")]
    pub start_quality: u8,

    #[serde(default = "default_quality_floor")]
    pub quality_floor: u8,

    #[serde(default = "default_quality_step")]
    pub quality_step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_base_url_env")]
    pub base_url_env: String,

    #[serde(default = "default_memory_token_env")]
    pub token_env: String,

    #[serde(default = "default_memory_token_header")]
    pub token_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionSettings {
    /// gemini, stub or none
    #[serde(default = "default_vision_provider")]
    pub provider: String,

    #[serde(default = "default_vision_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_vision_model")]
    pub model: String,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_max_alt_chars")]
    pub max_alt_chars: usize,

    #[serde(default = "default_fallback_alt_text")]
    pub fallback_alt_text: String,

    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XConfig {
    /// x or stub
    #[serde(default = "default_x_provider")]
    pub provider: String,

    #[serde(default = "default_x_user_token_env")]
    pub user_token_env: String,

    #[serde(default = "default_x_base_url")]
    pub base_url: String,
}

// Default value functions
fn default_site_url() -> String {
    "https://horizon-libre.net".to_string()
}

fn default_articles_dir() -> String {
    "article".to_string()
}

fn default_content_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_articles_per_run() -> usize {
    5
}

fn default_pause_secs() -> u64 {
    10
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_event_path_env() -> String {
    "GITHUB_EVENT_PATH".to_string()
}

fn default_action() -> String {
    "new-article-published".to_string()
}

fn default_empty_tree_sha() -> String {
    "4b825dc642cb6eb9a060e54bf8d69288fbee4904".to_string()
}

fn default_tweet_max_chars() -> usize {
    280
}

fn default_prefix() -> String {
    "Nouvel article:".to_string()
}

fn default_brand_hashtag() -> String {
    "#HorizonLibre".to_string()
}

fn default_utm_params() -> String {
    "?utm_source=twitter&utm_medium=social&utm_campaign=autotweet".to_string()
}

fn default_max_dimension() -> u32 {
    4096
}

fn default_byte_budget() -> usize {
    // 4.8 MiB
    5_033_164
}

fn default_start_quality() -> u8 {
    95
}

fn default_quality_floor() -> u8 {
    50
}

fn default_quality_step() -> u8 {
    5
}

fn default_memory_base_url_env() -> String {
    "BLOBS_PROXY_URL".to_string()
}

fn default_memory_token_env() -> String {
    "AURORE_BLOBS_TOKEN".to_string()
}

fn default_memory_token_header() -> String {
    "X-AURORE-TOKEN".to_string()
}

fn default_vision_provider() -> String {
    "gemini".to_string()
}

fn default_vision_api_key_env() -> String {
    "GEMINI_API_KEY_HORIZON".to_string()
}

fn default_vision_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    300
}

fn default_max_alt_chars() -> usize {
    1000
}

fn default_fallback_alt_text() -> String {
    "Image from article".to_string()
}

fn default_vision_timeout() -> u64 {
    30
}

fn default_x_provider() -> String {
    "x".to_string()
}

fn default_x_user_token_env() -> String {
    "X_USER_TOKEN".to_string()
}

fn default_x_base_url() -> String {
    "https://api.x.com".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            articles_dir: default_articles_dir(),
            content_root: default_content_root(),
            max_articles_per_run: default_max_articles_per_run(),
            pause_secs: default_pause_secs(),
            dry_run: false,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            event_path_env: default_event_path_env(),
            action: default_action(),
            empty_tree_sha: default_empty_tree_sha(),
        }
    }
}

impl Default for TweetConfig {
    fn default() -> Self {
        Self {
            max_chars: default_tweet_max_chars(),
            prefix: default_prefix(),
            brand_hashtag: default_brand_hashtag(),
            utm_enabled: false,
            utm_params: default_utm_params(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            byte_budget: default_byte_budget(),
            start_quality: default_start_quality(),
            quality_floor: default_quality_floor(),
            quality_step: default_quality_step(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_url_env: default_memory_base_url_env(),
            token_env: default_memory_token_env(),
            token_header: default_memory_token_header(),
        }
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            provider: default_vision_provider(),
            api_key_env: default_vision_api_key_env(),
            model: default_vision_model(),
            max_output_tokens: default_max_output_tokens(),
            max_alt_chars: default_max_alt_chars(),
            fallback_alt_text: default_fallback_alt_text(),
            timeout_secs: default_vision_timeout(),
        }
    }
}

impl Default for XConfig {
    fn default() -> Self {
        Self {
            provider: default_x_provider(),
            user_token_env: default_x_user_token_env(),
            base_url: default_x_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AUTOTWEET")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Limits and policies for a pipeline run
    pub fn pipeline_config(&self, force_dry_run: bool) -> PipelineConfig {
        PipelineConfig {
            max_articles_per_run: self.general.max_articles_per_run,
            pause: Duration::from_secs(self.general.pause_secs),
            dry_run: force_dry_run || self.general.dry_run,
            tweet: self.tweet_policy(),
            image: ImageLimits {
                max_dimension: self.image.max_dimension,
                byte_budget: self.image.byte_budget,
                start_quality: self.image.start_quality,
                quality_floor: self.image.quality_floor,
                quality_step: self.image.quality_step,
            },
            alt_text: AltTextPolicy {
                max_chars: self.vision.max_alt_chars,
                fallback: self.vision.fallback_alt_text.clone(),
            },
        }
    }

    pub fn tweet_policy(&self) -> TweetPolicy {
        TweetPolicy {
            max_chars: self.tweet.max_chars,
            prefix: self.tweet.prefix.clone(),
            brand_hashtag: self.tweet.brand_hashtag.clone(),
            site_url: self.general.site_url.clone(),
            utm_params: self
                .tweet
                .utm_enabled
                .then(|| self.tweet.utm_params.clone()),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.general.http_timeout_secs)
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r##"# autotweet configuration

[general]
site_url = "https://horizon-libre.net"
articles_dir = "article"
content_root = "."
max_articles_per_run = 5
pause_secs = 10
dry_run = false
http_timeout_secs = 30

[trigger]
event_path_env = "GITHUB_EVENT_PATH"
action = "new-article-published"
# diff base used when HEAD has no parent
empty_tree_sha = "4b825dc642cb6eb9a060e54bf8d69288fbee4904"

[tweet]
max_chars = 280
prefix = "Nouvel article:"
brand_hashtag = "#HorizonLibre"
utm_enabled = false
utm_params = "?utm_source=twitter&utm_medium=social&utm_campaign=autotweet"

[image]
max_dimension = 4096
byte_budget = 5033164
start_quality = 95
quality_floor = 50
quality_step = 5

# Dedup is skipped when either env var is unset
[memory]
base_url_env = "BLOBS_PROXY_URL"
token_env = "AURORE_BLOBS_TOKEN"
token_header = "X-AURORE-TOKEN"

[vision]
provider = "gemini"  # gemini, stub, none
api_key_env = "GEMINI_API_KEY_HORIZON"
model = "gemini-1.5-flash"
max_output_tokens = 300
max_alt_chars = 1000
fallback_alt_text = "Image from article"
timeout_secs = 30

[x]
provider = "x"  # x, stub
user_token_env = "X_USER_TOKEN"
base_url = "https://api.x.com"
"##
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.general.site_url, defaults.general.site_url);
        assert_eq!(
            parsed.general.max_articles_per_run,
            defaults.general.max_articles_per_run
        );
        assert_eq!(parsed.image.byte_budget, defaults.image.byte_budget);
        assert_eq!(parsed.trigger.empty_tree_sha, defaults.trigger.empty_tree_sha);
        assert_eq!(parsed.vision.provider, "gemini");
        assert_eq!(parsed.x.provider, "x");
    }

    #[test]
    fn test_pipeline_config_matches_domain_defaults() {
        let config = AppConfig::default().pipeline_config(false);
        let domain = PipelineConfig::default();

        assert_eq!(config.max_articles_per_run, domain.max_articles_per_run);
        assert_eq!(config.pause, domain.pause);
        assert_eq!(config.tweet, domain.tweet);
        assert_eq!(config.image, domain.image);
        assert_eq!(config.alt_text, domain.alt_text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_utm_only_when_enabled() {
        let mut config = AppConfig::default();
        assert_eq!(config.tweet_policy().utm_params, None);

        config.tweet.utm_enabled = true;
        assert_eq!(
            config.tweet_policy().utm_params.as_deref(),
            Some("?utm_source=twitter&utm_medium=social&utm_campaign=autotweet")
        );
    }

    #[test]
    fn test_dry_run_flag_overrides_config() {
        let config = AppConfig::default();
        assert!(!config.pipeline_config(false).dry_run);
        assert!(config.pipeline_config(true).dry_run);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[tweet]\nutm_enabled = true\n").unwrap();

        assert!(parsed.tweet.utm_enabled);
        assert_eq!(parsed.tweet.max_chars, 280);
        assert_eq!(parsed.memory.token_header, "X-AURORE-TOKEN");
    }
}
