//! Vision model adapters for image descriptions

pub mod gemini;
pub mod stub;

pub use gemini::GeminiDescriber;
pub use stub::StubDescriber;

use serde::{Deserialize, Serialize};

/// Instruction sent with every image
pub const DESCRIBE_PROMPT: &str = "Describe this image briefly for accessibility.";

/// Common vision model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Model name/ID
    pub model: String,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 300,
            timeout_secs: 30,
        }
    }
}
