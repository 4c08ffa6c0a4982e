//! Tweet composition - builds the bounded-length announcement text

use crate::policy::TweetPolicy;

/// Composer for announcement text
pub struct TweetComposer {
    policy: TweetPolicy,
}

impl TweetComposer {
    pub fn new(policy: TweetPolicy) -> Self {
        Self { policy }
    }

    /// Public URL of an article, with tracking parameters when enabled
    pub fn article_url(&self, article_path: &str) -> String {
        let base = self.policy.site_url.trim_end_matches('/');
        let path = article_path.trim_start_matches('/');
        match &self.policy.utm_params {
            Some(params) => format!("{}/{}{}", base, path, params),
            None => format!("{}/{}", base, path),
        }
    }

    /// Compose "<prefix> <title> <hashtags> <url>", trimmed to the limit
    ///
    /// Trimming applies to the whole string, so a long title can push the
    /// hashtags and URL out.
    pub fn compose(&self, title: &str, hashtags: &[String], article_url: &str) -> String {
        let text = format!(
            "{} {} {} {}",
            self.policy.prefix,
            title,
            hashtags.join(" "),
            article_url
        );
        safe_trim(&text, self.policy.max_chars)
    }
}

/// Cut `text` to `max_chars` characters, ending in "..." when shortened
pub fn safe_trim(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
