//! autotweet adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `dedup`: HTTP memory store of announced articles
//! - `source`: GitHub trigger event and git diff candidate discovery
//! - `content`: Local article reader and HTTP/local image fetcher
//! - `codec`: Image decoding with `image`, progressive JPEG output with `jpeg-encoder`
//! - `vision`: Vision model adapters for alt text (Gemini, stub)
//! - `x`: X (Twitter) API publisher

mod content_fs;
mod dedup_http;
mod event_source;
mod image_codec;

pub mod vision;
pub mod x_api;

use std::time::Duration;

/// Re-exports for memory store adapters
pub mod dedup {
    pub use crate::dedup_http::HttpDedupStore;
}

/// Re-exports for candidate discovery adapters
pub mod source {
    pub use crate::event_source::GitEventSource;
}

/// Re-exports for content adapters
pub mod content {
    pub use crate::content_fs::{HttpImageFetcher, LocalArticleReader};
}

/// Re-exports for image codec adapters
pub mod codec {
    pub use crate::image_codec::ImageRsCodec;
}

/// Re-exports for X API adapters
pub mod x {
    pub use crate::x_api::{StubPublisher, XPublisher};
}

/// Build an HTTP client with the given request timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("autotweet/", env!("CARGO_PKG_VERSION")))
        .build()
}
