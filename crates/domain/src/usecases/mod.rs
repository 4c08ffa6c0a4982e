//! Application use cases

pub mod alt_text;
pub mod compose;
pub mod discovery;
pub mod extract;
pub mod pipeline;
pub mod publish;
pub mod transcode;

pub use alt_text::AltTextGenerator;
pub use compose::{TweetComposer, safe_trim};
pub use discovery::{candidates_from_added_files, candidates_from_event};
pub use extract::{ExtractError, derive_hashtags, extract_metadata};
pub use pipeline::{Pipeline, PipelineDeps};
pub use publish::publish_draft;
pub use transcode::ImageTranscoder;
