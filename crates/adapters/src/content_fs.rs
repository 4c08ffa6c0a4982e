//! Article and image retrieval from the content checkout or over HTTP

use async_trait::async_trait;
use autotweet_domain::{ArticleReader, FetchError, ImageFetcher};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reads article documents from the content root
pub struct LocalArticleReader {
    root: PathBuf,
}

impl LocalArticleReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArticleReader for LocalArticleReader {
    async fn read_article(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| FetchError::Io {
                path: full.display().to_string(),
                source,
            })
    }
}

/// Fetches remote images over HTTP and local images from the content root
pub struct HttpImageFetcher {
    client: Client,
    root: PathBuf,
}

impl HttpImageFetcher {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        let client = crate::http_client(timeout).map_err(|e| FetchError::Http {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self {
            client,
            root: root.into(),
        })
    }

    /// Local path of an image referenced from `article_path`
    ///
    /// Site-absolute references (`/img/a.jpg`) resolve against the content
    /// root, everything else against the article's directory.
    pub fn resolve_local(&self, src: &str, article_path: &str) -> PathBuf {
        if let Some(site_relative) = src.strip_prefix('/') {
            return self.root.join(site_relative);
        }
        let article_dir = Path::new(article_path).parent().unwrap_or(Path::new(""));
        self.root.join(article_dir).join(src)
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let http_error = |message: String| FetchError::Http {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(http_error(format!("status {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| http_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, src: &str, article_path: &str) -> Result<Vec<u8>, FetchError> {
        if src.starts_with("http://") || src.starts_with("https://") {
            return self.fetch_remote(src).await;
        }
        if src.contains("://") || src.starts_with("data:") {
            return Err(FetchError::InvalidPath(src.to_string()));
        }

        let path = self.resolve_local(src, article_path);
        tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
