//! HTTP memory store - records announced articles behind a key/value proxy

use async_trait::async_trait;
use autotweet_domain::{DedupError, DedupKey, DedupStore};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Value written for every announced article
const SEEN_MARKER: &str = "1";

/// Memory store reached over HTTP
///
/// `GET {base_url}/{key}` succeeding means seen; `PUT {base_url}/{key}` with
/// body `"1"` marks. Both requests carry the token in a custom header.
pub struct HttpDedupStore {
    client: Client,
    base_url: String,
    token: SecretString,
    token_header: String,
}

impl HttpDedupStore {
    pub fn new(
        base_url: String,
        token: SecretString,
        token_header: String,
        timeout: Duration,
    ) -> Result<Self, DedupError> {
        let client = crate::http_client(timeout).map_err(|e| DedupError::Store(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            token_header,
        })
    }

    /// Build a store only when both the URL and the token are present
    pub fn from_settings(
        base_url: Option<String>,
        token: Option<SecretString>,
        token_header: String,
        timeout: Duration,
    ) -> Result<Option<Self>, DedupError> {
        let base_url = base_url.filter(|u| !u.trim().is_empty());
        let token = token.filter(|t| !t.expose_secret().trim().is_empty());
        match (base_url, token) {
            (Some(base_url), Some(token)) => {
                Self::new(base_url, token, token_header, timeout).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn key_url(&self, key: &DedupKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl DedupStore for HttpDedupStore {
    async fn has_been_seen(&self, key: &DedupKey) -> Result<bool, DedupError> {
        let response = self
            .client
            .get(self.key_url(key))
            .header(self.token_header.as_str(), self.token.expose_secret())
            .send()
            .await
            .map_err(|e| DedupError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DedupError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn mark_as_seen(&self, key: &DedupKey) -> Result<(), DedupError> {
        let response = self
            .client
            .put(self.key_url(key))
            .header(self.token_header.as_str(), self.token.expose_secret())
            .body(SEEN_MARKER)
            .send()
            .await
            .map_err(|e| DedupError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DedupError::Status { status, body });
        }

        tracing::debug!(key = %key, "Marked as seen");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER: &str = "X-AURORE-TOKEN";

    fn store(base_url: String) -> HttpDedupStore {
        HttpDedupStore::new(
            base_url,
            SecretString::new("secret-token".into()),
            HEADER.to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_seen_when_key_exists() {
        let mock_server = MockServer::start().await;
        let key = DedupKey::from_path("article/a.html");

        Mock::given(method("GET"))
            .and(path(format!("/{}", key)))
            .and(header(HEADER, "secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1"))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(store(mock_server.uri()).has_been_seen(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_not_seen_on_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let key = DedupKey::from_path("article/new.html");
        assert!(!store(mock_server.uri()).has_been_seen(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("blobs down"))
            .mount(&mock_server)
            .await;

        let key = DedupKey::from_path("article/new.html");
        let result = store(mock_server.uri()).has_been_seen(&key).await;
        assert!(matches!(result, Err(DedupError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_mark_puts_marker() {
        let mock_server = MockServer::start().await;
        let key = DedupKey::from_path("article/a.html");

        Mock::given(method("PUT"))
            .and(path(format!("/{}", key)))
            .and(header(HEADER, "secret-token"))
            .and(body_string("1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        // Trailing slash on the base URL is tolerated
        let store = store(format!("{}/", mock_server.uri()));
        store.mark_as_seen(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_store_is_network_error() {
        // Nothing listens on port 9 (discard) in test environments
        let store = store("http://127.0.0.1:9".to_string());
        let key = DedupKey::from_path("article/a.html");

        assert!(matches!(
            store.has_been_seen(&key).await,
            Err(DedupError::Network(_))
        ));
        assert!(matches!(
            store.mark_as_seen(&key).await,
            Err(DedupError::Network(_))
        ));
    }

    #[test]
    fn test_missing_settings_yield_no_store() {
        let timeout = Duration::from_secs(5);
        let header = HEADER.to_string();

        let none = HttpDedupStore::from_settings(None, None, header.clone(), timeout).unwrap();
        assert!(none.is_none());

        let no_token = HttpDedupStore::from_settings(
            Some("https://example.com/blobs".to_string()),
            None,
            header.clone(),
            timeout,
        )
        .unwrap();
        assert!(no_token.is_none());

        let blank_url = HttpDedupStore::from_settings(
            Some("  ".to_string()),
            Some(SecretString::new("t".into())),
            header.clone(),
            timeout,
        )
        .unwrap();
        assert!(blank_url.is_none());

        let full = HttpDedupStore::from_settings(
            Some("https://example.com/blobs".to_string()),
            Some(SecretString::new("t".into())),
            header,
            timeout,
        )
        .unwrap();
        assert!(full.is_some());
    }
}
