use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::VerseError;

/// Default public verse lookup service.
pub const DEFAULT_VERSE_API_URL: &str = "https://bible-api.com";

/// Something that can turn a scripture reference into verse text.
#[async_trait]
pub trait VerseSource: Send + Sync {
    /// Fetch the text for `reference`.
    ///
    /// # Errors
    ///
    /// Returns `VerseError` when the lookup cannot produce non-empty text.
    async fn fetch_text(&self, reference: &str) -> Result<String, VerseError>;
}

/// First `;`- or `,`-separated segment of a reference, trimmed.
///
/// `"Genesis 25:34; Hebrews 12:16"` becomes `"Genesis 25:34"`.
#[must_use]
pub fn first_reference(reference: &str) -> Option<&str> {
    let first = reference.split([';', ',']).next()?.trim();
    (!first.is_empty()).then_some(first)
}

/// Look up verse text, logging failures and returning an empty string instead.
pub async fn fetch_verse_text_or_empty(source: &dyn VerseSource, reference: &str) -> String {
    match source.fetch_text(reference).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(reference, error = %err, "verse lookup failed");
            String::new()
        }
    }
}

#[derive(Clone, Debug)]
pub struct VerseConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl VerseConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for a `GET {base}/{reference}` → `{ "text": ... }` verse API.
#[derive(Clone)]
pub struct VerseClient {
    client: Client,
    config: VerseConfig,
}

impl VerseClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `VerseError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: VerseConfig) -> Result<Self, VerseError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// URL for a single reference; the reference is percent-encoded as one path segment.
    ///
    /// # Errors
    ///
    /// Returns `VerseError::InvalidBaseUrl` if the base URL cannot be a base.
    pub fn verse_url(&self, reference: &str) -> Result<Url, VerseError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| VerseError::InvalidBaseUrl)?
            .pop_if_empty()
            .push(reference);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct VerseResponse {
    text: Option<String>,
}

#[async_trait]
impl VerseSource for VerseClient {
    async fn fetch_text(&self, reference: &str) -> Result<String, VerseError> {
        let reference = first_reference(reference).ok_or(VerseError::EmptyReference)?;
        let url = self.verse_url(reference)?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(VerseError::HttpStatus(response.status()));
        }

        let body: VerseResponse = response.json().await?;
        let text = body
            .text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(VerseError::EmptyText)?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> VerseClient {
        VerseClient::new(VerseConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn first_reference_takes_leading_segment() {
        assert_eq!(
            first_reference("Genesis 25:34; Hebrews 12:16"),
            Some("Genesis 25:34")
        );
        assert_eq!(first_reference("Ruth 1:4, 1:14"), Some("Ruth 1:4"));
        assert_eq!(first_reference("  Jonah 1:17 "), Some("Jonah 1:17"));
        assert_eq!(first_reference(""), None);
        assert_eq!(first_reference(" ; John 1:1"), None);
    }

    #[test]
    fn verse_url_encodes_reference_as_one_segment() {
        let url = client("https://bible-api.com")
            .verse_url("Ruth 1:16")
            .unwrap();
        assert_eq!(url.as_str(), "https://bible-api.com/Ruth%201:16");

        let nested = client("http://localhost:9000/api/").verse_url("1/2").unwrap();
        assert_eq!(nested.as_str(), "http://localhost:9000/api/1%2F2");
    }

    #[test]
    fn non_base_url_is_rejected() {
        let err = client("mailto:verses@example.com")
            .verse_url("John 1:1")
            .unwrap_err();
        assert!(matches!(err, VerseError::InvalidBaseUrl));
    }

    struct Failing;

    #[async_trait]
    impl VerseSource for Failing {
        async fn fetch_text(&self, _reference: &str) -> Result<String, VerseError> {
            Err(VerseError::EmptyText)
        }
    }

    #[tokio::test]
    async fn failures_become_empty_text() {
        assert_eq!(fetch_verse_text_or_empty(&Failing, "John 1:1").await, "");
    }
}
