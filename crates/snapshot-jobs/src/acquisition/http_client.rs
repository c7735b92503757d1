//! Async HTTP client wrapping reqwest.
//!
//! Plain GET requests against the snapshot mirror. One request at a time,
//! no retries, and the client's default timeouts and redirect handling.

use scraper::Html;
use serde_json::Value;

use crate::error::{Result, SnapshotError};

const USER_AGENT: &str = concat!("snapshot-jobs/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the snapshot crawl.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET a URL and return the body as text. Non-2xx responses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.send(url).await?;
        resp.text().await.map_err(|source| SnapshotError::Request {
            url: url.to_string(),
            source,
        })
    }

    /// GET a URL and decode the body as JSON.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self.send(url).await?;
        resp.json::<Value>()
            .await
            .map_err(|source| SnapshotError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Fetch a page and parse it as an HTML document.
    ///
    /// HTML parsing is lenient, so any body that arrives yields a document.
    /// The returned `Html` is not `Send`; extract what you need before the
    /// next `.await`.
    pub async fn fetch_html(&self, url: &str) -> Result<Html> {
        match self.get_text(url).await {
            Ok(body) => Ok(Html::parse_document(&body)),
            Err(e) => {
                tracing::error!("Error fetching HTML for {url}: {e}");
                Err(e)
            }
        }
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SnapshotError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SnapshotError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp)
    }
}
