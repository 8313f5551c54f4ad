//! HTTP implementation of the document store.
//!
//! `GET /api/data` with `If-None-Match` answers 200 with the document and an
//! `ETag`, or 304. `POST /api/data` with `If-Match` answers 200 with the new
//! `ETag`, or 409 when the tag is stale.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::{Response, StatusCode};

use super::{DocumentStore, FetchOutcome, SaveOutcome, StoreError};
use crate::models::{Document, VersionTag};

const DATA_PATH: &str = "/api/data";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds an http(s) URL for `path` on the given server.
///
/// Bare host names get `http://`.
pub fn build_http_url(server_url: &str, path: &str) -> String {
    let base_url = if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
        format!("http://{}", server_url)
    } else {
        server_url.to_string()
    };

    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Document store backed by the board server.
#[derive(Debug, Clone)]
pub struct HttpStore {
    server_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(server_url: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self::with_client(server_url, client))
    }

    pub fn with_client(server_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            server_url: server_url.into(),
            client,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn data_url(&self) -> String {
        build_http_url(&self.server_url, DATA_PATH)
    }
}

fn response_tag(response: &Response) -> Option<VersionTag> {
    response
        .headers()
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .filter(|tag| !tag.is_empty())
        .map(VersionTag::new)
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn fetch(&self, known: Option<&VersionTag>) -> Result<FetchOutcome, StoreError> {
        let mut request = self.client.get(self.data_url());
        if let Some(tag) = known {
            request = request.header(IF_NONE_MATCH, tag.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        let tag = response_tag(&response);
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let document = Document::from_json(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(FetchOutcome::Fetched { document, tag })
    }

    async fn save(
        &self,
        document: &Document,
        expected: Option<&VersionTag>,
    ) -> Result<SaveOutcome, StoreError> {
        let mut request = self.client.post(self.data_url()).json(document);
        if let Some(tag) = expected {
            request = request.header(IF_MATCH, tag.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        match response.status() {
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Ok(SaveOutcome::Conflict),
            status if status.is_success() => Ok(SaveOutcome::Saved {
                tag: response_tag(&response),
            }),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }
}
