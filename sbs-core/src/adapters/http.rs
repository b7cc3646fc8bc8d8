//! Content API HTTP client
//!
//! Talks to the SmileBASIC Source content API over HTTPS:
//!
//! - `GET  {api}Comment?Ids={id}` returns a JSON array of comments
//! - `PUT  {api}Comment/{id}` replaces a comment
//! - `POST {api}Comment` creates a comment
//! - `GET  {api}User?Ids={id},{id}` returns a JSON array of users
//!
//! Writes carry `Authorization: Bearer {token}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::result::{Error, Result};
use crate::domain::{CommentDraft, RawComment, RawUser};
use crate::ports::CommentTransport;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the headers for an authenticated request
pub fn auth_headers(auth_token: &str) -> Result<HeaderMap> {
    let value = HeaderValue::from_str(&format!("Bearer {}", auth_token))
        .map_err(|_| Error::transport("auth token contains characters not allowed in a header"))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Content API client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_url: String,
}

impl HttpTransport {
    /// Create a client for the API rooted at `api_url`.
    ///
    /// Paths are appended directly, so a missing trailing slash is added.
    pub fn new(api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("sbs-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        let api_url = if api_url.ends_with('/') {
            api_url.to_string()
        } else {
            format!("{}/", api_url)
        };

        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Connection timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::transport(format!("Unable to connect to {}", self.api_url))
        } else {
            Error::transport(format!("Request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, response: &Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(Error::transport(
                "HTTP 401: authentication failed, the auth token may be invalid or expired",
            )),
            StatusCode::FORBIDDEN => Err(Error::transport(
                "HTTP 403: not allowed to perform this action",
            )),
            StatusCode::NOT_FOUND => Err(Error::transport("HTTP 404: resource not found")),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::transport(
                "HTTP 429: rate limit exceeded, wait a moment and try again",
            )),
            status => Err(Error::transport(format!("API error: HTTP {}", status.as_u16()))),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response, what: &str) -> Result<T> {
        self.check_response_status(&response)?;
        response
            .json()
            .await
            .map_err(|e| Error::transport(format!("Failed to parse {} response: {}", what, e)))
    }
}

#[async_trait]
impl CommentTransport for HttpTransport {
    async fn get_comment_by_id(&self, id: i64) -> Result<Option<RawComment>> {
        let url = format!("{}Comment?Ids={}", self.api_url, id);
        tracing::debug!(%url, "GET comment");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let comments: Vec<RawComment> = self.read_json(response, "comment").await?;
        Ok(comments.into_iter().find(|c| c.id == id))
    }

    async fn put_comment(
        &self,
        id: i64,
        comment: &RawComment,
        auth_token: &str,
    ) -> Result<RawComment> {
        let url = format!("{}Comment/{}", self.api_url, id);
        tracing::debug!(%url, "PUT comment");

        let response = self
            .client
            .put(&url)
            .headers(auth_headers(auth_token)?)
            .json(comment)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_json(response, "comment update").await
    }

    async fn post_comment(&self, draft: &CommentDraft, auth_token: &str) -> Result<RawComment> {
        let url = format!("{}Comment", self.api_url);
        tracing::debug!(%url, parent_id = draft.parent_id, "POST comment");

        let response = self
            .client
            .post(&url)
            .headers(auth_headers(auth_token)?)
            .json(draft)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_json(response, "comment creation").await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<RawUser>> {
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}User?Ids={}", self.api_url, joined);
        tracing::debug!(%url, "GET users");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_json(response, "user").await
    }
}

// =============================================================================
// Tests
// =============================================================================
