//! JSON transport to the song search backend.
//!
//! The workflow only ever sees success (a parsed JSON body) or a
//! [`TransportError`]. Status codes stay inside the transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a failure and an explanation.
    #[error("{message}")]
    Rejected { message: String },
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// The human-readable message carried by the failure.
    pub fn message(&self) -> String {
        match self {
            TransportError::Rejected { message } => message.clone(),
            TransportError::Http(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Request primitive the search workflow runs on.
#[async_trait]
pub trait SongTransport: Send + Sync {
    /// Issue `method path?query` with an optional JSON body.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError>;

    /// Dereference an opaque URL handed out by the backend, verbatim.
    async fn fetch_url(&self, url: &str) -> Result<serde_json::Value, TransportError>;
}

/// reqwest-backed transport against the songpost API.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{}/", trimmed)).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(
            &config.api_base_url,
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a fixed API path under the base URL.
    fn resolve_path(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.strip_prefix('/').unwrap_or(path))
            .map_err(|e| TransportError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// Resolve a backend-provided cursor the way a browser would: absolute
    /// URLs stay as they are, root-relative ones start from the host.
    fn resolve_cursor(&self, cursor: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(cursor)
            .map_err(|e| TransportError::InvalidUrl {
                url: cursor.to_string(),
                reason: e.to_string(),
            })
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, TransportError> {
        let status = response.status();
        debug!("Response status: {}", status);
        if status.is_success() {
            let body: serde_json::Value = response.json().await?;
            return Ok(body);
        }
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Could not read error body: {}", e);
                String::new()
            }
        };
        warn!("✗ Song API error response ({}): {}", status, text);
        Err(TransportError::Rejected {
            message: rejection_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
        })
    }
}

#[async_trait]
impl SongTransport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError> {
        let url = self.resolve_path(path)?;
        info!("📡 Song API: {} {} with params: {:?}", method, url, query);
        let mut request = self
            .client
            .request(method, url)
            .header("Accept", "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn fetch_url(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        let resolved = self.resolve_cursor(url)?;
        info!("📡 Song API: GET {}", resolved);
        let response = self
            .client
            .get(resolved)
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::read_json(response).await
    }
}

/// Pull the `error` (or `message`) field out of a failure body.
fn rejection_message(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let field = json
            .get("error")
            .or_else(|| json.get("message"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());
        if let Some(message) = field {
            return Some(message.to_string());
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, "songpost-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn paths_join_under_base() {
        let t = transport("http://localhost:3000/api/");
        assert_eq!(
            t.resolve_path("/songs").unwrap().as_str(),
            "http://localhost:3000/api/songs"
        );
        assert_eq!(
            t.resolve_path("songs").unwrap().as_str(),
            "http://localhost:3000/api/songs"
        );
    }

    #[test]
    fn absolute_cursors_are_unchanged() {
        let t = transport("http://localhost:3000");
        let cursor = "https://songs.example.com/songs?artist=rick&offset=20&limit=20";
        assert_eq!(t.resolve_cursor(cursor).unwrap().as_str(), cursor);
    }

    #[test]
    fn root_relative_cursor_starts_at_host() {
        let t = transport("http://host/api");
        assert_eq!(
            t.resolve_cursor("/api/songs?offset=20").unwrap().as_str(),
            "http://host/api/songs?offset=20"
        );
    }

    #[test]
    fn path_relative_cursor_stays_under_base() {
        let t = transport("http://host/api");
        assert_eq!(
            t.resolve_cursor("songs?offset=20").unwrap().as_str(),
            "http://host/api/songs?offset=20"
        );
    }

    #[test]
    fn new_rejects_garbage_base_url() {
        let result = HttpTransport::new("not a url", "ua", Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }

    #[test]
    fn rejection_message_prefers_error_field() {
        assert_eq!(
            rejection_message(r#"{"error":"invalid year"}"#).as_deref(),
            Some("invalid year")
        );
        assert_eq!(
            rejection_message(r#"{"message":"spotify unavailable"}"#).as_deref(),
            Some("spotify unavailable")
        );
        assert_eq!(rejection_message("Bad Gateway\n").as_deref(), Some("Bad Gateway"));
        assert_eq!(rejection_message("   "), None);
    }

    #[test]
    fn rejected_message_is_carried_verbatim() {
        let err = TransportError::Rejected {
            message: "invalid score".to_string(),
        };
        assert_eq!(err.message(), "invalid score");
        assert_eq!(err.to_string(), "invalid score");
    }
}
