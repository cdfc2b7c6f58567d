//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted via a trait so different stacks can
//! plug in; a `reqwest`-backed client ships behind the `reqwest` feature.

use crate::error::{EngineError, EngineResult};
use crate::transport::RemoteTransport;
use async_trait::async_trait;
use ledgerx_types::{LedgerEntry, PullResponse, PushRequest};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. `post` returns
/// the response status and body; transport-level failures (DNS, connect,
/// reset) are reported as `Err`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body.
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse, String>;

    /// Checks if the client considers itself connected/healthy.
    fn is_healthy(&self) -> bool;
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP-based remote transport.
///
/// Batches go to `{base_url}/ledger/sync`; the reconciliation read posts the
/// user id to `{base_url}/ledger/entries` and expects a [`PullResponse`]
/// envelope back. Any non-2xx status is reported as a retryable error.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    client: C,
    connected: AtomicBool,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a new HTTP transport against the given base URL.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client,
            connected: AtomicBool::new(true),
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, endpoint: &str, body: Vec<u8>) -> EngineResult<Vec<u8>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.post(&url, body).await.map_err(|e| {
            self.connected.store(false, Ordering::SeqCst);
            EngineError::transport_retryable(e)
        })?;

        self.connected.store(true, Ordering::SeqCst);
        if !response.is_success() {
            return Err(EngineError::Remote {
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

#[async_trait]
impl<C: HttpClient> RemoteTransport for HttpTransport<C> {
    async fn push_batch(&self, request: &PushRequest) -> EngineResult<()> {
        let body = serde_json::to_vec(request)?;
        self.post_json("/ledger/sync", body).await?;
        Ok(())
    }

    async fn fetch_entries(&self, user_id: &str) -> EngineResult<Vec<LedgerEntry>> {
        let body = serde_json::to_vec(&json!({ "user_id": user_id }))?;
        let response_body = self.post_json("/ledger/entries", body).await?;
        let response: PullResponse = serde_json::from_slice(&response_body)?;
        Ok(response.entries)
    }

    fn is_online(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.client.is_healthy()
    }
}

/// An [`HttpClient`] backed by `reqwest`.
#[cfg(feature = "reqwest")]
pub struct ReqwestClient {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestClient {
    /// Creates a client with default settings.
    ///
    /// Timeouts are the engine's concern; this client imposes none itself.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "reqwest")]
impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse, String> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    struct ScriptedClient {
        responses: Mutex<Vec<Result<HttpResponse, String>>>,
        requests: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<HttpResponse, String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, Vec<u8>)> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse, String> {
            self.requests.lock().push((url.to_string(), body));
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                return Err("no scripted response".into());
            }
            responses.remove(0)
        }

        fn is_healthy(&self) -> bool {
            true
        }
    }

    fn ok(body: serde_json::Value) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status: 200,
            body: serde_json::to_vec(&body).unwrap(),
        })
    }

    fn batch() -> PushRequest {
        PushRequest::new(vec![LedgerEntry::new(
            "e-1",
            "u-1",
            "booking",
            json!({"slot": "9am"}),
        )])
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ScriptedClient::new(vec![]);
        let transport = HttpTransport::new("https://api.example.com/", client);
        assert_eq!(transport.base_url(), "https://api.example.com");
    }

    #[tokio::test]
    async fn push_posts_entries_envelope_to_sync_endpoint() {
        let client = ScriptedClient::new(vec![ok(json!({}))]);
        let transport = HttpTransport::new("https://api.example.com", client);

        transport.push_batch(&batch()).await.unwrap();

        let requests = transport.client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://api.example.com/ledger/sync");
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].1).unwrap();
        assert_eq!(sent["_entries"][0]["id"], "e-1");
    }

    #[tokio::test]
    async fn non_2xx_is_a_retryable_remote_error() {
        let client = ScriptedClient::new(vec![Ok(HttpResponse {
            status: 503,
            body: Vec::new(),
        })]);
        let transport = HttpTransport::new("https://api.example.com", client);

        let err = transport.push_batch(&batch()).await.unwrap_err();
        assert!(matches!(err, EngineError::Remote { status: 503 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn transport_error_marks_offline() {
        let client = ScriptedClient::new(vec![Err("connection refused".into())]);
        let transport = HttpTransport::new("https://api.example.com", client);
        assert!(transport.is_online());

        let err = transport.push_batch(&batch()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!transport.is_online());
    }

    #[tokio::test]
    async fn fetch_decodes_pull_response() {
        let entry = LedgerEntry::new("e-9", "u-1", "order", json!({"total": 5}));
        let client = ScriptedClient::new(vec![ok(json!({
            "_entries": [serde_json::to_value(&entry).unwrap()]
        }))]);
        let transport = HttpTransport::new("https://api.example.com", client);

        let entries = transport.fetch_entries("u-1").await.unwrap();
        assert_eq!(entries, vec![entry]);

        let requests = transport.client.requests();
        assert_eq!(requests[0].0, "https://api.example.com/ledger/entries");
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].1).unwrap();
        assert_eq!(sent["user_id"], "u-1");
    }
}
