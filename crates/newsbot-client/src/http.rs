//! HTTP client for the assistant REST endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use newsbot_core::SessionId;

use crate::error::{ClientError, UNDECODABLE_ERROR_BODY};
use crate::protocol::{ChatRequest, ChatResponse, ErrorBody, HistoryEntry, HistoryResponse};
use crate::service::{ChatReply, NewsService};

/// HTTP client for the assistant service.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a new HTTP client without a request timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Create a client whose every request is bounded by `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Some(timeout),
        })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Map a transport error, recognizing timeouts and refused connections.
    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => ClientError::Timeout(timeout),
            _ if err.is_connect() => ClientError::Connection(err.to_string()),
            _ => ClientError::Http(err),
        }
    }

    /// Turn a non-success response into [`ClientError::Status`].
    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail_text(),
            Err(_) => Some(UNDECODABLE_ERROR_BODY.to_string()),
        };
        debug!(status = status.as_u16(), detail = ?detail, "Service returned error status");

        Err(ClientError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    /// Decode a JSON success body.
    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                ClientError::Serialization(e.to_string())
            }
        })
    }
}

#[async_trait]
impl NewsService for HttpClient {
    async fn history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>, ClientError> {
        let url = self.endpoint(&["history", session_id.as_str()])?;
        debug!(url = %url, "GET history");

        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::check_status(response).await?;

        let body: HistoryResponse = self.decode(response).await?;
        Ok(body.into_entries())
    }

    async fn chat(&self, session_id: &SessionId, text: &str) -> Result<ChatReply, ClientError> {
        let url = self.endpoint(&["chat"])?;
        debug!(url = %url, session_id = %session_id, "POST chat");

        let response = self
            .inner
            .post(url)
            .json(&ChatRequest {
                user_message: text,
                session_id: session_id.as_str(),
            })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::check_status(response).await?;

        let body: ChatResponse = self.decode(response).await?;
        Ok(body.into())
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<(), ClientError> {
        let url = self.endpoint(&["clear_session", session_id.as_str()])?;
        debug!(url = %url, "POST clear_session");

        let response = self
            .inner
            .post(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsbot_core::Role;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> SessionId {
        SessionId::new("session_abc")
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_segments() {
        let client = HttpClient::new("http://localhost:8000/api/");
        let url = client.endpoint(&["history", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/history/a%20b%2Fc");
    }

    #[tokio::test]
    async fn test_history_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history/session_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "history": [
                    {"role": "user", "content": "What happened?"},
                    {"role": "assistant", "content": "Plenty."}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let entries = client.history(&session()).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[1].content, "Plenty.");
    }

    #[tokio::test]
    async fn test_history_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history/session_abc"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client.history(&session()).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_history_undecodable_body_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history/session_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client.history(&session()).await.unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_chat_sends_wire_body_and_reads_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({
                "user_message": "What happened in the election?",
                "session_id": "session_abc"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bot_response": "Turnout was high.",
                "session_id": "session_server"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let reply = client
            .chat(&session(), "What happened in the election?")
            .await
            .unwrap();

        assert_eq!(reply.text, "Turnout was high.");
        assert_eq!(reply.session_id, Some(SessionId::new("session_server")));
    }

    #[tokio::test]
    async fn test_chat_error_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"detail": "overloaded"})),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client.chat(&session(), "hi").await.unwrap_err();
        assert_eq!(err.reason(), "overloaded");
    }

    #[tokio::test]
    async fn test_chat_error_without_detail_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client.chat(&session(), "hi").await.unwrap_err();
        assert_eq!(err.reason(), "HTTP error! status: 503");
    }

    #[tokio::test]
    async fn test_chat_error_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        let err = client.chat(&session(), "hi").await.unwrap_err();
        assert_eq!(err.reason(), "Network response was not ok.");
    }

    #[tokio::test]
    async fn test_chat_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"bot_response": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            HttpClient::with_timeout(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = client.chat(&session(), "hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_clear_session_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/clear_session/session_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri());
        client.clear_session(&session()).await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Port 9 (discard) is closed on test machines.
        let client = HttpClient::new("http://127.0.0.1:9");
        let err = client.chat(&session(), "hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }
}
