//! HTTP channel binding.
//!
//! The invoke activity is POSTed as JSON. Any 2xx answer is a success whose
//! content is the response body; any other status is a failure carrying the
//! body, so the runtime can decide whether to retry. Only a request that
//! never got an HTTP answer is a transport error.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::ChannelAdapter;
use crate::activity::{ActivityRequest, ActivityResponse};
use crate::error::ProtocolResult;

/// Header carrying the zero-based attempt number.
pub const ATTEMPT_HEADER: &str = "X-Applet-Attempt";

/// Header carrying the invocation context.
pub const CONTEXT_HEADER: &str = "X-Applet-Invocation-Context";

/// Channel adapter that talks to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpChannelAdapter {
    /// Invoke endpoint.
    endpoint: Url,

    /// HTTP client.
    http: Client,

    /// Optional bearer token for authentication.
    auth_token: Option<String>,
}

impl HttpChannelAdapter {
    /// Create an adapter for an invoke endpoint.
    pub fn new(endpoint: &str) -> ProtocolResult<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            http: Client::new(),
            auth_token: None,
        })
    }

    /// Create an adapter with a custom HTTP client.
    pub fn with_http_client(endpoint: &str, http: Client) -> ProtocolResult<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            http,
            auth_token: None,
        })
    }

    /// Set authentication token.
    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// The invoke endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChannelAdapter for HttpChannelAdapter {
    async fn send(&self, request: &ActivityRequest) -> ProtocolResult<ActivityResponse> {
        let mut http_request = self
            .http
            .post(self.endpoint.as_str())
            .header(ATTEMPT_HEADER, request.attempt_number.to_string())
            .header(CONTEXT_HEADER, request.context.to_string())
            .json(&request.activity);

        if let Some(ref token) = self.auth_token {
            http_request = http_request.bearer_auth(token);
        }

        tracing::debug!(
            url = %self.endpoint,
            app_id = %request.activity.app_id,
            attempt = request.attempt_number,
            "Posting invoke activity"
        );

        let response = http_request.send().await?;
        let status = response.status();
        let content = response.text().await?;

        if status.is_success() {
            Ok(ActivityResponse::success(content))
        } else {
            tracing::debug!(%status, "Channel answered with a failure status");
            Ok(ActivityResponse::failure(content))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ExecuteAction;
    use crate::activity::{ActivityStatus, InvocationContext};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ActivityRequest {
        ActivityRequest::new(
            "app-1",
            &ExecuteAction::new("approve").with_id("ok"),
            InvocationContext::UserInteraction,
        )
    }

    #[tokio::test]
    async fn test_success_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke"))
            .and(header(ATTEMPT_HEADER, "0"))
            .and(header(CONTEXT_HEADER, "userInteraction"))
            .and(body_partial_json(serde_json::json!({
                "type": "invoke",
                "name": "adaptiveCard/action",
                "appId": "app-1",
                "value": {"action": {"type": "Action.Execute", "verb": "approve"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"type":"AdaptiveCard"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let channel = HttpChannelAdapter::new(&format!("{}/invoke", server.uri())).unwrap();
        let response = channel.send(&request()).await.unwrap();

        assert_eq!(response.status, ActivityStatus::Success);
        assert_eq!(response.content, r#"{"type":"AdaptiveCard"}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let channel = HttpChannelAdapter::new(&server.uri()).unwrap();
        let response = channel.send(&request()).await.unwrap();

        assert_eq!(response.status, ActivityStatus::Failure);
        assert_eq!(response.content, "busy");
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"done\""))
            .expect(1)
            .mount(&server)
            .await;

        let channel = HttpChannelAdapter::new(&server.uri())
            .unwrap()
            .with_auth("secret");
        let response = channel.send(&request()).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let channel = HttpChannelAdapter::new(&format!("http://127.0.0.1:{port}/invoke")).unwrap();
        let err = channel.send(&request()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(HttpChannelAdapter::new("not a url").is_err());
    }
}
