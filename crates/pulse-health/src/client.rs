//! Probe client abstraction and the hyper-backed implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use tracing::debug;

use pulse_core::QueryParams;

use crate::cancel::CancelToken;
use crate::error::ProbeError;

/// Bytes of an error response body kept as the error message.
const MAX_ERROR_BODY_BYTES: usize = 512;

const USER_AGENT: &str = concat!("pulse-health/", env!("CARGO_PKG_VERSION"));

/// A 2xx response to a probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
    pub elapsed_ms: u64,
}

/// Issues probe requests on behalf of the batch runner.
///
/// Implementations own their per-request timeout and should abandon the
/// request with [`ProbeError::Cancelled`] once `cancel` fires.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: &QueryParams,
        cancel: &CancelToken,
    ) -> Result<ProbeResponse, ProbeError>;

    async fn post(
        &self,
        path: &str,
        body: &Value,
        cancel: &CancelToken,
    ) -> Result<ProbeResponse, ProbeError>;
}

/// Plain-HTTP probe client over a pooled hyper connection.
pub struct HyperProbeClient {
    base_url: String,
    timeout: Duration,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperProbeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &QueryParams) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            let encoded: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            url.push('?');
            url.push_str(&encoded.join("&"));
        }
        url
    }

    async fn send(
        &self,
        request: Result<http::Request<Full<Bytes>>, http::Error>,
        cancel: &CancelToken,
    ) -> Result<ProbeResponse, ProbeError> {
        let request =
            request.map_err(|e| ProbeError::transport(format!("invalid request: {e}"), 0))?;
        let uri = request.uri().clone();
        let start = Instant::now();

        let exchange = async {
            let response = self.client.request(request).await.map_err(error_chain)?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| format!("failed to read response: {e}"))?
                .to_bytes();
            Ok::<_, String>((status, body))
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%uri, "probe cancelled in flight");
                return Err(ProbeError::Cancelled);
            }
            res = tokio::time::timeout(self.timeout, exchange) => res,
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Err(_) => {
                debug!(%uri, "probe timed out");
                Err(ProbeError::transport(
                    format!("request timed out after {}ms", self.timeout.as_millis()),
                    elapsed_ms,
                ))
            }
            Ok(Err(message)) => {
                debug!(%uri, error = %message, "probe transport failure");
                Err(ProbeError::transport(message, elapsed_ms))
            }
            Ok(Ok((status, body))) if status.is_success() => Ok(ProbeResponse {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
                elapsed_ms,
            }),
            Ok(Ok((status, body))) => {
                debug!(%uri, %status, "probe non-2xx");
                let message = if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                } else {
                    let end = body.len().min(MAX_ERROR_BODY_BYTES);
                    String::from_utf8_lossy(&body[..end]).into_owned()
                };
                Err(ProbeError::status(status.as_u16(), message, elapsed_ms))
            }
        }
    }
}

#[async_trait]
impl ProbeClient for HyperProbeClient {
    async fn get(
        &self,
        path: &str,
        query: &QueryParams,
        cancel: &CancelToken,
    ) -> Result<ProbeResponse, ProbeError> {
        let request = http::Request::builder()
            .method(http::Method::GET)
            .uri(self.url(path, query))
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(http::header::ACCEPT, "application/json")
            .body(Full::new(Bytes::new()));
        self.send(request, cancel).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        cancel: &CancelToken,
    ) -> Result<ProbeResponse, ProbeError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| ProbeError::transport(format!("failed to encode body: {e}"), 0))?;
        let request = http::Request::builder()
            .method(http::Method::POST)
            .uri(self.url(path, &QueryParams::new()))
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(http::header::ACCEPT, "application/json")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(payload)));
        self.send(request, cancel).await
    }
}

/// Render an error with its source chain; hyper's top-level messages alone
/// are too vague to act on.
fn error_chain(err: impl std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_path_and_query() {
        let client = HyperProbeClient::new("http://127.0.0.1:8000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");

        let query = vec![
            ("tag".to_string(), "b".to_string()),
            ("limit".to_string(), "5".to_string()),
            ("tag".to_string(), "a".to_string()),
        ];
        assert_eq!(
            client.url("/api/themes", &query),
            "http://127.0.0.1:8000/api/themes?tag=b&limit=5&tag=a"
        );
        assert_eq!(
            client.url("/api/health", &QueryParams::new()),
            "http://127.0.0.1:8000/api/health"
        );
    }

    #[tokio::test]
    async fn closed_port_is_transport_error() {
        let client = HyperProbeClient::new("http://127.0.0.1:1", Duration::from_millis(500));
        let result = client
            .get("/healthz", &QueryParams::new(), &CancelToken::new())
            .await;
        assert!(matches!(result, Err(ProbeError::Transport { .. })), "{result:?}");
    }

    #[tokio::test]
    async fn cancelled_token_abandons_request() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let client = HyperProbeClient::new("http://127.0.0.1:1", Duration::from_secs(5));
        let result = client.get("/", &QueryParams::new(), &cancel).await;
        assert_eq!(result, Err(ProbeError::Cancelled));
    }
}
