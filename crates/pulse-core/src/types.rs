//! Shared types used across pulse crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// HTTP method used to probe an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Shape of the synthetic body sent to a POST endpoint.
///
/// The probe only needs the endpoint to route the request, so each shape
/// is the smallest body the endpoint family accepts without crashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplePayload {
    /// `{}`
    #[default]
    Empty,
    /// Minimal valid-shaped record for validation endpoints.
    Validation,
    /// A single-message conversation for chat/AI endpoints.
    Chat,
    /// A search query.
    Search,
}

impl SamplePayload {
    pub fn body(&self) -> Value {
        match self {
            SamplePayload::Empty => json!({}),
            SamplePayload::Validation => json!({
                "name": "Health Check",
                "email": "healthcheck@example.com",
                "data": {},
            }),
            SamplePayload::Chat => json!({
                "messages": [{ "role": "user", "content": "ping" }],
            }),
            SamplePayload::Search => json!({ "query": "health check" }),
        }
    }
}

/// Query parameters in the order they appear. Repeated keys are kept.
pub type QueryParams = Vec<(String, String)>;

/// One endpoint in the probe catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// URL path, may carry a literal query string.
    pub path: String,
    pub method: HttpMethod,
    /// Whether a 401/403 from this endpoint is a failure rather than proof
    /// of a working auth boundary.
    #[serde(default)]
    pub requires_auth: bool,
    pub category: String,
    #[serde(default)]
    pub payload: SamplePayload,
}

impl EndpointDescriptor {
    pub fn get(path: &str, category: &str) -> Self {
        Self {
            path: path.to_string(),
            method: HttpMethod::Get,
            requires_auth: false,
            category: category.to_string(),
            payload: SamplePayload::Empty,
        }
    }

    pub fn post(path: &str, category: &str, payload: SamplePayload) -> Self {
        Self {
            path: path.to_string(),
            method: HttpMethod::Post,
            requires_auth: false,
            category: category.to_string(),
            payload,
        }
    }

    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Split the path into its base and query parameters.
    ///
    /// `/api/search?q=x&page=2` yields `("/api/search", [(q, x), (page, 2)])`.
    /// A parameter without `=` maps to an empty value.
    pub fn query(&self) -> (&str, QueryParams) {
        let Some((base, query)) = self.path.split_once('?') else {
            return (self.path.as_str(), Vec::new());
        };

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        (base, params)
    }
}

/// Lifecycle of a single endpoint test within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Pending,
    Success,
    Error,
}

impl TestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Pending)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pending => "⏳",
            TestStatus::Success => "✅",
            TestStatus::Error => "❌",
        }
    }
}

/// Outcome of probing one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTestResult {
    pub endpoint: String,
    pub method: HttpMethod,
    pub category: String,
    pub status: TestStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

impl EndpointTestResult {
    /// A fresh pending result for `descriptor`.
    pub fn pending(descriptor: &EndpointDescriptor) -> Self {
        Self {
            endpoint: descriptor.path.clone(),
            method: descriptor.method,
            category: descriptor.category.clone(),
            status: TestStatus::Pending,
            message: None,
            response_time_ms: None,
        }
    }

    /// Move the result to a terminal state.
    ///
    /// Returns `false` and leaves the result untouched if it is already
    /// terminal or `status` is `Pending`.
    pub fn resolve(
        &mut self,
        status: TestStatus,
        message: impl Into<String>,
        response_time_ms: Option<u64>,
    ) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.message = Some(message.into());
        self.response_time_ms = response_time_ms;
        true
    }

    /// Whether this test exercises an authentication boundary.
    pub fn is_auth_related(&self) -> bool {
        let category = self.category.to_ascii_lowercase();
        category.contains("auth")
            || category.contains("security")
            || self.endpoint.to_ascii_lowercase().contains("/auth")
    }
}

/// Result of a non-endpoint check (e.g. a frontend component probe).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTestResult {
    pub name: String,
    pub status: TestStatus,
    #[serde(default)]
    pub message: Option<String>,
}

/// Aggregate counters over a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestProgress {
    pub total: usize,
    pub completed: usize,
    pub success: usize,
    pub error: usize,
    pub pending: usize,
    pub percentage: u8,
}

/// Frontend connectivity survey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendCheck {
    pub total: usize,
    pub connected: usize,
    pub partial: usize,
    pub disconnected: usize,
}

/// Backend route registration survey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendCheck {
    pub registered: usize,
    pub unregistered: usize,
}

/// Live connectivity snapshot, preferred over the standalone checks when
/// it carries data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStatus {
    pub frontend: Option<FrontendCheck>,
    pub backend: Option<BackendCheck>,
}

/// Weighted health summary. Every rate is within 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub health_score: u8,
    pub connection_rate: u8,
    pub performance_rate: u8,
    pub security_rate: u8,
    pub total_features: usize,
    pub active_features: usize,
    pub partial_features: usize,
    pub inactive_features: usize,
    pub error_features: usize,
}
