//! GraphQL-over-HTTP transport
//!
//! The transport owns wire details only: request serialisation, timeout and
//! status handling, and splitting the response into root-field data or
//! GraphQL errors. Mapping into entities happens in [`crate::mapper`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::document::QueryDocument;
use crate::{GatewayError, Result};

/// Header marking the payload as a GraphQL request for the remote functions
pub const REQUEST_TYPE_HEADER: &str = "X-REQUEST-TYPE";

/// Executes compiled documents against a remote endpoint
///
/// On success the value under the document's root field is returned,
/// `Value::Null` included.
#[async_trait]
pub trait GraphQLTransport: Send + Sync {
    /// Execute `document` against the function reachable at `route`
    async fn execute(&self, route: &str, document: &QueryDocument) -> Result<Value>;
}

/// reqwest-backed transport posting to `base_url + route`
#[derive(Debug, Clone)]
pub struct HttpGraphQLTransport {
    client: Client,
    base_url: Url,
}

impl HttpGraphQLTransport {
    /// Build a transport whose calls are bounded by `timeout`
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl GraphQLTransport for HttpGraphQLTransport {
    async fn execute(&self, route: &str, document: &QueryDocument) -> Result<Value> {
        let endpoint = endpoint_url(&self.base_url, route)?;
        debug!(%endpoint, document = %document.text, "Sending GraphQL document");

        let response = self
            .client
            .post(endpoint)
            .header(REQUEST_TYPE_HEADER, "GraphQL")
            .header(header::ACCEPT, "application/json")
            .json(&document.request_body())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let err = map_status_error(status, &body);
            error!(root_field = %document.root_field, error = %err, "GraphQL call failed");
            return Err(err);
        }

        extract_root(&body, &document.root_field)
    }
}

/// Join a function route onto a base URL, keeping any base path
pub(crate) fn endpoint_url(base: &Url, route: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        route.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| GatewayError::Config(format!("Invalid endpoint {}: {}", joined, e)))
}

#[derive(Deserialize, Debug)]
struct GraphQLResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQLErrorEntry>>,
}

#[derive(Deserialize, Debug)]
struct GraphQLErrorEntry {
    message: Option<Value>,
}

/// Split a 2xx body into root-field data or protocol errors
///
/// A non-empty `errors` array wins over any partial `data`.
pub(crate) fn extract_root(body: &[u8], root_field: &str) -> Result<Value> {
    let response: GraphQLResponse = serde_json::from_slice(body)
        .map_err(|e| GatewayError::Mapping(format!("Invalid GraphQL response: {}", e)))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors
            .into_iter()
            .map(|entry| match entry.message {
                Some(Value::String(message)) => message,
                Some(other) => other.to_string(),
                None => "Unknown GraphQL error".to_string(),
            })
            .collect();
        error!(root_field, errors = %messages.join("; "), "GraphQL errors returned");
        return Err(GatewayError::Protocol(messages));
    }

    match response.data {
        Some(Value::Object(mut data)) => {
            let value = data.remove(root_field).unwrap_or(Value::Null);
            debug!(root_field, raw = %value, "Raw response data");
            Ok(value)
        }
        Some(Value::Null) | None => Err(GatewayError::Protocol(vec![format!(
            "No data returned for field: {}",
            root_field
        )])),
        Some(other) => Err(GatewayError::Mapping(format!(
            "Expected 'data' to be an object, found {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Transport(format!("timed out: {}", err))
    } else {
        GatewayError::Transport(err.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let preview = body_preview(body);
    if preview.is_empty() {
        GatewayError::Transport(format!("status {}", status.as_u16()))
    } else {
        GatewayError::Transport(format!("status {}: {}", status.as_u16(), preview))
    }
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{}...", preview)
    } else {
        preview
    }
}
