//! REST fallback transport
//!
//! Plain JSON calls against the non-GraphQL function endpoints. Bodies are
//! returned as raw JSON so entity decoding still goes through
//! [`crate::mapper`].

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::transport::{endpoint_url, map_status_error, map_transport_error};
use crate::{GatewayError, Result};

/// Decoded reply of a REST call
#[derive(Debug, Clone, PartialEq)]
pub enum RestReply {
    /// 404 from the remote function
    NotFound,
    /// 2xx without a body
    Empty,
    Json(Value),
}

/// reqwest-backed client for `base_url + route` function endpoints
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
}

impl RestClient {
    /// Build a client whose calls are bounded by `timeout`
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    fn request(&self, method: Method, route: &str, query: &[(&str, String)]) -> Result<RequestBuilder> {
        let endpoint = endpoint_url(&self.base_url, route)?;
        debug!(%method, %endpoint, "Calling REST function");
        Ok(self
            .client
            .request(method, endpoint)
            .header(header::ACCEPT, "application/json")
            .query(query))
    }

    /// GET a JSON resource
    pub async fn fetch(&self, route: &str, query: &[(&str, String)]) -> Result<RestReply> {
        let request = self.request(Method::GET, route, query)?;
        reply(request).await
    }

    /// Send a JSON body with `method`
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        route: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<RestReply> {
        let request = self.request(method, route, query)?.json(body);
        reply(request).await
    }

    /// DELETE and hand back the raw status and body
    pub async fn delete(&self, route: &str, query: &[(&str, String)]) -> Result<(u16, Vec<u8>)> {
        let response = self
            .request(Method::DELETE, route, query)?
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(status, "Delete response received");
        Ok((status, body.to_vec()))
    }
}

async fn reply(request: RequestBuilder) -> Result<RestReply> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    decode_reply(status, &body)
}

fn decode_reply(status: StatusCode, body: &[u8]) -> Result<RestReply> {
    if status == StatusCode::NOT_FOUND {
        return Ok(RestReply::NotFound);
    }
    if !status.is_success() {
        let err = map_status_error(status, body);
        error!(error = %err, "Error calling remote function");
        return Err(err);
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RestReply::Empty);
    }
    serde_json::from_slice(body)
        .map(RestReply::Json)
        .map_err(|e| GatewayError::Mapping(format!("Invalid JSON payload: {}", e)))
}
