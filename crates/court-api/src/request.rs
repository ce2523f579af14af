//! Request helper shared by every endpoint
//!
//! [`ApiClient`] resolves endpoint paths against the backend origin, applies
//! the default JSON headers and normalizes every failure into an
//! [`ApiError`]. It never retries; retry decisions belong to the caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::io::{HttpClient, HttpRequest, Method};

/// Origin of the hosted scheduler backend
pub const DEFAULT_BASE_URL: &str = "https://tennis-scheduler-tfc.fly.dev";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Per-request options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the defaults; a header with the same name replaces the default
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Client for the court scheduler backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("Created ApiClient for {}", base_url);
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Perform a request and return the decoded JSON body
    ///
    /// Responses whose content type is not JSON resolve to an empty object
    /// without reading the body.
    pub async fn request_value(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let request = HttpRequest {
            method: options.method,
            url: self.url(endpoint),
            headers: merge_headers(options.headers),
            body: options.body,
        };
        let method = request.method;

        // Transport failures are already ApiErrors and pass through as-is
        let response = self.http.send(request).await?;

        if !response.is_success() {
            tracing::debug!(
                "{} {} failed: {} {}",
                method,
                endpoint,
                response.status,
                response.status_text
            );
            return Err(ApiError::http(response.status, response.status_text));
        }

        let is_json = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));
        if !is_json {
            tracing::debug!(
                "{} {} returned non-JSON content ({:?}), treating as empty",
                method,
                endpoint,
                response.content_type
            );
            return Ok(Value::Object(serde_json::Map::new()));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::debug!("{} {} returned unparseable JSON: {}", method, endpoint, e);
            ApiError::network(e)
        })
    }

    /// Perform a request and decode the body into `T`
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.request_value(endpoint, options).await?;
        serde_json::from_value(value).map_err(|e| {
            tracing::debug!("Response from {} has unexpected shape: {}", endpoint, e);
            ApiError::network(e)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::method(Method::Get))
            .await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, with_json_body(Method::Post, body)?)
            .await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, with_json_body(Method::Put, body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::method(Method::Delete))
            .await
    }
}

fn with_json_body<B: Serialize + ?Sized>(
    method: Method,
    body: Option<&B>,
) -> Result<RequestOptions> {
    let mut options = RequestOptions::method(method);
    if let Some(body) = body {
        let encoded = serde_json::to_string(body).map_err(|e| {
            ApiError::unavailable(format!("Failed to encode request body: {}", e))
        })?;
        options.body = Some(encoded);
    }
    Ok(options)
}

fn merge_headers(overrides: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())];
    for (name, value) in overrides {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }
    headers
}
