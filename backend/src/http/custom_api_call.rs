// Custom API call - lets a flow hit any endpoint of a piece's API with its connection

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::{HttpClient, HttpError, HttpMethod, HttpRequest};

/// Inputs of the custom API call action
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomApiCallProps {
    /// Absolute URL, or a path relative to the piece's base URL
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query_params: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    /// Return the error description instead of failing
    #[serde(default)]
    pub failsafe: bool,
    /// Seconds; 0 or absent means no timeout
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Custom API call bound to one piece's base URL and credentials
#[derive(Debug, Clone)]
pub struct CustomApiCall {
    base_url: String,
    auth_headers: HashMap<String, String>,
}

impl CustomApiCall {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_headers: HashMap::new(),
        }
    }

    /// Headers injected from the connection; they win over user supplied ones
    pub fn with_auth_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.auth_headers.insert(name.to_string(), value.into());
        self
    }

    pub fn build_request(&self, props: &CustomApiCallProps) -> HttpRequest {
        let mut headers = props.headers.clone();
        headers.extend(self.auth_headers.clone());

        HttpRequest {
            method: props.method,
            url: resolve_url(&self.base_url, &props.url),
            headers,
            query_params: props.query_params.clone(),
            body: props.body.clone(),
            timeout: props.timeout.filter(|secs| *secs > 0).map(Duration::from_secs),
        }
    }

    pub async fn run(&self, client: &HttpClient, props: CustomApiCallProps) -> Result<Value, HttpError> {
        match client.send(self.build_request(&props)).await {
            Ok(response) => Ok(serde_json::to_value(response).unwrap_or(Value::Null)),
            Err(err) if props.failsafe => {
                tracing::warn!(url = %err.url(), "Custom API call failed, returning error (failsafe): {}", err);
                Ok(err.error_message())
            }
            Err(err) => Err(err),
        }
    }
}

/// Join a base URL and a relative path with exactly one slash between them
pub fn join_base_url(base_url: &str, relative_path: &str) -> String {
    let base = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    format!("{}{}", base, relative_path.strip_prefix('/').unwrap_or(relative_path))
}

/// Absolute `http(s)://` URLs pass through, anything else is relative to the base
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        join_base_url(base_url, url)
    }
}
