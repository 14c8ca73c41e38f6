//! HTTP client implementation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
};

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: String,
}

impl JsonResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Exactly 200, not just any 2xx
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Body parsed as a JSON object, if it is one
    pub fn json_object(&self) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Mockable HTTP client trait
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// POST a JSON document.
    ///
    /// Any response that arrives is returned as-is, whatever its status.
    /// Errors are reserved for requests that never produced a response.
    async fn post_json(&self, url: &str, body: &Value) -> Result<JsonResponse>;
}

/// Production HTTP client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .https_only(config.https_only)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn map_send_error(&self, error: reqwest::Error) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout(self.config.timeout())
        } else {
            HttpError::RequestFailed(error)
        }
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<JsonResponse> {
        let url = url
            .parse::<url::Url>()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        debug!("HTTP POST: {}", url);

        // .json() also sets Content-Type: application/json
        let response = self
            .inner
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        debug!("HTTP {} ({} bytes)", status, body.len());
        Ok(JsonResponse { status, body })
    }
}

/// Create a shared HTTP client (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpClientTrait>> {
    Ok(Arc::new(HttpClient::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation_with_defaults() {
        let client = HttpClient::with_defaults();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_creation_with_config() {
        let config = HttpConfig::default().with_timeout(Duration::from_secs(10));

        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.config().timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_proxy() {
        let config = HttpConfig::default().with_proxy("invalid-proxy");

        let result = HttpClient::new(config);
        assert!(matches!(result, Err(HttpError::InvalidProxy(_))));
    }

    #[tokio::test]
    async fn test_post_invalid_url() {
        let client = HttpClient::with_defaults().unwrap();
        let result = client.post_json("not a url", &Value::Null).await;
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = HttpClient::with_defaults().unwrap();
        let err = client
            .post_json("http://127.0.0.1:1/check-update", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_json_object_only_accepts_maps() {
        let map = JsonResponse::new(StatusCode::OK, r#"{"new_version":"1.0.0"}"#);
        assert!(map.json_object().is_some());

        let list = JsonResponse::new(StatusCode::OK, "[1,2,3]");
        assert!(list.json_object().is_none());

        let garbage = JsonResponse::new(StatusCode::OK, "<html>");
        assert!(garbage.json_object().is_none());
    }

    #[test]
    fn test_is_ok_requires_exact_200() {
        assert!(JsonResponse::new(StatusCode::OK, "").is_ok());
        assert!(!JsonResponse::new(StatusCode::CREATED, "").is_ok());
        assert!(!JsonResponse::new(StatusCode::FORBIDDEN, "").is_ok());
    }
}
