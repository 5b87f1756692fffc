use crate::core::ResponseSource;
use crate::utils::error::{HelperError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// GETs `url` and decodes the body as JSON. Any non-2xx status is an
    /// error; the body of a failed response is not inspected.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        validate_url("url", url)?;

        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(HelperError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// One-shot GET with a default client.
pub async fn api_get_request(url: &str) -> Result<Value> {
    ApiClient::new().get_json(url).await
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: ApiClient,
    url: String,
}

impl HttpSource {
    pub fn new(client: ApiClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ResponseSource for HttpSource {
    async fn fetch(&self) -> Result<Value> {
        self.client.get_json(&self.url).await
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/posts");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([{"id": 1, "title": "hello"}]));
        });

        let value = api_get_request(&server.url("/posts")).await.unwrap();

        api_mock.assert();
        assert_eq!(value, json!([{"id": 1, "title": "hello"}]));
    }

    #[tokio::test]
    async fn test_get_json_error_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let err = api_get_request(&server.url("/missing")).await.unwrap_err();

        api_mock.assert();
        match err {
            HelperError::HttpStatusError { url, status } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/missing"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_invalid_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/text");
            then.status(200).body("not json at all");
        });

        let err = api_get_request(&server.url("/text")).await.unwrap_err();
        assert!(matches!(err, HelperError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_get_json_rejects_invalid_url() {
        let err = api_get_request("ftp://example.com/data").await.unwrap_err();
        assert!(matches!(err, HelperError::InvalidConfigValueError { .. }));
    }

    #[tokio::test]
    async fn test_http_source_with_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/user");
            then.status(200).json_body(json!({"id": 7}));
        });

        let client = ApiClient::with_timeout(Duration::from_secs(5)).unwrap();
        let source = HttpSource::new(client, server.url("/user"));

        assert_eq!(source.fetch().await.unwrap(), json!({"id": 7}));
        assert!(source.describe().ends_with("/user"));
    }
}
