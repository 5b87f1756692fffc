use crate::core::{remap, Formatted, KeyMap, ResponseSource};
use crate::utils::error::Result;
use serde_json::Value;

pub struct ReshapeEngine<S: ResponseSource> {
    source: S,
    key_map: KeyMap,
}

impl<S: ResponseSource> ReshapeEngine<S> {
    pub fn new(source: S, key_map: KeyMap) -> Self {
        Self { source, key_map }
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub async fn run(&self) -> Result<Formatted> {
        tracing::info!("Fetching response from {}", self.source.describe());
        let response = self.source.fetch().await?;

        let incoming = match &response {
            Value::Array(items) => items.len(),
            _ => 1,
        };
        tracing::info!("Received {} record(s)", incoming);

        let formatted = remap::format_response(&response, &self.key_map)?;
        tracing::info!(
            "Reshaped {} record(s) with {} key-map entries",
            formatted.record_count(),
            self.key_map.len()
        );

        Ok(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::HelperError;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticSource(Value);

    #[async_trait]
    impl ResponseSource for StaticSource {
        async fn fetch(&self) -> Result<Value> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ResponseSource for FailingSource {
        async fn fetch(&self) -> Result<Value> {
            Err(HelperError::HttpStatusError {
                url: "http://test.com".to_string(),
                status: 502,
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test]
    async fn test_run_reshapes_batch() {
        let source = StaticSource(json!([
            {"id": 1, "title": "a", "userId": 7},
            {"id": 2, "title": "", "userId": 8}
        ]));
        let engine = ReshapeEngine::new(source, KeyMap::new().same("id").rename("title", "name"));

        let formatted = engine.run().await.unwrap();
        assert_eq!(
            serde_json::to_value(formatted).unwrap(),
            json!([{"id": 1, "name": "a"}, {"id": 2}])
        );
    }

    #[tokio::test]
    async fn test_run_propagates_source_error() {
        let engine = ReshapeEngine::new(FailingSource, KeyMap::new().same("id"));
        assert!(matches!(
            engine.run().await,
            Err(HelperError::HttpStatusError { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn test_run_rejects_scalar_response() {
        let engine = ReshapeEngine::new(StaticSource(json!("ok")), KeyMap::new().same("id"));
        assert!(matches!(
            engine.run().await,
            Err(HelperError::InvalidInputShape { .. })
        ));
    }
}
