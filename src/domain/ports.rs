use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Anything that can hand back a decoded response for the remapper.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    async fn fetch(&self) -> Result<Value>;

    /// Human readable origin, used in logs.
    fn describe(&self) -> String;
}
