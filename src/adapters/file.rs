use crate::config::yaml;
use crate::core::ResponseSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Reads a response saved on disk. YAML is a superset of JSON, so both
/// formats go through the YAML loader.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResponseSource for FileSource {
    async fn fetch(&self) -> Result<Value> {
        tracing::debug!("Reading response from file: {}", self.path.display());
        yaml::parse_yaml(&self.path)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
