use crate::utils::error::{HelperError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// 從 YAML 檔案載入任意文件
pub fn parse_yaml<P: AsRef<Path>>(path: P) -> Result<Value> {
    load_yaml(path)
}

/// 從 YAML 字串解析
pub fn parse_yaml_str(content: &str) -> Result<Value> {
    from_yaml_str("<string>", content)
}

/// Loads a YAML file straight into a typed value, e.g. a `KeyMap` or a list
/// of `ArgSpec`s.
pub fn load_yaml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    tracing::debug!("Loading YAML from: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&path.display().to_string(), &content)
}

/// Same as [`parse_yaml`], but `${VAR}` placeholders are replaced from the
/// environment first. Unknown variables are left untouched.
pub fn parse_yaml_with_env<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let processed = substitute_env_vars(&content)?;
    from_yaml_str(&path.display().to_string(), &processed)
}

fn from_yaml_str<T: DeserializeOwned>(origin: &str, content: &str) -> Result<T> {
    serde_yml::from_str(content).map_err(|source| HelperError::YamlError {
        path: origin.to_string(),
        source,
    })
}

/// 替換環境變數 (例如 ${API_TOKEN})
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HelperError::ConfigError {
        message: format!("Invalid placeholder pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
