use crate::config::yaml;
use crate::core::KeyMap;
use crate::utils::error::{HelperError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use clap::{ArgGroup, Parser};

#[derive(Debug, Clone, Parser)]
#[command(name = "api-helpers")]
#[command(about = "Fetch an API response and reshape it with a YAML key-map")]
#[command(group(ArgGroup::new("source").required(true).args(["url", "input"])))]
pub struct CliConfig {
    /// Path to the YAML key-map
    #[arg(short, long)]
    pub key_map: String,

    /// Endpoint to GET
    #[arg(long)]
    pub url: Option<String>,

    /// Saved JSON or YAML response to read instead of calling an API
    #[arg(short, long)]
    pub input: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Replace ${VAR} placeholders in the key-map from the environment
    #[arg(long)]
    pub expand_env: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, default_value = "compact", help = "Log format: compact, full or json")]
    pub log_format: String,
}

impl CliConfig {
    pub fn log_format(&self) -> Result<LogFormat> {
        self.log_format.parse()
    }

    pub fn load_key_map(&self) -> Result<KeyMap> {
        if self.expand_env {
            KeyMap::try_from(yaml::parse_yaml_with_env(&self.key_map)?)
        } else {
            yaml::load_yaml(&self.key_map)
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("key_map", &self.key_map)?;

        if let Some(url) = &self.url {
            validate_url("url", url)?;
        }
        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }
        if self.url.is_none() && self.input.is_none() {
            return Err(HelperError::ConfigError {
                message: "Either --url or --input is required".to_string(),
            });
        }

        if self.timeout == Some(0) {
            return Err(HelperError::InvalidConfigValueError {
                field: "timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }

        validate_non_empty_string("log_format", &self.log_format)?;
        self.log_format()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_and_validate() {
        let config = CliConfig::try_parse_from([
            "api-helpers",
            "--key-map",
            "map.yaml",
            "--url",
            "https://jsonplaceholder.typicode.com/users",
            "--pretty",
        ])
        .unwrap();

        assert!(config.validate().is_ok());
        assert!(config.pretty);
        assert_eq!(config.log_format().unwrap(), LogFormat::Compact);
    }

    #[test]
    fn test_source_is_required_and_exclusive() {
        assert!(CliConfig::try_parse_from(["api-helpers", "-k", "map.yaml"]).is_err());
        assert!(CliConfig::try_parse_from([
            "api-helpers",
            "-k",
            "map.yaml",
            "--url",
            "https://example.com",
            "--input",
            "resp.json",
        ])
        .is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = CliConfig::try_parse_from([
            "api-helpers",
            "-k",
            "map.yaml",
            "--url",
            "ftp://example.com",
        ])
        .unwrap();
        assert!(config.validate().is_err());

        config.url = Some("https://example.com".to_string());
        config.timeout = Some(0);
        assert!(config.validate().is_err());

        config.timeout = Some(10);
        config.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_key_map_with_env() {
        std::env::set_var("API_HELPERS_CLI_TARGET", "renamed");
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map.yaml");
        std::fs::write(&path, "id: ${API_HELPERS_CLI_TARGET}\n").unwrap();

        let config = CliConfig::try_parse_from([
            "api-helpers",
            "-k",
            path.to_str().unwrap(),
            "-i",
            "resp.json",
            "--expand-env",
        ])
        .unwrap();

        let key_map = config.load_key_map().unwrap();
        assert_eq!(
            key_map,
            KeyMap::new().rename("id", "renamed")
        );
    }
}
