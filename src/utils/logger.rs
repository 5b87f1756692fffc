use crate::utils::error::{HelperError, Result};
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub const DEFAULT_LOGGER_NAME: &str = "api_helpers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogStream {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Json,
}

impl FromStr for LogFormat {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(HelperError::InvalidConfigValueError {
                field: "log_format".to_string(),
                value: other.to_string(),
                reason: "Expected one of: compact, full, json".to_string(),
            }),
        }
    }
}

/// Settings for a named logger.
///
/// `name` becomes the target prefix of the filter directive, so only events
/// emitted under that target (e.g. `api_helpers::core::remap`) reach the
/// output unless `RUST_LOG` says otherwise.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub name: String,
    pub stream: LogStream,
    pub format: LogFormat,
    pub level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOGGER_NAME.to_string(),
            stream: LogStream::Stdout,
            format: LogFormat::Compact,
            level: "info".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_stream(mut self, stream: LogStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 產生 EnvFilter 指令，例如 `api_helpers=info`
    pub fn directive(&self) -> Result<String> {
        let level = normalize_level(&self.level)?;
        Ok(format!("{}={}", self.name.replace('-', "_"), level))
    }
}

fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" | "critical" => Ok("error"),
        "off" => Ok("off"),
        other => Err(HelperError::InvalidConfigValueError {
            field: "level".to_string(),
            value: other.to_string(),
            reason: "Expected one of: trace, debug, info, warn, error, off".to_string(),
        }),
    }
}

fn build_filter(config: &LoggerConfig) -> Result<EnvFilter> {
    let directive = config.directive()?;
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&directive).map_err(|e| HelperError::ConfigError {
            message: format!("Invalid log filter '{}': {}", directive, e),
        }),
    }
}

pub fn build_subscriber(
    config: &LoggerConfig,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let filter = build_filter(config)?;

    let writer = match config.stream {
        LogStream::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogStream::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let base = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Full => base.boxed(),
        LogFormat::Json => base.json().boxed(),
    };

    Ok(tracing_subscriber::registry().with(layer).with(filter))
}

/// Installs the logger as the global default.
///
/// Unlike a plain `init()`, a second call reports a configuration error
/// instead of panicking.
pub fn init_logger(config: &LoggerConfig) -> Result<()> {
    build_subscriber(config)?
        .try_init()
        .map_err(|e| HelperError::ConfigError {
            message: format!("Logger already initialized: {}", e),
        })
}

pub fn init_cli_logger(verbose: bool, format: LogFormat) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    // 日誌寫到 stderr，stdout 留給輸出的 JSON
    let config = LoggerConfig::default()
        .with_stream(LogStream::Stderr)
        .with_format(format)
        .with_level(level);
    init_logger(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_uses_name_and_level() {
        let config = LoggerConfig::new("my-tool").with_level("WARNING");
        assert_eq!(config.directive().unwrap(), "my_tool=warn");

        let config = LoggerConfig::default();
        assert_eq!(config.directive().unwrap(), "api_helpers=info");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggerConfig::default().with_level("loud");
        assert!(matches!(
            config.directive(),
            Err(HelperError::InvalidConfigValueError { .. })
        ));
        assert!(build_subscriber(&config).is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_scoped_subscriber_for_each_format() {
        for format in [LogFormat::Compact, LogFormat::Full, LogFormat::Json] {
            let config = LoggerConfig::default()
                .with_stream(LogStream::Stderr)
                .with_format(format)
                .with_level("debug");
            let subscriber = build_subscriber(&config).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                tracing::debug!(format = ?format, "scoped logger works");
            });
        }
    }
}
