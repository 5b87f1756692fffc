use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Invalid key-map entry at '{path}': expected null, string or mapping, found {found}")]
    InvalidKeyMapEntry { path: String, found: String },

    #[error("Invalid input shape: expected {expected}, found {found}")]
    InvalidInputShape { expected: String, found: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API request to {url} returned status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error in {path}: {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("Invalid argument spec {definition}: {reason}")]
    InvalidArgSpecError { definition: String, reason: String },

    #[cfg(feature = "cli")]
    #[error("{0}")]
    ArgumentError(clap::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HelperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HelperError::InvalidKeyMapEntry { .. }
            | HelperError::InvalidInputShape { .. }
            | HelperError::SerializationError(_) => ErrorCategory::Input,
            HelperError::ApiError(_) | HelperError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            HelperError::YamlError { .. }
            | HelperError::InvalidArgSpecError { .. }
            | HelperError::ConfigError { .. }
            | HelperError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            #[cfg(feature = "cli")]
            HelperError::ArgumentError(_) => ErrorCategory::Configuration,
            HelperError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可以重試
            HelperError::ApiError(_) => ErrorSeverity::Medium,
            HelperError::HttpStatusError { status, .. } if *status >= 500 => {
                ErrorSeverity::Medium
            }
            HelperError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            HelperError::InvalidKeyMapEntry { path, .. } => format!(
                "Set '{}' to null, a target name, or a nested mapping",
                path
            ),
            HelperError::InvalidInputShape { .. } => {
                "Make sure the response is an object or a list of objects".to_string()
            }
            HelperError::ApiError(_) => {
                "Check the network connection and that the endpoint is reachable".to_string()
            }
            HelperError::HttpStatusError { status, .. } if *status >= 500 => {
                "The server failed; try again later".to_string()
            }
            HelperError::HttpStatusError { .. } => {
                "Check the URL, query parameters and credentials".to_string()
            }
            HelperError::IoError(_) => "Check that the file exists and is readable".to_string(),
            HelperError::SerializationError(_) => {
                "Make sure the payload is valid JSON".to_string()
            }
            HelperError::YamlError { path, .. } => {
                format!("Fix the YAML syntax in {}", path)
            }
            HelperError::InvalidArgSpecError { .. } => {
                "Use '-x' / '--name' for options and a bare name for positionals".to_string()
            }
            #[cfg(feature = "cli")]
            HelperError::ArgumentError(_) => "Run with --help to see usage".to_string(),
            HelperError::ConfigError { .. } | HelperError::InvalidConfigValueError { .. } => {
                "Review the command line options".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HelperError::InvalidKeyMapEntry { path, .. } => {
                format!("The key-map entry '{}' is not valid", path)
            }
            HelperError::InvalidInputShape { found, .. } => {
                format!("Cannot reshape a response of type {}", found)
            }
            HelperError::ApiError(_) => "Could not reach the API".to_string(),
            HelperError::HttpStatusError { url, status } => {
                format!("{} answered with HTTP {}", url, status)
            }
            HelperError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "cli")]
impl From<clap::Error> for HelperError {
    fn from(e: clap::Error) -> Self {
        HelperError::ArgumentError(e)
    }
}

pub type Result<T> = std::result::Result<T, HelperError>;
