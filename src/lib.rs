pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{
    args::{parse_args, parse_args_from, ArgParser, ArgSpec},
    CliConfig,
};

pub use adapters::{api_get_request, ApiClient, FileSource, HttpSource};
pub use config::yaml::{load_yaml, parse_yaml};
pub use core::{
    engine::ReshapeEngine,
    remap::{format_record, format_records, format_response},
    Formatted, FormattedRecord, KeyMap, Record, TargetSpec,
};
pub use utils::error::{HelperError, Result};
pub use utils::logger::{init_logger, LoggerConfig};
