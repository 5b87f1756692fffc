pub mod engine;
pub mod remap;

pub use crate::domain::model::{Formatted, FormattedRecord, KeyMap, Record, TargetSpec};
pub use crate::domain::ports::ResponseSource;
pub use crate::utils::error::Result;
