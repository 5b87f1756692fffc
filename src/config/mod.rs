#[cfg(feature = "cli")]
pub mod args;
#[cfg(feature = "cli")]
pub mod cli;
pub mod yaml;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
