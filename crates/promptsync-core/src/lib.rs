//! PromptSync Core: conversation records, error taxonomy, configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    Config, ConfigProvider, DataPaths, FixedConfig, ServerSettings, MAX_SYNC_INTERVAL_MINUTES,
};
pub use error::{Error, ErrorKind, Result};
pub use types::*;
