pub mod catalog;
pub mod config;
pub mod types;

pub use catalog::default_catalog;
pub use config::{ConfigError, DEFAULT_BATCH_SIZE, PulseConfig};
pub use types::*;
