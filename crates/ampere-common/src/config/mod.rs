//! Configuration loading

mod runtime_config;

pub use runtime_config::{ConfigError, RuntimeConfig};
