//! Configuration for gh-caretaker
//!
//! This crate provides:
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)
//! - Duration string parsing (`24h`, `1h30m`)

pub mod app_config;
pub mod config_file;
pub mod duration;

pub use app_config::AppConfig;
pub use config_file::load_config_file;
pub use duration::{format_duration, parse_duration, DurationError};
