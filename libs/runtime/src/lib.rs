//! Process-level plumbing shared by the server binary: layered configuration
//! and logging setup.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    AppConfig, AppConfigProvider, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig,
};
