//! Process-level plumbing shared by server binaries: layered configuration
//! and logging initialisation.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, LoggingConfig, Section, ServerConfig};
pub use logging::init_logging_from_config;
