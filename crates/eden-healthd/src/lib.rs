//! Eden Registry health daemon library
//!
//! - Configuration loading (defaults, file, environment)
//! - Daemon lifecycle around the Registry health monitor

pub mod config;
pub mod daemon;
pub mod error;

pub use config::{DaemonConfig, LoggingConfig};
pub use daemon::{Daemon, EXIT_OK, EXIT_REJECTED};
pub use error::{DaemonError, DaemonResult};
