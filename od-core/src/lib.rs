//! OpsDeck Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other OpsDeck crates:
//! - Application configuration (backend URL, assistant API, polling, logging)
//! - Global error types covering all error categories
//! - Structured logging with tracing
//! - Platform path utilities
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{OdError, OdResult};
pub use logging::init_logging;
pub use platform::Platform;
