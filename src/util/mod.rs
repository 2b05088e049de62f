//! Utility modules for dockstrap

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
