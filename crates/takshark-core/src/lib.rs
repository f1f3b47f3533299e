//! # takshark core
//!
//! Shared error handling and configuration for the takshark host.
//!
//! - **Errors**: `thiserror` error types for configuration, input and
//!   listener failures, serializable so they can be reported next to JSON
//!   records.
//! - **Configuration**: YAML files with `TAKSHARK__*` environment overrides,
//!   covering port routing, decoder limits and logging.
//!
//! ## Example
//!
//! ```
//! use takshark_core::config::{AppConfig, PortRole};
//!
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.ports.role(8089), Some(PortRole::Omni));
//! ```

pub mod config;
pub mod error;

pub use config::{AppConfig, DissectConfig, LogFormat, LoggingConfig, PortConfig, PortRole};
pub use error::{ConfigError, InputError, IoError, IoErrorKind, ListenError, Result, TakSharkError};
