//! # takshark
//!
//! Reference host for the takshark decoder: reads captured payloads or live
//! sockets, hands each buffer to [`takshark_dissect::Dissector`] and prints
//! one line per outcome.
//!
//! - [`input`]: hex strings and capture files from the command line
//! - [`render`]: text and JSON output
//! - [`listen`]: tokio TCP and UDP listeners on the configured ports
//! - [`logging`]: `tracing-subscriber` setup from [`LoggingConfig`](takshark_core::LoggingConfig)

pub mod input;
pub mod listen;
pub mod logging;
pub mod render;

use takshark_core::DissectConfig;
use takshark_dissect::{DissectOptions, Dissector};

/// Build a dissector from the decoder section of the configuration.
pub fn dissector_from_config(config: &DissectConfig) -> Dissector {
    Dissector::new(DissectOptions {
        preview_bytes: config.preview_bytes,
        raw_fields: config.raw_fields,
    })
}
