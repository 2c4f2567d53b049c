//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback crates:
//! - Logging and tracing setup (`tracing-subscriber`)
//! - Forwarding of log events to a host [`LoggerSink`](bridge_traits::LoggerSink)
//! - Redaction helpers for media locators

pub mod error;
pub mod logging;

pub use error::{Error, Result};
