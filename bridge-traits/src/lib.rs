//! # Host Bridge Traits
//!
//! Contracts between the playback core and the platform it runs on.
//!
//! ## Overview
//!
//! The playback core sits between two collaborators it does not own:
//!
//! - a **media engine** that decodes and renders a stream
//!   ([`MediaEngine`](engine::MediaEngine)), reporting progress through a
//!   single [`EngineListener`](engine::EngineListener);
//! - a **presentation host** that issues commands and receives lifecycle
//!   callbacks ([`PlayerHost`](player::PlayerHost)).
//!
//! Each platform ships concrete implementations of these traits. The core
//! only ever talks to them through the types defined here.
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Malformed media locators are reported as [`BridgeError`](error::BridgeError).
//! Engine failures that happen asynchronously are delivered as
//! [`EngineEvent::Error`](engine::EngineEvent::Error) instead.
//!
//! ## Thread Safety
//!
//! On native targets engines must be `Send` and hosts/listeners `Send + Sync`
//! (see [`platform`]). Engines may deliver events from their own worker
//! threads.

pub mod engine;
pub mod error;
pub mod logging;
pub mod platform;
pub mod player;

pub use error::BridgeError;

pub use engine::{
    EngineErrorKind, EngineEvent, EngineFailure, EngineListener, EngineState, MediaEngine,
    MediaSource, SurfaceHandle,
};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use player::{PlayerHost, SessionPhase, SessionStatus};
