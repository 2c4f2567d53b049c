//! # Playback Adapter
//!
//! Bridges an opaque media engine to a presentation host.
//!
//! ## Overview
//!
//! This module handles:
//! - The session state machine (uninitialized, preparing, ready, ended, error)
//! - Rendering surface attachment and the "prepared" gate it controls
//! - Periodic position reporting on a cancellable timer
//! - Translation of engine failures into host-facing errors
//! - Binding media locators and building engine sources for them
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{AdapterConfig, DeclaredSize, PlaybackSession};
//!
//! let session = PlaybackSession::new(engine, host, AdapterConfig::default())?;
//! session.set_data_source_uri("https://cdn.example.org/clip.mp4", DeclaredSize::new(320, 240))?;
//! session.set_progress_updating_enabled(true)?;
//! // ... host receives on_prepared_state_changed once the engine is ready
//! session.play()?;
//! ```

pub mod config;
pub mod engine_error;
pub mod error;
mod events;
mod progress;
pub mod session;
pub mod source;
pub mod surface;

pub use config::AdapterConfig;
pub use engine_error::HostError;
pub use error::{PlaybackError, Result};
pub use session::PlaybackSession;
pub use source::{DeclaredSize, HttpMediaSourceFactory, MediaSourceFactory, SourceBinding};
pub use surface::{DisplayTransition, SurfaceBinding, SurfaceRequirement};
