//! Media engine bridge.
//!
//! The decoding engine (codec internals, network fetch, demux, rendering) is an
//! opaque collaborator. The core drives it through [`MediaEngine`] and learns
//! about its progress through a single [`EngineListener`] registered once per
//! session.
//!
//! All engine calls are expected to return immediately. Any blocking I/O the
//! engine performs happens on its own worker context; results come back as
//! [`EngineEvent`]s.

use crate::platform::{PlatformSend, PlatformSendSync};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Internal playback state reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No media prepared, or the engine was stopped.
    Idle,
    /// Media is prepared but the engine cannot play from the current position yet.
    Buffering,
    /// The engine can start playing immediately from the current position.
    Ready,
    /// Playback reached the end of the media.
    Ended,
}

/// Classification of a fatal engine failure.
///
/// The numeric codes are part of the host contract: they are forwarded verbatim
/// in `PlayerHost::on_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineErrorKind {
    /// Loading or parsing the media source failed.
    Source,
    /// A renderer (audio/video/text) failed.
    Renderer,
    /// Unexpected internal engine failure.
    Unexpected,
    /// Engine-specific code with no dedicated variant.
    Other(i32),
}

impl EngineErrorKind {
    /// Numeric code reported to the host.
    pub fn code(&self) -> i32 {
        match self {
            EngineErrorKind::Source => 0,
            EngineErrorKind::Renderer => 1,
            EngineErrorKind::Unexpected => 2,
            EngineErrorKind::Other(code) => *code,
        }
    }
}

/// Fatal failure reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub kind: EngineErrorKind,
    /// Index of the failing renderer, or `-1` when not renderer related.
    pub renderer_index: i32,
    /// Optional engine-provided detail text.
    pub detail: Option<String>,
}

impl EngineFailure {
    pub fn new(kind: EngineErrorKind, renderer_index: i32) -> Self {
        Self {
            kind,
            renderer_index,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Events emitted by the engine, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine's playback state or play-when-ready intent changed.
    StateChanged {
        play_when_ready: bool,
        state: EngineState,
    },
    /// Intrinsic video size of the current media changed.
    VideoSizeChanged { width: u32, height: u32 },
    /// Fatal error for the current media.
    Error(EngineFailure),
}

/// Receiver for engine events.
///
/// A session registers exactly one listener with its engine at construction
/// and never swaps it. Engines may call `on_engine_event` from any thread.
pub trait EngineListener: PlatformSendSync {
    fn on_engine_event(&self, event: EngineEvent);
}

/// Opaque handle to a host rendering target.
///
/// The core never inspects the handle; it only forwards it to the engine. The
/// raw value is whatever the host platform uses to identify a surface (a
/// native window pointer, a texture id, a compositor node id, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Media source handed to [`MediaEngine::prepare`].
///
/// Built fresh for every bind by a media source factory in the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    /// Locator of the media.
    pub locator: Url,
    /// User agent the engine should send for network fetches.
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Whether redirects between http and https are followed.
    pub allow_cross_protocol_redirects: bool,
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locator)
    }
}

/// Bridge to a platform media engine.
///
/// Implementations wrap a native player (ExoPlayer, AVPlayer, GStreamer, an
/// in-house decoder, ...). Every method must be non-blocking.
pub trait MediaEngine: PlatformSend {
    /// Register the single listener that receives every engine event.
    fn set_listener(&mut self, listener: Arc<dyn EngineListener>);

    /// Start preparing `source`. Readiness is reported later via
    /// [`EngineEvent::StateChanged`].
    fn prepare(&mut self, source: MediaSource);

    /// Stop playback and drop the prepared media. The engine stays usable.
    fn stop(&mut self);

    /// Release all native resources. The engine is unusable afterwards.
    fn release(&mut self);

    /// Set whether playback proceeds as soon as the engine is ready.
    fn set_play_when_ready(&mut self, play_when_ready: bool);

    fn play_when_ready(&self) -> bool;

    fn playback_state(&self) -> EngineState;

    /// Seek to an absolute position in milliseconds.
    fn seek_to(&mut self, position_ms: i64);

    /// Duration in milliseconds, or a negative value when unknown.
    fn duration_ms(&self) -> i64;

    fn current_position_ms(&self) -> i64;

    fn buffered_position_ms(&self) -> i64;

    /// Route video output to `surface`, or detach output with `None`.
    fn set_video_surface(&mut self, surface: Option<SurfaceHandle>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_codes() {
        assert_eq!(EngineErrorKind::Source.code(), 0);
        assert_eq!(EngineErrorKind::Renderer.code(), 1);
        assert_eq!(EngineErrorKind::Unexpected.code(), 2);
        assert_eq!(EngineErrorKind::Other(42).code(), 42);
    }

    #[test]
    fn failure_builder() {
        let failure = EngineFailure::new(EngineErrorKind::Renderer, 1).with_detail("codec init");
        assert_eq!(failure.renderer_index, 1);
        assert_eq!(failure.detail.as_deref(), Some("codec init"));
    }

    #[test]
    fn media_source_displays_locator() {
        let source = MediaSource {
            locator: Url::parse("https://cdn.media.ccc.de/talk.mp4").unwrap(),
            user_agent: "test".into(),
            connect_timeout: Duration::from_secs(8),
            read_timeout: Duration::from_secs(8),
            allow_cross_protocol_redirects: true,
        };
        assert_eq!(source.to_string(), "https://cdn.media.ccc.de/talk.mp4");
    }
}
