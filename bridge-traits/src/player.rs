//! Presentation host bridge.
//!
//! The host (a playback screen, a TV overlay, a test harness) implements
//! [`PlayerHost`] to receive lifecycle notifications from a playback session.

use crate::platform::PlatformSendSync;
use url::Url;

/// Coarse lifecycle phase of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No source bound, or the session was reset.
    Uninitialized,
    /// A source was handed to the engine and readiness is pending.
    Preparing,
    /// The engine reported ready for the current source.
    Ready,
    /// Playback reached the end of the current source.
    Ended,
    /// The engine reported a fatal error for the current source.
    Error,
}

/// Snapshot of a session handed to every host callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub initialized: bool,
    pub prepared: bool,
    pub playing: bool,
    pub buffering: bool,
    pub has_display: bool,
    /// Milliseconds, `-1` when not initialized.
    pub duration_ms: i64,
    /// Milliseconds, `-1` when not initialized.
    pub current_position_ms: i64,
    pub buffered_position_ms: i64,
    pub locator: Option<Url>,
}

/// Callbacks a playback session delivers to its host.
///
/// Callbacks are invoked while the session is locked: they are serialized and
/// see a consistent [`SessionStatus`], but they must not call back into the
/// session synchronously. Post follow-up commands to the host's own queue.
///
/// Every callback has an empty default so hosts only implement what they use.
#[allow(unused_variables)]
pub trait PlayerHost: PlatformSendSync {
    /// Whether this host renders video into a surface. Queried once when the
    /// session is created; when `true`, the session is only reported prepared
    /// while a surface is attached.
    fn requires_surface(&self) -> bool {
        false
    }

    fn on_prepared_state_changed(&self, status: &SessionStatus) {}

    /// Level-triggered: may repeat the previous value.
    fn on_buffering_state_changed(&self, status: &SessionStatus, buffering: bool) {}

    fn on_play_state_changed(&self, status: &SessionStatus) {}

    fn on_play_completed(&self, status: &SessionStatus) {}

    fn on_current_position_changed(&self, status: &SessionStatus) {}

    fn on_buffered_position_changed(&self, status: &SessionStatus) {}

    fn on_video_size_changed(&self, status: &SessionStatus, width: u32, height: u32) {}

    fn on_error(&self, status: &SessionStatus, kind: i32, message: &str) {}
}
