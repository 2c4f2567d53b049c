//! # Playback Session
//!
//! The adapter between one media engine and one presentation host.
//!
//! ## State machine
//!
//! ```text
//!                 set_data_source            engine Ready
//!  Uninitialized ───────────────▶ Preparing ─────────────▶ Ready ──┐
//!        ▲                           │                      │  ▲   │ play / pause
//!        │ reset / new source        │ engine Error         │  └───┘
//!        │                           ▼                      ▼
//!        └──────────────────────── Error ◀──────────────── Ended
//! ```
//!
//! `initialized` is the pivot of the contract: it is set by the first engine
//! `Ready` for the current source and cleared by any reset. Play, pause and
//! seek are silent no-ops until it is set.
//!
//! ## Threading
//!
//! All session fields, including the engine handle, sit behind one
//! `parking_lot::Mutex`. Commands, engine events (via the pump task) and
//! progress ticks all take that lock, and host callbacks run while it is held.
//! Engine events are enqueued by the engine's listener and drained by a single
//! pump task into the same dispatch path as
//! [`PlaybackSession::handle_engine_event`]. Queued events are stamped with a
//! source generation that every reset advances, so events the engine emitted
//! for a previous source never act on the current one.

use crate::config::AdapterConfig;
use crate::engine_error;
use crate::error::{PlaybackError, Result};
use crate::events::{self, SourceGeneration, StampedEvent};
use crate::progress::ProgressTicker;
use crate::source::{DeclaredSize, HttpMediaSourceFactory, MediaSourceFactory, SourceBinding};
use crate::surface::{DisplayTransition, SurfaceBinding, SurfaceRequirement};
use bridge_traits::{
    BridgeError, EngineEvent, EngineFailure, EngineState, MediaEngine, PlayerHost, SessionPhase,
    SessionStatus, SurfaceHandle,
};
use core_runtime::logging::redact_locator;
use parking_lot::{Mutex, MutexGuard};
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

/// A playback session bound to one engine and one host.
///
/// Construct inside a Tokio runtime; the session spawns its engine event pump
/// and progress ticker on that runtime. After [`release`](Self::release)
/// every command returns [`PlaybackError::Released`]. Dropping an unreleased
/// session releases it.
pub struct PlaybackSession {
    core: Arc<Mutex<SessionCore>>,
    runtime: Handle,
    pump: JoinHandle<()>,
}

impl PlaybackSession {
    /// Create a session with the default HTTP media source factory.
    pub fn new(
        engine: Box<dyn MediaEngine>,
        host: Arc<dyn PlayerHost>,
        config: AdapterConfig,
    ) -> Result<Self> {
        let factory = Arc::new(HttpMediaSourceFactory::from_config(&config));
        Self::with_source_factory(engine, host, config, factory)
    }

    /// Create a session that builds engine sources with `factory`.
    pub fn with_source_factory(
        mut engine: Box<dyn MediaEngine>,
        host: Arc<dyn PlayerHost>,
        config: AdapterConfig,
        factory: Arc<dyn MediaSourceFactory>,
    ) -> Result<Self> {
        config.validate().map_err(PlaybackError::InvalidConfig)?;
        let runtime = Handle::try_current()
            .map_err(|e| PlaybackError::RuntimeUnavailable(e.to_string()))?;

        let source_generation = SourceGeneration::default();
        let (listener, rx) = events::channel(source_generation.clone());
        engine.set_listener(Arc::new(listener));

        let requirement = SurfaceRequirement::from_host_flag(host.requires_surface());
        debug!(?requirement, "Creating playback session");

        let core = Arc::new(Mutex::new(SessionCore {
            engine,
            host,
            factory,
            config,
            phase: SessionPhase::Uninitialized,
            initialized: false,
            buffering_active: false,
            surface: SurfaceBinding::new(requirement),
            source: SourceBinding::default(),
            progress: ProgressTicker::default(),
            source_generation,
            released: false,
        }));

        let weak: Weak<Mutex<SessionCore>> = Arc::downgrade(&core);
        let pump = runtime.spawn(events::pump(rx, move |stamped| match weak.upgrade() {
            Some(core) => {
                core.lock().dispatch_queued(stamped);
                true
            }
            None => false,
        }));

        Ok(Self {
            core,
            runtime,
            pump,
        })
    }

    fn lock_live(&self) -> Result<MutexGuard<'_, SessionCore>> {
        let core = self.core.lock();
        if core.released {
            warn!("Command issued on a released playback session");
            return Err(PlaybackError::Released);
        }
        Ok(core)
    }

    // ------------------------------------------------------------------
    // Source binding
    // ------------------------------------------------------------------

    /// Bind `locator` (or unbind with `None`) and prepare the engine for it.
    ///
    /// Returns `Ok(false)` without touching the engine when `locator` equals
    /// the bound locator (both absent counts as equal). Otherwise the previous
    /// source is reset, the engine is handed a freshly built media source and
    /// `Ok(true)` is returned. `declared` overrides the engine-reported video
    /// size for this source.
    #[instrument(skip_all, fields(declared = ?declared))]
    pub fn set_data_source(&self, locator: Option<Url>, declared: DeclaredSize) -> Result<bool> {
        let mut core = self.lock_live()?;

        if core.source.is_same(locator.as_ref()) {
            debug!("Locator already bound, skipping rebind");
            return Ok(false);
        }

        core.source.bind(locator, declared);
        core.prepare_media_for_playing();
        Ok(true)
    }

    /// Parse `uri` and bind it. Fails with [`BridgeError::InvalidLocator`]
    /// before touching the session if it does not parse.
    pub fn set_data_source_uri(&self, uri: &str, declared: DeclaredSize) -> Result<bool> {
        let locator = Url::parse(uri).map_err(BridgeError::from)?;
        self.set_data_source(Some(locator), declared)
    }

    /// Bind `locator` and prepare it; no-op returning `Ok(false)` when it is
    /// already bound.
    ///
    /// A locator that failed with `on_error` is still bound, so retrying the
    /// same locator needs a [`reset`](Self::reset) first.
    pub fn prepare(&self, locator: Url, declared: DeclaredSize) -> Result<bool> {
        self.set_data_source(Some(locator), declared)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub fn play(&self) -> Result<()> {
        let mut core = self.lock_live()?;
        if !core.initialized || core.is_playing() {
            debug!(initialized = core.initialized, "play ignored");
            return Ok(());
        }

        core.engine.set_play_when_ready(true);
        let status = core.status();
        core.host.on_play_state_changed(&status);
        core.host.on_current_position_changed(&status);
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        let mut core = self.lock_live()?;
        if !core.is_playing() {
            debug!("pause ignored, not playing");
            return Ok(());
        }

        core.engine.set_play_when_ready(false);
        let status = core.status();
        core.host.on_play_state_changed(&status);
        Ok(())
    }

    /// Seek to an absolute position in milliseconds. Ignored until the
    /// session is initialized; bounds are the engine's concern.
    pub fn seek(&self, position_ms: i64) -> Result<()> {
        let mut core = self.lock_live()?;
        if !core.initialized {
            debug!(position_ms, "seek ignored, not initialized");
            return Ok(());
        }

        core.engine.seek_to(position_ms);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_playing(&self) -> Result<bool> {
        Ok(self.lock_live()?.is_playing())
    }

    /// Initialized, and a surface is attached if the host requires one.
    pub fn is_prepared(&self) -> Result<bool> {
        let core = self.lock_live()?;
        Ok(core.surface.is_prepared(core.initialized))
    }

    /// Duration in milliseconds, `-1` when not initialized.
    pub fn duration(&self) -> Result<i64> {
        Ok(self.lock_live()?.duration())
    }

    /// Current position in milliseconds, `-1` when not initialized.
    pub fn current_position(&self) -> Result<i64> {
        Ok(self.lock_live()?.current_position())
    }

    pub fn buffered_position(&self) -> Result<i64> {
        Ok(self.lock_live()?.engine.buffered_position_ms())
    }

    pub fn status(&self) -> Result<SessionStatus> {
        Ok(self.lock_live()?.status())
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    /// Start or stop periodic position reporting.
    ///
    /// Any running ticker is cancelled first. When enabled, the host receives
    /// `on_current_position_changed` then `on_buffered_position_changed` one
    /// period after this call and every period after that, regardless of
    /// play state. When this returns with `false`, no further tick reaches
    /// the host.
    pub fn set_progress_updating_enabled(&self, enabled: bool) -> Result<()> {
        let mut core = self.lock_live()?;
        core.progress.cancel();
        if !enabled {
            debug!("Progress updates disabled");
            return Ok(());
        }

        let period = core.config.progress_update_period;
        let weak = Arc::downgrade(&self.core);
        core.progress.start(&self.runtime, period, move |generation| {
            let Some(shared) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let core = shared.lock();
            if core.released || core.progress.generation() != generation {
                return ControlFlow::Break(());
            }
            core.emit_progress();
            ControlFlow::Continue(())
        });
        debug!(?period, "Progress updates enabled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Surface
    // ------------------------------------------------------------------

    pub fn on_surface_attached(&self, surface: SurfaceHandle) -> Result<()> {
        self.set_display(Some(surface))
    }

    pub fn on_surface_detached(&self) -> Result<()> {
        self.set_display(None)
    }

    /// Attach (`Some`) or detach (`None`) the rendering surface.
    pub fn set_display(&self, surface: Option<SurfaceHandle>) -> Result<()> {
        let mut core = self.lock_live()?;

        match core.surface.set_display(surface) {
            DisplayTransition::Unchanged => {
                debug!("Surface attachment unchanged");
                return Ok(());
            }
            DisplayTransition::Attached(handle) => {
                debug!(surface = handle.raw(), "Surface attached");
                core.engine.set_video_surface(Some(handle));
            }
            DisplayTransition::Detached => {
                debug!("Surface detached");
                core.engine.set_video_surface(None);
            }
        }

        if core.initialized {
            let status = core.status();
            core.host.on_prepared_state_changed(&status);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------

    /// Feed one engine event into the state machine.
    ///
    /// Hosts that marshal engine events themselves may call this directly. The
    /// event is taken to belong to the current source.
    pub fn handle_engine_event(&self, event: EngineEvent) -> Result<()> {
        self.lock_live()?.dispatch(event);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Return to `Uninitialized`, stop the engine and unbind the locator.
    ///
    /// Unbinding lets the host retry the same locator after an engine error
    /// with another [`prepare`](Self::prepare).
    pub fn reset(&self) -> Result<()> {
        let mut core = self.lock_live()?;
        core.reset();
        core.source.bind(None, DeclaredSize::unknown());
        Ok(())
    }

    /// Reset, drop the surface, stop progress reporting and release the
    /// engine. Every later call returns [`PlaybackError::Released`].
    pub fn release(&self) -> Result<()> {
        let mut core = self.lock_live()?;
        core.release();
        drop(core);
        self.pump.abort();
        Ok(())
    }

    /// The host screen is going away; equivalent to [`release`](Self::release).
    pub fn detach_from_host(&self) -> Result<()> {
        self.release()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        {
            let mut core = self.core.lock();
            if !core.released {
                core.release();
            }
        }
        self.pump.abort();
    }
}

struct SessionCore {
    engine: Box<dyn MediaEngine>,
    host: Arc<dyn PlayerHost>,
    factory: Arc<dyn MediaSourceFactory>,
    config: AdapterConfig,
    phase: SessionPhase,
    initialized: bool,
    buffering_active: bool,
    surface: SurfaceBinding,
    source: SourceBinding,
    progress: ProgressTicker,
    /// Shared with the engine listener; advanced whenever the engine is
    /// stopped so events queued for the previous source are dropped.
    source_generation: SourceGeneration,
    released: bool,
}

impl SessionCore {
    fn is_playing(&self) -> bool {
        self.initialized
            && self.engine.playback_state() == EngineState::Ready
            && self.engine.play_when_ready()
    }

    /// A session that is not initialized is reported as buffering.
    fn buffering(&self) -> bool {
        self.buffering_active || !self.initialized
    }

    fn duration(&self) -> i64 {
        if self.initialized {
            self.engine.duration_ms()
        } else {
            -1
        }
    }

    fn current_position(&self) -> i64 {
        if self.initialized {
            self.engine.current_position_ms()
        } else {
            -1
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            initialized: self.initialized,
            prepared: self.surface.is_prepared(self.initialized),
            playing: self.is_playing(),
            buffering: self.buffering(),
            has_display: self.surface.has_display(),
            duration_ms: self.duration(),
            current_position_ms: self.current_position(),
            buffered_position_ms: self.engine.buffered_position_ms(),
            locator: self.source.locator().cloned(),
        }
    }

    fn notify_buffering(&self) {
        let status = self.status();
        self.host.on_buffering_state_changed(&status, status.buffering);
    }

    fn emit_progress(&self) {
        let status = self.status();
        self.host.on_current_position_changed(&status);
        self.host.on_buffered_position_changed(&status);
    }

    fn change_to_uninitialized(&mut self) {
        if !self.initialized {
            return;
        }

        self.initialized = false;
        self.notify_buffering();
        if self.surface.has_display() {
            let status = self.status();
            self.host.on_prepared_state_changed(&status);
        }
    }

    fn reset(&mut self) {
        self.change_to_uninitialized();
        self.engine.stop();
        let generation = self.source_generation.advance();
        trace!(generation, "Source generation advanced");
        self.phase = SessionPhase::Uninitialized;
    }

    fn prepare_media_for_playing(&mut self) {
        self.reset();

        if let Some(locator) = self.source.locator().cloned() {
            let media = self.factory.create_media_source(&locator);
            info!(locator = %redact_locator(&locator), "Preparing media source");
            self.engine.prepare(media);
            self.phase = SessionPhase::Preparing;
        } else {
            info!("Source unbound, engine left idle");
        }

        self.source.arm_size_listener();
        self.notify_buffering();
        let status = self.status();
        self.host.on_play_state_changed(&status);
    }

    fn release(&mut self) {
        self.progress.cancel();
        self.reset();
        self.surface.clear();
        self.engine.release();
        self.released = true;
        info!("Playback session released");
    }

    /// Entry point for events drained from the listener queue.
    fn dispatch_queued(&mut self, stamped: StampedEvent) {
        if !self.source_generation.is_current(stamped.generation) {
            debug!(
                generation = stamped.generation,
                event = ?stamped.event,
                "Engine event for a previous source dropped"
            );
            return;
        }
        self.dispatch(stamped.event);
    }

    /// The single dispatch point for engine events.
    fn dispatch(&mut self, event: EngineEvent) {
        if self.released {
            debug!(?event, "Engine event after release ignored");
            return;
        }

        match event {
            EngineEvent::StateChanged {
                play_when_ready,
                state,
            } => self.on_engine_state_changed(play_when_ready, state),
            EngineEvent::VideoSizeChanged { width, height } => {
                self.on_video_size_changed(width, height)
            }
            EngineEvent::Error(failure) => self.on_engine_error(&failure),
        }
    }

    fn on_engine_state_changed(&mut self, play_when_ready: bool, state: EngineState) {
        debug!(?state, play_when_ready, initialized = self.initialized, "Engine state changed");
        self.buffering_active = false;

        match state {
            EngineState::Ready if !self.initialized => {
                self.initialized = true;
                self.phase = SessionPhase::Ready;
                info!("Engine ready for current source");
                if self.surface.allows_prepared() {
                    let status = self.status();
                    self.host.on_prepared_state_changed(&status);
                }
            }
            EngineState::Ready => {
                if self.phase == SessionPhase::Ended {
                    self.phase = SessionPhase::Ready;
                }
            }
            EngineState::Buffering => {
                self.buffering_active = true;
            }
            EngineState::Ended => {
                self.phase = SessionPhase::Ended;
                let status = self.status();
                self.host.on_play_state_changed(&status);
                self.host.on_play_completed(&status);
            }
            EngineState::Idle => {}
        }

        self.notify_buffering();
    }

    fn on_video_size_changed(&self, width: u32, height: u32) {
        if !self.source.size_listener_armed() {
            debug!(width, height, "Video size before any source ignored");
            return;
        }

        let (width, height) = self.source.declared().apply(width, height);
        let status = self.status();
        self.host.on_video_size_changed(&status, width, height);
    }

    fn on_engine_error(&mut self, failure: &EngineFailure) {
        let error = engine_error::translate(failure);
        warn!(
            kind = error.kind,
            renderer_index = failure.renderer_index,
            message = %error.message,
            "Engine reported a fatal error"
        );
        self.phase = SessionPhase::Error;
        let status = self.status();
        self.host.on_error(&status, error.kind, &error.message);
    }
}
