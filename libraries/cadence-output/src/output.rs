//! Audio output orchestrator
//!
//! Owns the current [`MediaStream`], drives the backend, tracks timing and
//! publishes [`OutputEvent`]s. Create one per process at startup and pass it
//! by `&mut` to the components that control playback.

use cadence_stream::{registry, ByteDevice, MediaKind, MediaStream, MediaUrl, StreamId};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

use crate::backend::PlaybackEngineBackend;
use crate::config::OutputConfig;
use crate::dsp::{DspFrame, FrameHook};
use crate::error::Result;
use crate::events::{BackendEvent, EventSink, OutputEvent};
use crate::location::MediaLocation;
use crate::native::NativeLibrary;
use crate::timing::{Timing, TrackTimeSource};
use crate::types::OutputState;

/// Notifications kept for listeners before the oldest are dropped
pub const NOTIFICATION_CAPACITY: usize = 256;

pub struct AudioOutput {
    backend: PlaybackEngineBackend,
    state: OutputState,

    current_stream: Option<Arc<MediaStream>>,
    registered: Option<StreamId>,
    auto_delete: bool,

    muted: bool,
    volume: f64,

    timing: Timing,
    track_times: Option<Arc<dyn TrackTimeSource>>,
    frame_hook: Arc<FrameHook>,

    backend_rx: Receiver<BackendEvent>,
    event_tx: Sender<OutputEvent>,
    event_rx: Receiver<OutputEvent>,
}

impl AudioOutput {
    /// Create the output, initializing the backend through `loader`
    ///
    /// The loader receives [`OutputConfig::backend_args`]. If it fails the
    /// output still comes up, degraded, in [`OutputState::Error`].
    pub fn new<F>(config: &OutputConfig, loader: F) -> Self
    where
        F: FnOnce(&[String]) -> Result<Arc<dyn NativeLibrary>>,
    {
        let (backend_tx, backend_rx) = unbounded();
        let (event_tx, event_rx) = bounded(NOTIFICATION_CAPACITY);
        let frame_hook = Arc::new(FrameHook::new());

        let backend = PlaybackEngineBackend::new(
            loader,
            &config.backend_args(),
            EventSink::new(backend_tx),
            Arc::clone(&frame_hook),
        );

        let state = if backend.is_available() {
            OutputState::Stopped
        } else {
            warn!("Audio output running without backend");
            OutputState::Error
        };

        let output = Self {
            backend,
            state,
            current_stream: None,
            registered: None,
            auto_delete: true,
            muted: false,
            volume: config.initial_volume.clamp(0.0, 1.0),
            timing: Timing::new(config.about_to_finish_ms),
            track_times: None,
            frame_hook,
            backend_rx,
            event_tx,
            event_rx,
        };
        output.apply_volume();
        output
    }

    /// Create the output around an already initialized library
    pub fn with_library(config: &OutputConfig, library: Arc<dyn NativeLibrary>) -> Self {
        Self::new(config, move |_| Ok(library))
    }

    /// False when the backend failed to initialize
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn set_track_time_source(&mut self, source: Arc<dyn TrackTimeSource>) {
        self.track_times = Some(source);
    }

    // ===== Source control =====

    /// Whether replaced streams are destroyed (default) or handed back
    pub fn set_auto_delete(&mut self, auto_delete: bool) {
        self.auto_delete = auto_delete;
    }

    pub fn auto_delete(&self) -> bool {
        self.auto_delete
    }

    pub fn current_source(&self) -> Option<&Arc<MediaStream>> {
        self.current_stream.as_ref()
    }

    /// Replace the current source
    ///
    /// The previous stream is unbound from the backend before the new one is
    /// bound. It is returned only when auto-delete is disabled.
    pub fn set_current_source(
        &mut self,
        stream: impl Into<Arc<MediaStream>>,
    ) -> Option<Arc<MediaStream>> {
        let stream = stream.into();
        debug!("Setting source {} ({})", stream.id(), stream.kind());

        self.set_state(OutputState::Loading);

        let previous = self.release_current();
        self.timing.reset();
        self.frame_hook.clear_seeked();
        self.discard_stale_events();

        if stream.kind().is_pull_source() {
            self.registered = Some(registry::global().register(Arc::clone(&stream)));
        }

        let bound = self.bind(&stream);
        self.current_stream = Some(stream);

        let state = match bound {
            Ok(()) if self.backend.is_available() => OutputState::Stopped,
            Ok(()) => OutputState::Error,
            Err(e) => {
                warn!("Could not bind source: {}", e);
                OutputState::Error
            }
        };
        self.set_state(state);

        previous
    }

    /// Replace the current source with a URL or path
    pub fn set_current_url(&mut self, url: impl Into<MediaUrl>) -> Option<Arc<MediaStream>> {
        self.set_current_source(MediaStream::from_url(url))
    }

    /// Replace the current source with a seekable byte device
    pub fn set_current_device(
        &mut self,
        device: impl ByteDevice + 'static,
    ) -> Option<Arc<MediaStream>> {
        self.set_current_source(MediaStream::from_device(device))
    }

    fn bind(&mut self, stream: &MediaStream) -> Result<()> {
        if !self.backend.is_available() {
            return Ok(());
        }

        let base = std::env::current_dir()?;
        let location = MediaLocation::resolve(stream, &base)?;
        if location == MediaLocation::Unbound {
            warn!("Stream {} has nothing to play ({})", stream.id(), stream.kind());
        }

        self.backend.bind_media(location.token(), &location.options())?;

        if stream.kind() == MediaKind::Url {
            if let Some(duration) = self.backend.media_duration() {
                debug!("Media duration {} ms", duration);
                self.timing.cache_total(duration);
            }
        }
        Ok(())
    }

    /// Unbind the current stream from the backend and the registry
    fn release_current(&mut self) -> Option<Arc<MediaStream>> {
        if self.backend.has_media() {
            self.backend.stop();
            self.backend.release_media();
        }

        if let Some(id) = self.registered.take() {
            registry::global().unregister(id);
        }

        let previous = self.current_stream.take()?;
        if self.auto_delete {
            debug!("Dropping previous source {}", previous.id());
            None
        } else {
            Some(previous)
        }
    }

    fn discard_stale_events(&self) {
        let stale = self.backend_rx.try_iter().count();
        if stale > 0 {
            debug!("Discarded {} backend events from previous source", stale);
        }
    }

    // ===== Playback control =====

    /// Start playback, or resume it when paused
    pub fn play(&mut self) {
        if !self.backend.is_available() {
            debug!("Ignoring play without backend");
            return;
        }

        if self.backend.is_playing() {
            self.backend.set_pause(false);
        } else {
            self.backend.play();
        }
        self.set_state(OutputState::Playing);
    }

    pub fn pause(&mut self) {
        if !self.backend.is_available() {
            debug!("Ignoring pause without backend");
            return;
        }

        self.backend.set_pause(true);
        self.set_state(OutputState::Paused);
    }

    pub fn stop(&mut self) {
        if !self.backend.is_available() {
            debug!("Ignoring stop without backend");
            return;
        }

        self.backend.stop();
        self.set_state(OutputState::Stopped);
    }

    /// Jump to `time_ms`
    ///
    /// Ignored while stopped or in error.
    pub fn seek(&mut self, time_ms: i64) {
        if !self.state.accepts_seek() {
            trace!("Ignoring seek to {} ms while {}", time_ms, self.state);
            return;
        }

        self.frame_hook.mark_seeked();
        self.backend.set_time(time_ms);
        self.set_current_time(time_ms);
    }

    // ===== Volume =====

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Set volume, 0.0..=1.0
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    /// Effective volume, 0.0 while muted
    pub fn volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    fn apply_volume(&self) {
        let percent = (self.volume() * 100.0).round() as i32;
        trace!("Backend volume {}%", percent);
        self.backend.set_volume(percent);
    }

    // ===== State and timing =====

    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Current position in milliseconds
    pub fn current_time(&self) -> i64 {
        self.timing.current()
    }

    /// Total time in milliseconds, 0 until known
    pub fn total_time(&self) -> i64 {
        self.timing.total()
    }

    pub fn is_seekable(&self) -> bool {
        self.timing.seekable()
    }

    pub fn is_about_to_finish(&self) -> bool {
        self.timing.about_to_finish()
    }

    fn set_state(&mut self, state: OutputState) {
        if state == self.state {
            return;
        }

        let old = std::mem::replace(&mut self.state, state);
        debug!("State {} -> {}", old, state);
        self.emit(OutputEvent::StateChanged { new: state, old });
    }

    pub(crate) fn set_current_time(&mut self, time: i64) {
        let fired = self.timing.set_current(time, self.track_times.as_deref());

        self.emit(OutputEvent::Tick(time));
        if fired {
            debug!("About to finish at {} ms", time);
            self.emit(OutputEvent::AboutToFinish);
        }
    }

    pub(crate) fn set_total_time(&mut self, time: i64) {
        debug!("Total time {} ms", time);
        if self.timing.set_total(time) {
            self.emit(OutputEvent::Tick(self.timing.current()));
        }
    }

    // ===== DSP =====

    /// Install a callback over decoded audio blocks
    pub fn set_dsp_callback<F>(&mut self, callback: F)
    where
        F: FnMut(DspFrame<'_>) + Send + 'static,
    {
        self.frame_hook.set_callback(Some(Box::new(callback)));
    }

    pub fn clear_dsp_callback(&mut self) {
        self.frame_hook.set_callback(None);
    }

    /// Hook the backend feeds decoded blocks into
    pub fn frame_hook(&self) -> Arc<FrameHook> {
        Arc::clone(&self.frame_hook)
    }

    // ===== Backend events =====

    /// Apply all queued backend events, returning how many were handled
    pub fn process_backend_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.backend_rx.try_recv() {
            self.handle_backend_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one backend event and apply it
    pub fn wait_backend_event(&mut self, timeout: Duration) -> bool {
        match self.backend_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_backend_event(event);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::TimeChanged(time) => self.set_current_time(time),
            BackendEvent::DurationChanged(duration) => self.set_total_time(duration),
            BackendEvent::EndReached => {
                info!("End of media reached");
                self.set_state(OutputState::Stopped);
            }
            BackendEvent::EncounteredError => {
                error!("Backend encountered an error, stopping playback");
                self.backend.stop();
                self.set_state(OutputState::Error);
            }
            other => trace!("Backend event {:?}", other),
        }
    }

    // ===== Notifications =====

    /// Queue a notification, evicting the oldest one when listeners lag
    fn emit(&self, event: OutputEvent) {
        let mut pending = event;
        loop {
            match self.event_tx.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(event)) => {
                    if let Ok(dropped) = self.event_rx.try_recv() {
                        trace!("Notification queue full, dropped {:?}", dropped);
                    }
                    pending = event;
                }
                // The output holds a receiver, so this cannot happen
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Try to receive a notification (non-blocking)
    pub fn try_recv_event(&self) -> Option<OutputEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive a notification, waiting up to `timeout`
    pub fn recv_event(&self, timeout: Duration) -> Option<OutputEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Receiver for listeners on other threads
    pub fn events(&self) -> Receiver<OutputEvent> {
        self.event_rx.clone()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.backend.shutdown();
        if let Some(id) = self.registered.take() {
            registry::global().unregister(id);
        }
        debug!("Audio output dropped");
    }
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("backend", &self.backend)
            .field("state", &self.state)
            .field("current_stream", &self.current_stream)
            .field("muted", &self.muted)
            .field("volume", &self.volume)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
