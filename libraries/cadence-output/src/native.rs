//! Native media library boundary
//!
//! [`NativeLibrary`] is the seam between the output and the media-playback
//! engine that actually decodes and renders audio. A binding crate implements
//! it on top of the engine's C API; tests implement it with in-memory fakes.
//!
//! Handles are opaque values minted by the library. The output never invents
//! them and releases every handle it received exactly once.

use std::sync::Arc;

use crate::dsp::FrameHook;
use crate::error::Result;
use crate::events::{BackendEventKind, EventSink};

/// Player handle issued by the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerHandle(u64);

impl PlayerHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Media handle issued by the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaHandle(u64);

impl MediaHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Media-playback engine instance
///
/// All methods may be called from the output's owner thread only; the
/// library itself calls back on its own threads through the [`EventSink`]
/// and the registered pull callbacks.
pub trait NativeLibrary: Send + Sync {
    /// Create the media player
    fn new_player(&self) -> Result<PlayerHandle>;

    fn release_player(&self, player: PlayerHandle);

    /// Create a media handle for a location token
    ///
    /// # Arguments
    /// * `location` - Scheme-qualified URL or `imem://`
    fn new_media_location(&self, location: &str) -> Result<MediaHandle>;

    /// Attach a `key=value` option to a media handle
    fn add_media_option(&self, media: MediaHandle, option: &str, trusted: bool);

    /// Duration in milliseconds, -1 when unknown
    fn media_duration(&self, media: MediaHandle) -> i64;

    fn release_media(&self, media: MediaHandle);

    /// Make `media` the player's current media
    fn set_media(&self, player: PlayerHandle, media: MediaHandle);

    fn play(&self, player: PlayerHandle);

    fn set_pause(&self, player: PlayerHandle, paused: bool);

    fn stop(&self, player: PlayerHandle);

    /// True while media is started, including when it is paused
    fn is_playing(&self, player: PlayerHandle) -> bool;

    /// Jump to `time_ms`
    fn set_time(&self, player: PlayerHandle, time_ms: i64);

    /// Volume in percent, 0..=100
    fn set_volume(&self, player: PlayerHandle, percent: i32);

    /// Deliver the listed player events to `sink`
    fn attach_player_events(
        &self,
        player: PlayerHandle,
        events: &[BackendEventKind],
        sink: EventSink,
    );

    /// Deliver the listed media events to `sink`
    fn attach_media_events(&self, media: MediaHandle, events: &[BackendEventKind], sink: EventSink);

    /// Install the per-block DSP hook
    ///
    /// Engines without access to decoded audio ignore it.
    fn set_frame_hook(&self, player: PlayerHandle, hook: Arc<FrameHook>) {
        let _ = (player, hook);
    }

    /// Release the library instance; called last, after every handle
    fn release(&self);
}
