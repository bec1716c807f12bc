//! Adapter owning the native library instance, player and current media
//!
//! A failed initialization does not abort construction: the adapter comes up
//! degraded, logs the failure, and turns every later call into a no-op.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dsp::FrameHook;
use crate::error::{OutputError, Result};
use crate::events::{EventSink, MEDIA_EVENTS, PLAYER_EVENTS};
use crate::native::{MediaHandle, NativeLibrary, PlayerHandle};

pub struct PlaybackEngineBackend {
    library: Option<Arc<dyn NativeLibrary>>,
    player: Option<PlayerHandle>,
    media: Option<MediaHandle>,
    sink: EventSink,
}

impl PlaybackEngineBackend {
    /// Create the library instance with `args`, then the player
    pub fn new<F>(loader: F, args: &[String], sink: EventSink, hook: Arc<FrameHook>) -> Self
    where
        F: FnOnce(&[String]) -> Result<Arc<dyn NativeLibrary>>,
    {
        debug!("Initializing playback backend with args {:?}", args);

        let library = match loader(args) {
            Ok(library) => Some(library),
            Err(e) => {
                error!("Could not initialize backend: {}", e);
                None
            }
        };

        let player = library.as_ref().and_then(|library| match library.new_player() {
            Ok(player) => Some(player),
            Err(e) => {
                error!("Could not create media player: {}", e);
                None
            }
        });

        if let (Some(library), Some(player)) = (&library, player) {
            library.attach_player_events(player, PLAYER_EVENTS, sink.clone());
            library.set_frame_hook(player, hook);
            info!("Playback backend ready");
        }

        Self {
            library,
            player,
            media: None,
            sink,
        }
    }

    /// Library instance and player both exist
    pub fn is_available(&self) -> bool {
        self.library.is_some() && self.player.is_some()
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    fn with_player(&self, f: impl FnOnce(&dyn NativeLibrary, PlayerHandle)) {
        if let (Some(library), Some(player)) = (&self.library, self.player) {
            f(library.as_ref(), player);
        }
    }

    pub fn play(&self) {
        self.with_player(|library, player| library.play(player));
    }

    pub fn set_pause(&self, paused: bool) {
        self.with_player(|library, player| library.set_pause(player, paused));
    }

    pub fn stop(&self) {
        self.with_player(|library, player| library.stop(player));
    }

    pub fn is_playing(&self) -> bool {
        match (&self.library, self.player) {
            (Some(library), Some(player)) => library.is_playing(player),
            _ => false,
        }
    }

    pub fn set_time(&self, time_ms: i64) {
        self.with_player(|library, player| library.set_time(player, time_ms));
    }

    pub fn set_volume(&self, percent: i32) {
        self.with_player(|library, player| library.set_volume(player, percent.clamp(0, 100)));
    }

    /// Create media for `location`, attach `options` and make it current
    ///
    /// Any media bound before is released first.
    pub fn bind_media(&mut self, location: &str, options: &[String]) -> Result<()> {
        self.release_media();

        let (Some(library), Some(player)) = (&self.library, self.player) else {
            return Err(OutputError::BackendUnavailable);
        };

        let media = library.new_media_location(location)?;
        library.attach_media_events(media, MEDIA_EVENTS, self.sink.clone());
        for option in options {
            library.add_media_option(media, option, true);
        }
        library.set_media(player, media);

        debug!("Bound media {:?} at {:?}", media, location);
        self.media = Some(media);
        Ok(())
    }

    /// Duration of the bound media, `None` if nothing is bound
    pub fn media_duration(&self) -> Option<i64> {
        match (&self.library, self.media) {
            (Some(library), Some(media)) => Some(library.media_duration(media)),
            _ => None,
        }
    }

    pub fn release_media(&mut self) {
        if let Some(media) = self.media.take() {
            if let Some(library) = &self.library {
                debug!("Releasing media {:?}", media);
                library.release_media(media);
            }
        }
    }

    /// Stop, then release media, player and instance, in that order
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.stop();
        self.release_media();

        let Some(library) = self.library.take() else {
            return;
        };
        if let Some(player) = self.player.take() {
            library.release_player(player);
        }
        library.release();
        info!("Playback backend released");
    }
}

impl Drop for PlaybackEngineBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PlaybackEngineBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngineBackend")
            .field("available", &self.is_available())
            .field("player", &self.player)
            .field("media", &self.media)
            .finish()
    }
}
