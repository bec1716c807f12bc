//! Cadence - Audio Output
//!
//! Orchestrates playback of [`MediaStream`](cadence_stream::MediaStream)s on a
//! native media-playback engine.
//!
//! This crate provides:
//! - [`AudioOutput`]: source binding, transport control, volume, timing and
//!   about-to-finish detection
//! - [`PlaybackEngineBackend`]: owns the engine instance, player and media
//! - [`NativeLibrary`]: the seam an engine binding implements
//! - [`OutputEvent`] notifications and [`BackendEvent`] marshaling
//! - [`OutputConfig`]: file and environment configuration
//!
//! # Threading
//!
//! The engine raises events on its own threads. They are queued and applied
//! on the owner thread by [`AudioOutput::process_backend_events`] or
//! [`AudioOutput::wait_backend_event`], so all output state is mutated through
//! `&mut self` only.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_output::{AudioOutput, NativeLibrary, OutputConfig, OutputError};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn load_engine(_args: &[String]) -> Result<Arc<dyn NativeLibrary>, OutputError> {
//!     Err(OutputError::BackendInit("no engine linked".to_string()))
//! }
//!
//! let config = OutputConfig::load()?;
//! let mut output = AudioOutput::new(&config, load_engine);
//!
//! output.set_current_url("music/track.flac");
//! output.play();
//!
//! while output.wait_backend_event(Duration::from_millis(250)) {
//!     while let Some(event) = output.try_recv_event() {
//!         println!("{:?}", event);
//!     }
//! }
//! # Ok::<(), OutputError>(())
//! ```

mod backend;
mod config;
mod dsp;
mod error;
mod events;
mod location;
mod native;
mod output;
mod timing;
mod types;

// Re-export public API
pub use backend::PlaybackEngineBackend;
pub use config::{BackendSettings, OutputConfig};
pub use dsp::{DspCallback, DspFrame, FrameHook};
pub use error::{OutputError, Result};
pub use events::{
    BackendEvent, BackendEventKind, EventSink, OutputEvent, MEDIA_EVENTS, PLAYER_EVENTS,
};
pub use location::MediaLocation;
pub use native::{MediaHandle, NativeLibrary, PlayerHandle};
pub use output::{AudioOutput, NOTIFICATION_CAPACITY};
pub use timing::TrackTimeSource;
pub use types::OutputState;
