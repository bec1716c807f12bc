//! Output notifications and backend events
//!
//! Two event streams cross the output:
//! - [`BackendEvent`]: raised by the native library on its own threads and
//!   queued through an [`EventSink`] until the owner thread applies them
//! - [`OutputEvent`]: notifications for the queue / UI layer

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::types::OutputState;

/// Notifications emitted by the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputEvent {
    /// Playback state changed
    StateChanged {
        /// The new state
        new: OutputState,
        /// The state before the change
        old: OutputState,
    },

    /// Timing update, current position in milliseconds
    Tick(i64),

    /// Remaining time dropped below the about-to-finish threshold
    AboutToFinish,
}

/// Events the native library raises
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendEvent {
    MediaChanged,
    NothingSpecial,
    Opening,
    /// Buffer fill in percent
    Buffering(f32),
    Playing,
    Paused,
    Stopped,
    Forward,
    Backward,
    EndReached,
    EncounteredError,
    /// Playback time in milliseconds
    TimeChanged(i64),
    /// Playback position as a fraction of the length
    PositionChanged(f32),
    SeekableChanged(bool),
    PausableChanged(bool),
    TitleChanged(i32),
    SnapshotTaken,
    /// Player-reported length in milliseconds
    LengthChanged(i64),
    /// Number of video outputs
    Vout(i32),
    /// Media-reported duration in milliseconds
    DurationChanged(i64),
}

/// Payload-free discriminant of [`BackendEvent`], used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendEventKind {
    MediaChanged,
    NothingSpecial,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Forward,
    Backward,
    EndReached,
    EncounteredError,
    TimeChanged,
    PositionChanged,
    SeekableChanged,
    PausableChanged,
    TitleChanged,
    SnapshotTaken,
    LengthChanged,
    Vout,
    DurationChanged,
}

impl BackendEvent {
    pub fn kind(&self) -> BackendEventKind {
        match self {
            BackendEvent::MediaChanged => BackendEventKind::MediaChanged,
            BackendEvent::NothingSpecial => BackendEventKind::NothingSpecial,
            BackendEvent::Opening => BackendEventKind::Opening,
            BackendEvent::Buffering(_) => BackendEventKind::Buffering,
            BackendEvent::Playing => BackendEventKind::Playing,
            BackendEvent::Paused => BackendEventKind::Paused,
            BackendEvent::Stopped => BackendEventKind::Stopped,
            BackendEvent::Forward => BackendEventKind::Forward,
            BackendEvent::Backward => BackendEventKind::Backward,
            BackendEvent::EndReached => BackendEventKind::EndReached,
            BackendEvent::EncounteredError => BackendEventKind::EncounteredError,
            BackendEvent::TimeChanged(_) => BackendEventKind::TimeChanged,
            BackendEvent::PositionChanged(_) => BackendEventKind::PositionChanged,
            BackendEvent::SeekableChanged(_) => BackendEventKind::SeekableChanged,
            BackendEvent::PausableChanged(_) => BackendEventKind::PausableChanged,
            BackendEvent::TitleChanged(_) => BackendEventKind::TitleChanged,
            BackendEvent::SnapshotTaken => BackendEventKind::SnapshotTaken,
            BackendEvent::LengthChanged(_) => BackendEventKind::LengthChanged,
            BackendEvent::Vout(_) => BackendEventKind::Vout,
            BackendEvent::DurationChanged(_) => BackendEventKind::DurationChanged,
        }
    }
}

/// Player events the output subscribes to
///
/// Length changes are left out: duration comes from the media handle.
pub const PLAYER_EVENTS: &[BackendEventKind] = &[
    BackendEventKind::MediaChanged,
    BackendEventKind::NothingSpecial,
    BackendEventKind::Opening,
    BackendEventKind::Buffering,
    BackendEventKind::Playing,
    BackendEventKind::Paused,
    BackendEventKind::Stopped,
    BackendEventKind::Forward,
    BackendEventKind::Backward,
    BackendEventKind::EndReached,
    BackendEventKind::EncounteredError,
    BackendEventKind::TimeChanged,
    BackendEventKind::PositionChanged,
    BackendEventKind::SeekableChanged,
    BackendEventKind::PausableChanged,
    BackendEventKind::TitleChanged,
    BackendEventKind::SnapshotTaken,
    BackendEventKind::Vout,
];

/// Media events the output subscribes to
pub const MEDIA_EVENTS: &[BackendEventKind] = &[BackendEventKind::DurationChanged];

/// Where the native library posts its events
///
/// Cheap to clone and safe to use from any thread. Posting never blocks, so
/// a backend thread is never held up by the owner thread.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<BackendEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: Sender<BackendEvent>) -> Self {
        Self { tx }
    }

    /// Queue `event` for the owner thread
    ///
    /// Events posted after the output is gone are dropped.
    pub fn emit(&self, event: BackendEvent) {
        let _ = self.tx.send(event);
    }
}
