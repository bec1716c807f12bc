//! Core types for the audio output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback state of the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputState {
    /// Source bound (or none), not playing
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Backend failed; stays here until a new source is set
    Error,

    /// Binding a new source
    Loading,

    /// Waiting for the source to deliver data
    Buffering,
}

impl OutputState {
    /// States in which a seek request is honoured
    pub fn accepts_seek(self) -> bool {
        matches!(
            self,
            OutputState::Playing
                | OutputState::Paused
                | OutputState::Loading
                | OutputState::Buffering
        )
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputState::Stopped => "stopped",
            OutputState::Playing => "playing",
            OutputState::Paused => "paused",
            OutputState::Error => "error",
            OutputState::Loading => "loading",
            OutputState::Buffering => "buffering",
        };
        f.write_str(name)
    }
}
