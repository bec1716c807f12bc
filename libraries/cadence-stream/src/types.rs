//! Core types for media streams

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

use crate::error::{Result, StreamError};

/// What a stream pulls its bytes from
///
/// Fixed when the stream is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Default-constructed stream with no source at all
    Unknown,

    /// Explicitly empty stream
    Empty,

    /// Location the backend opens by itself (file path, http URL, ...)
    Url,

    /// Producer-driven stream that hands out chunks on demand
    PushStream,

    /// Byte-oriented I/O object read in fixed blocks
    ByteDevice,
}

impl MediaKind {
    /// Whether the backend pulls this kind through the read/release/seek callbacks
    pub fn is_pull_source(self) -> bool {
        matches!(self, MediaKind::PushStream | MediaKind::ByteDevice)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Unknown => "unknown",
            MediaKind::Empty => "empty",
            MediaKind::Url => "url",
            MediaKind::PushStream => "push-stream",
            MediaKind::ByteDevice => "byte-device",
        };
        f.write_str(name)
    }
}

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a stream instance
///
/// This is the opaque context handed to the backend instead of an address.
/// Identifiers are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(u64);

impl StreamId {
    pub(crate) fn next() -> Self {
        Self(NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an identifier from its raw value (as carried in backend options)
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value for the backend boundary
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URL or bare path of a `Url` stream
///
/// Kept as given by the caller; bare relative paths such as `song.flac` are
/// legal and only resolved when the stream is bound to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme of the URL, `None` for bare paths
    pub fn scheme(&self) -> Option<String> {
        Url::parse(&self.0).ok().map(|url| url.scheme().to_string())
    }

    /// A bare path that is not anchored at the filesystem root
    pub fn is_relative(&self) -> bool {
        self.scheme().is_none() && !Path::new(&self.0).is_absolute()
    }

    /// Resolve to a scheme-qualified location
    ///
    /// URLs with a scheme pass through unchanged. Bare paths become `file://`
    /// URLs; relative ones are anchored at `base`.
    pub fn to_location(&self, base: &Path) -> Result<String> {
        if let Ok(url) = Url::parse(&self.0) {
            return Ok(url.into());
        }

        let path = Path::new(&self.0);
        let absolute: PathBuf = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        };

        Url::from_file_path(absolute)
            .map(Into::into)
            .map_err(|()| StreamError::InvalidUrl(self.0.clone()))
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaUrl {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for MediaUrl {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Url> for MediaUrl {
    fn from(url: Url) -> Self {
        Self::new(String::from(url))
    }
}
