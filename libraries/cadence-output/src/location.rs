//! Location resolution for media streams
//!
//! Turns a [`MediaStream`] into what the backend needs to open it: a location
//! token plus the media options to attach.

use cadence_stream::{ImemOptions, MediaKind, MediaStream, StreamId, IMEM_LOCATION};
use std::path::Path;

use crate::error::Result;

/// How a stream is presented to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    /// Scheme-qualified URL
    Url(String),

    /// In-process pull source read through the registered callbacks
    PullSource(ImemOptions),

    /// Unknown or empty stream, nothing to open
    Unbound,
}

impl MediaLocation {
    /// Resolve `stream`, anchoring relative paths at `base`
    pub fn resolve(stream: &MediaStream, base: &Path) -> Result<Self> {
        let location = match stream.kind() {
            MediaKind::Url => match stream.url() {
                Some(url) => MediaLocation::Url(url.to_location(base)?),
                None => MediaLocation::Unbound,
            },
            MediaKind::PushStream | MediaKind::ByteDevice => {
                MediaLocation::PullSource(ImemOptions::for_stream(stream.id()))
            }
            MediaKind::Unknown | MediaKind::Empty => MediaLocation::Unbound,
        };
        Ok(location)
    }

    /// Location token passed to the backend
    pub fn token(&self) -> &str {
        match self {
            MediaLocation::Url(url) => url.as_str(),
            MediaLocation::PullSource(_) => IMEM_LOCATION,
            MediaLocation::Unbound => "",
        }
    }

    /// Trusted options to attach to the media handle
    pub fn options(&self) -> Vec<String> {
        match self {
            MediaLocation::PullSource(options) => options.to_options(),
            _ => Vec::new(),
        }
    }

    /// Stream id the backend will pass to the pull callbacks
    pub fn stream_id(&self) -> Option<StreamId> {
        match self {
            MediaLocation::PullSource(options) => Some(options.data),
            _ => None,
        }
    }
}
