//! Fixed pull callbacks the native backend invokes
//!
//! The backend calls these free functions from its decode thread with the
//! opaque context it was configured with, a [`StreamId`]. Each one resolves
//! the identifier through the global [`crate::registry`] and dispatches to the
//! live [`crate::MediaStream`]. Unknown identifiers fail instead of touching
//! freed memory.

use tracing::{trace, warn};

use crate::buffer::StreamBuffer;
use crate::registry;
use crate::types::StreamId;

/// Callback succeeded
pub const STATUS_OK: i32 = 0;

/// Callback failed (end of stream, refused seek, unknown stream)
pub const STATUS_FAILED: i32 = -1;

/// In/out parameters of one read
#[derive(Debug, Default)]
pub struct ReadRequest {
    /// Decoding timestamp (unused by pull sources)
    pub dts: i64,

    /// Presentation timestamp (unused by pull sources)
    pub pts: i64,

    /// Block flags (unused by pull sources)
    pub flags: u32,

    /// Number of bytes produced
    pub size: usize,

    /// Produced bytes, to be handed back through the release callback
    pub buffer: Option<StreamBuffer>,
}

/// `read(data, cookie, request) -> status`
pub type ReadFn = fn(StreamId, &str, &mut ReadRequest) -> i32;

/// `read_done(data, cookie, size, buffer) -> status`
pub type ReadDoneFn = fn(StreamId, &str, usize, Option<StreamBuffer>) -> i32;

/// `seek(data, position) -> status`
pub type SeekFn = fn(StreamId, u64) -> i32;

/// Read entry point
pub fn read_callback(data: StreamId, cookie: &str, request: &mut ReadRequest) -> i32 {
    match registry::global().resolve(data) {
        Ok(stream) => stream.read(request),
        Err(err) => {
            warn!(cookie, error = %err, "read refused");
            request.size = 0;
            request.buffer = None;
            STATUS_FAILED
        }
    }
}

/// Release entry point; always succeeds
pub fn read_done_callback(
    data: StreamId,
    cookie: &str,
    size: usize,
    buffer: Option<StreamBuffer>,
) -> i32 {
    match registry::global().get(data) {
        Some(stream) => stream.read_done(size, buffer),
        None => {
            // The stream is gone; dropping the buffer is all that is left to do
            trace!(id = %data, cookie, size, "release for unregistered stream");
            drop(buffer);
            STATUS_OK
        }
    }
}

/// Seek entry point
pub fn seek_callback(data: StreamId, position: u64) -> i32 {
    match registry::global().resolve(data) {
        Ok(stream) => stream.seek(position),
        Err(err) => {
            warn!(position, error = %err, "seek refused");
            STATUS_FAILED
        }
    }
}

/// The three callback identities handed to the backend
#[derive(Clone, Copy)]
pub struct PullCallbacks {
    pub read: ReadFn,
    pub read_done: ReadDoneFn,
    pub seek: SeekFn,
}

/// Callbacks backed by the global registry
pub const PULL_CALLBACKS: PullCallbacks = PullCallbacks {
    read: read_callback,
    read_done: read_done_callback,
    seek: seek_callback,
};

impl PullCallbacks {
    /// Function identities as carried in backend options
    pub fn identities(&self) -> [usize; 3] {
        [
            self.read as usize,
            self.read_done as usize,
            self.seek as usize,
        ]
    }
}

impl std::fmt::Debug for PullCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [read, read_done, seek] = self.identities();
        f.debug_struct("PullCallbacks")
            .field("read", &format_args!("{read:#x}"))
            .field("read_done", &format_args!("{read_done:#x}"))
            .field("seek", &format_args!("{seek:#x}"))
            .finish()
    }
}
