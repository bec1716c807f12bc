//! Media stream: where the backend's bytes come from
//!
//! A stream is built once per track and then handed to the output. For
//! `Url` streams the backend opens the location itself; push streams and
//! byte devices are pulled through [`MediaStream::read`],
//! [`MediaStream::read_done`] and [`MediaStream::seek`], which the backend
//! reaches via the free callbacks in [`crate::callbacks`].
//!
//! The pull methods run on the backend's decode thread while the owner thread
//! and producers may be touching the same stream, so every mutable field is an
//! atomic or sits behind a lock.

use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tracing::{debug, trace, warn};

use crate::buffer::{ScratchBlock, StreamBuffer};
use crate::callbacks::{ReadRequest, STATUS_FAILED, STATUS_OK};
use crate::error::{Result, StreamError};
use crate::source::{ByteDevice, PushSource, StreamSignals};
use crate::types::{MediaKind, MediaUrl, StreamId};

enum SourceSlot {
    None,
    Push(Box<dyn PushSource>),
    Device(Box<dyn ByteDevice>),
}

/// Pull source bound to the backend
pub struct MediaStream {
    id: StreamId,
    kind: MediaKind,
    url: Option<MediaUrl>,

    /// Declared total size in bytes (0 = unknown)
    stream_size: AtomicI64,

    /// Read cursor for pull sources
    position: AtomicU64,

    signals: StreamSignals,
    source: Mutex<SourceSlot>,
    scratch: ScratchBlock,
}

impl MediaStream {
    fn with_source(kind: MediaKind, url: Option<MediaUrl>, source: SourceSlot) -> Self {
        let stream = Self {
            id: StreamId::next(),
            kind,
            url,
            stream_size: AtomicI64::new(0),
            position: AtomicU64::new(0),
            signals: StreamSignals::new(),
            source: Mutex::new(source),
            scratch: ScratchBlock::default(),
        };
        debug!(id = %stream.id, kind = %kind, "media stream created");
        stream
    }

    /// Stream with no source at all ([`MediaKind::Unknown`])
    pub fn unknown() -> Self {
        Self::with_source(MediaKind::Unknown, None, SourceSlot::None)
    }

    /// Explicitly empty stream
    pub fn empty() -> Self {
        Self::with_source(MediaKind::Empty, None, SourceSlot::None)
    }

    /// Location the backend opens by itself
    pub fn from_url(url: impl Into<MediaUrl>) -> Self {
        Self::with_source(MediaKind::Url, Some(url.into()), SourceSlot::None)
    }

    /// Producer-driven stream
    pub fn from_push(source: impl PushSource + 'static) -> Self {
        Self::with_source(
            MediaKind::PushStream,
            None,
            SourceSlot::Push(Box::new(source)),
        )
    }

    /// Byte device read in [`crate::BLOCK_SIZE`] blocks
    ///
    /// The stream owns `device`; pass a [`crate::SharedDevice`] to keep
    /// ownership on the caller side.
    pub fn from_device(device: impl ByteDevice + 'static) -> Self {
        Self::with_source(
            MediaKind::ByteDevice,
            None,
            SourceSlot::Device(Box::new(device)),
        )
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// URL of a `Url` stream, `None` for every other kind
    pub fn url(&self) -> Option<&MediaUrl> {
        self.url.as_ref()
    }

    pub fn set_stream_size(&self, size: i64) {
        self.stream_size.store(size, Ordering::Release);
    }

    pub fn stream_size(&self) -> i64 {
        self.stream_size.load(Ordering::Acquire)
    }

    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Acquire)
    }

    pub fn is_started(&self) -> bool {
        self.signals.is_started()
    }

    pub fn is_buffering_complete(&self) -> bool {
        self.signals.is_buffering_complete()
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.signals.is_end_of_stream()
    }

    /// Handle producers use to report buffering completion or end of data
    pub fn signals(&self) -> StreamSignals {
        self.signals.clone()
    }

    /// The underlying source will never deliver more bytes
    pub fn buffering_finished(&self) {
        self.signals.finish_buffering();
    }

    /// Declare permanent end of stream; every later read fails
    pub fn end_of_data(&self) {
        self.signals.end_of_data();
    }

    /// Serve one backend read request
    ///
    /// Returns [`STATUS_OK`] with `request.size`/`request.buffer` filled in,
    /// or [`STATUS_FAILED`] once the stream has ended.
    pub fn read(&self, request: &mut ReadRequest) -> i32 {
        request.size = 0;
        request.buffer = None;

        if self.signals.is_end_of_stream() {
            return STATUS_FAILED;
        }

        let produced = {
            let mut source = self.source.lock();
            match &mut *source {
                SourceSlot::Push(producer) => producer
                    .need_data(&self.signals)
                    .map(|bytes| Some(StreamBuffer::Heap(bytes))),
                SourceSlot::Device(device) => self
                    .scratch
                    .fill(device.as_mut())
                    .map(|lease| Some(StreamBuffer::Scratch(lease))),
                SourceSlot::None => {
                    trace!(id = %self.id, kind = %self.kind, "read on a stream without data");
                    Ok(None)
                }
            }
        };

        let buffer = match produced {
            Ok(buffer) => buffer,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) =>
            {
                None
            }
            Err(err) => {
                warn!(id = %self.id, error = %err, "read failed, ending stream");
                self.signals.end_of_data();
                return STATUS_FAILED;
            }
        };

        let size = buffer.as_ref().map_or(0, StreamBuffer::len);
        if size > 0 {
            self.signals.set_started(true);
            self.position.fetch_add(size as u64, Ordering::AcqRel);
        }

        // An empty read only ends a device stream once it has produced data and
        // the producer has said nothing else is coming.
        if self.kind == MediaKind::ByteDevice
            && size == 0
            && self.signals.is_started()
            && self.signals.is_buffering_complete()
        {
            debug!(id = %self.id, position = self.position(), "byte device drained");
            self.signals.end_of_data();
            return STATUS_FAILED;
        }

        request.size = size;
        request.buffer = buffer.filter(|buffer| !buffer.is_empty());
        STATUS_OK
    }

    /// Take back a buffer produced by [`MediaStream::read`]
    ///
    /// Heap buffers are freed here by dropping them; scratch leases only
    /// release their view. Always succeeds.
    pub fn read_done(&self, size: usize, buffer: Option<StreamBuffer>) -> i32 {
        match buffer {
            Some(StreamBuffer::Heap(bytes)) if self.kind == MediaKind::PushStream && size > 0 => {
                trace!(id = %self.id, size, "releasing push buffer");
                drop(bytes);
            }
            Some(StreamBuffer::Scratch(_)) | Some(StreamBuffer::Heap(_)) | None => {}
        }
        STATUS_OK
    }

    /// Move the read cursor to `position`
    ///
    /// Push streams refuse targets beyond the declared stream size. A device
    /// that fails to seek leaves the stream untouched. Any accepted seek
    /// restarts the liveness check (`started` goes false).
    pub fn try_seek(&self, position: u64) -> Result<()> {
        if self.kind == MediaKind::PushStream {
            let size = self.stream_size();
            if i64::try_from(position).map_or(true, |target| target > size) {
                return Err(StreamError::SeekOutOfBounds { position, size });
            }
        }

        if let SourceSlot::Device(device) = &mut *self.source.lock() {
            device.seek_to(position)?;
        }

        self.signals.set_started(false);
        self.position.store(position, Ordering::Release);

        Ok(())
    }

    /// Status-code form of [`MediaStream::try_seek`] for the seek callback
    pub fn seek(&self, position: u64) -> i32 {
        match self.try_seek(position) {
            Ok(()) => STATUS_OK,
            Err(err) => {
                debug!(id = %self.id, position, error = %err, "seek refused");
                STATUS_FAILED
            }
        }
    }
}

impl Default for MediaStream {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("stream_size", &self.stream_size())
            .field("position", &self.position())
            .field("started", &self.is_started())
            .field("buffering_complete", &self.is_buffering_complete())
            .field("end_of_stream", &self.is_end_of_stream())
            .finish()
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        debug!(id = %self.id, kind = %self.kind, "media stream destroyed");
    }
}
