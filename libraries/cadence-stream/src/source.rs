//! Byte producers a stream can pull from
//!
//! Two capabilities exist:
//! - [`PushSource`]: a producer that hands out whole chunks on demand
//! - [`ByteDevice`]: a byte-oriented I/O object read in fixed-size blocks
//!
//! Producers share a [`StreamSignals`] handle with the stream so they can flag
//! "no more bytes will arrive" from whatever thread feeds them.

use parking_lot::Mutex;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Producer-driven chunk source
pub trait PushSource: Send {
    /// Produce the next chunk of bytes
    ///
    /// Called from the backend decode thread and must return promptly.
    ///
    /// # Returns
    /// * `Ok(bytes)` - Next chunk; an empty vector means "nothing right now"
    /// * `Err(_)` - The producer failed; the stream ends permanently
    ///
    /// Call [`StreamSignals::end_of_data`] to declare that the chunk being
    /// returned (if any) is the last one.
    fn need_data(&mut self, signals: &StreamSignals) -> io::Result<Vec<u8>> {
        let _ = signals;
        debug!("push source has no data");
        Ok(Vec::new())
    }
}

/// Byte-oriented I/O object
///
/// Blanket-implemented for everything that is `Read + Seek + Send`
/// (files, cursors, [`SharedDevice`], ...).
pub trait ByteDevice: Send {
    /// Read up to `buf.len()` bytes, returning how many were read
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move the read cursor to an absolute byte offset
    fn seek_to(&mut self, position: u64) -> io::Result<()>;
}

impl<T: Read + Seek + Send> ByteDevice for T {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(position)).map(|_| ())
    }
}

/// Device the caller keeps ownership of
///
/// The stream only holds a shared handle, so the device outlives the stream
/// unless the caller drops its own handle too.
pub struct SharedDevice<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SharedDevice<T> {
    pub fn new(device: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Wrap a device the caller already shares
    pub fn from_handle(inner: Arc<Mutex<T>>) -> Self {
        Self { inner }
    }

    /// Caller-side handle to the device
    pub fn handle(&self) -> Arc<Mutex<T>> {
        Arc::clone(&self.inner)
    }
}

impl<T> Clone for SharedDevice<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Read> Read for SharedDevice<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.lock().read(buf)
    }
}

impl<T: Seek> Seek for SharedDevice<T> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.lock().seek(pos)
    }
}

#[derive(Debug, Default)]
struct Flags {
    started: AtomicBool,
    buffering_complete: AtomicBool,
    end_of_stream: AtomicBool,
}

/// Flags shared between a stream, its producer and the backend thread
///
/// `end_of_stream` and `buffering_complete` only ever go from false to true.
#[derive(Debug, Clone, Default)]
pub struct StreamSignals {
    flags: Arc<Flags>,
}

impl StreamSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// The producer will never deliver more bytes
    pub fn finish_buffering(&self) {
        if !self.flags.buffering_complete.swap(true, Ordering::AcqRel) {
            debug!("buffering finished");
        }
    }

    pub fn is_buffering_complete(&self) -> bool {
        self.flags.buffering_complete.load(Ordering::Acquire)
    }

    /// Declare permanent end of stream
    pub fn end_of_data(&self) {
        if !self.flags.end_of_stream.swap(true, Ordering::AcqRel) {
            debug!("end of data");
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.flags.end_of_stream.load(Ordering::Acquire)
    }

    pub fn is_started(&self) -> bool {
        self.flags.started.load(Ordering::Acquire)
    }

    pub(crate) fn set_started(&self, started: bool) {
        self.flags.started.store(started, Ordering::Release);
    }
}
