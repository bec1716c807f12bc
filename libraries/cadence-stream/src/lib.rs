//! Cadence - Media Streams
//!
//! Pull sources for a native playback backend.
//!
//! This crate provides:
//! - [`MediaStream`]: one stream per track, of kind Unknown, Empty, Url,
//!   PushStream or ByteDevice
//! - Producer capabilities: [`PushSource`] (chunks on demand) and
//!   [`ByteDevice`] (anything `Read + Seek`)
//! - The fixed read / release / seek callbacks a backend invokes from its own
//!   decode thread ([`callbacks`])
//! - A registry of live streams so the backend carries a [`StreamId`], never
//!   an address ([`registry`])
//! - The `imem-*` media options that tie the two together ([`ImemOptions`])
//!
//! # Example: Byte device
//!
//! ```rust
//! use cadence_stream::{callbacks, registry, MediaStream, ReadRequest};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let stream = Arc::new(MediaStream::from_device(Cursor::new(vec![0u8; 4096])));
//! let id = registry::global().register(Arc::clone(&stream));
//!
//! // What the backend does on its decode thread
//! let mut request = ReadRequest::default();
//! assert_eq!(callbacks::read_callback(id, "", &mut request), callbacks::STATUS_OK);
//! assert_eq!(request.size, 4096);
//! callbacks::read_done_callback(id, "", request.size, request.buffer.take());
//!
//! registry::global().unregister(id);
//! ```
//!
//! # Example: Push producer
//!
//! ```rust
//! use cadence_stream::{MediaStream, PushSource, ReadRequest, StreamSignals};
//! use std::io;
//!
//! struct Countdown(u8);
//!
//! impl PushSource for Countdown {
//!     fn need_data(&mut self, signals: &StreamSignals) -> io::Result<Vec<u8>> {
//!         self.0 -= 1;
//!         if self.0 == 0 {
//!             signals.end_of_data();
//!         }
//!         Ok(vec![self.0; 16])
//!     }
//! }
//!
//! let stream = MediaStream::from_push(Countdown(2));
//! let mut request = ReadRequest::default();
//! assert_eq!(stream.read(&mut request), 0);
//! assert_eq!(stream.read(&mut request), 0);
//! assert_eq!(stream.read(&mut request), -1);
//! ```

mod buffer;
pub mod callbacks;
mod error;
mod options;
pub mod registry;
mod source;
mod stream;
mod types;

// Public exports
pub use buffer::{ScratchLease, StreamBuffer, BLOCK_SIZE};
pub use callbacks::{PullCallbacks, ReadRequest, PULL_CALLBACKS, STATUS_FAILED, STATUS_OK};
pub use error::{Result, StreamError};
pub use options::{ImemOptions, IMEM_AUDIO_CATEGORY, IMEM_LOCATION};
pub use registry::StreamRegistry;
pub use source::{ByteDevice, PushSource, SharedDevice, StreamSignals};
pub use stream::MediaStream;
pub use types::{MediaKind, MediaUrl, StreamId};
