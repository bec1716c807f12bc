//! Buffers handed to the backend by the read callback
//!
//! Push producers return a fresh heap buffer per read which the backend hands
//! back (and thereby frees) through the release callback. Byte devices read
//! into one scratch block owned by the stream; the backend only gets a lease
//! on it, and releasing the lease never frees the block.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

use crate::source::ByteDevice;

/// Largest read a byte device serves per callback (1 MiB)
pub const BLOCK_SIZE: usize = 1_048_576;

/// Bytes produced by one read
#[derive(Debug)]
pub enum StreamBuffer {
    /// Per-read allocation from a push producer
    Heap(Vec<u8>),

    /// View into the stream's reused scratch block
    Scratch(ScratchLease),
}

impl StreamBuffer {
    pub fn len(&self) -> usize {
        match self {
            StreamBuffer::Heap(bytes) => bytes.len(),
            StreamBuffer::Scratch(lease) => lease.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` over the produced bytes
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        match self {
            StreamBuffer::Heap(bytes) => f(bytes),
            StreamBuffer::Scratch(lease) => lease.with_bytes(f),
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.with_bytes(<[u8]>::to_vec)
    }
}

/// Lease on the first `len` bytes of a scratch block
#[derive(Debug, Clone)]
pub struct ScratchLease {
    block: Arc<Mutex<Vec<u8>>>,
    len: usize,
}

impl ScratchLease {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let block = self.block.lock();
        let end = self.len.min(block.len());
        f(&block[..end])
    }

    /// Whether both leases point into the same scratch block
    pub fn shares_block(&self, other: &ScratchLease) -> bool {
        Arc::ptr_eq(&self.block, &other.block)
    }
}

/// Reused read block of a byte-device stream
#[derive(Debug, Default)]
pub(crate) struct ScratchBlock {
    block: Arc<Mutex<Vec<u8>>>,
}

impl ScratchBlock {
    /// Read up to [`BLOCK_SIZE`] bytes from `device` into the block
    pub(crate) fn fill(&self, device: &mut dyn ByteDevice) -> io::Result<ScratchLease> {
        let mut block = self.block.lock();
        if block.len() != BLOCK_SIZE {
            block.resize(BLOCK_SIZE, 0);
        }

        let len = device.read_block(&mut block[..])?;

        Ok(ScratchLease {
            block: Arc::clone(&self.block),
            len: len.min(BLOCK_SIZE),
        })
    }
}
