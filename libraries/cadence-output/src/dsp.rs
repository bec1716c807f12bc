//! Frame-level DSP hook
//!
//! Backends that expose decoded audio call [`FrameHook::process`] from their
//! audio thread for every block of interleaved samples. The installed callback
//! may rewrite the samples in place.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// One block of decoded audio handed to the DSP callback
#[derive(Debug)]
pub struct DspFrame<'a> {
    /// True for the first block after a seek
    pub seeked: bool,
    pub frame_number: i32,
    /// Interleaved samples
    pub samples: &'a mut [f32],
    pub channels: usize,
}

impl DspFrame<'_> {
    /// Number of sample frames in the block
    pub fn frames(&self) -> usize {
        self.samples.len().checked_div(self.channels).unwrap_or(0)
    }
}

/// Callback invoked for every decoded block
pub type DspCallback = Box<dyn FnMut(DspFrame<'_>) + Send>;

/// Shared between the output (which marks seeks) and the backend audio thread
#[derive(Default)]
pub struct FrameHook {
    just_seeked: AtomicBool,
    callback: Mutex<Option<DspCallback>>,
}

impl FrameHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&self, callback: Option<DspCallback>) {
        *self.callback.lock() = callback;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().is_some()
    }

    pub(crate) fn mark_seeked(&self) {
        self.just_seeked.store(true, Ordering::Release);
    }

    pub(crate) fn clear_seeked(&self) {
        self.just_seeked.store(false, Ordering::Release);
    }

    /// A seek happened that no block has reported yet
    pub fn is_seek_pending(&self) -> bool {
        self.just_seeked.load(Ordering::Acquire)
    }

    /// Run the callback over one block
    ///
    /// The seek flag is consumed even when no callback is installed.
    pub fn process(&self, frame_number: i32, samples: &mut [f32], channels: usize) {
        let seeked = self.just_seeked.swap(false, Ordering::AcqRel);
        if let Some(callback) = self.callback.lock().as_mut() {
            callback(DspFrame {
                seeked,
                frame_number,
                samples,
                channels,
            });
        }
    }
}

impl fmt::Debug for FrameHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHook")
            .field("just_seeked", &self.is_seek_pending())
            .field("has_callback", &self.has_callback())
            .finish()
    }
}
