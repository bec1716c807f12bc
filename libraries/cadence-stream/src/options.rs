//! Media options that attach a pull source to a backend media handle
//!
//! In-process media use the `imem://` location and five trusted options:
//!
//! ```text
//! imem-cat=4
//! imem-data=<stream id>
//! imem-get=<read callback>
//! imem-release=<release callback>
//! imem-seek=<seek callback>
//! ```

use crate::callbacks::{PullCallbacks, PULL_CALLBACKS};
use crate::types::StreamId;

/// Location token of in-process pull sources
pub const IMEM_LOCATION: &str = "imem://";

/// Elementary stream category for audio
pub const IMEM_AUDIO_CATEGORY: u32 = 4;

/// Decoded set of `imem-*` options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImemOptions {
    pub category: u32,
    pub data: StreamId,
    pub get: usize,
    pub release: usize,
    pub seek: usize,
}

impl ImemOptions {
    /// Options binding `id` to [`PULL_CALLBACKS`]
    pub fn for_stream(id: StreamId) -> Self {
        let [get, release, seek] = PULL_CALLBACKS.identities();
        Self {
            category: IMEM_AUDIO_CATEGORY,
            data: id,
            get,
            release,
            seek,
        }
    }

    /// Render as `key=value` option strings, category first
    pub fn to_options(&self) -> Vec<String> {
        vec![
            format!("imem-cat={}", self.category),
            format!("imem-data={}", self.data),
            format!("imem-get={}", self.get),
            format!("imem-release={}", self.release),
            format!("imem-seek={}", self.seek),
        ]
    }

    /// Recover the options from a media handle's option list
    ///
    /// Returns `None` unless all five keys are present and numeric.
    pub fn parse<S: AsRef<str>>(options: &[S]) -> Option<Self> {
        let mut category = None;
        let mut data = None;
        let mut get = None;
        let mut release = None;
        let mut seek = None;

        for option in options {
            let Some((key, value)) = option.as_ref().split_once('=') else {
                continue;
            };
            match key {
                "imem-cat" => category = value.parse().ok(),
                "imem-data" => data = value.parse().ok().map(StreamId::from_raw),
                "imem-get" => get = value.parse().ok(),
                "imem-release" => release = value.parse().ok(),
                "imem-seek" => seek = value.parse().ok(),
                _ => {}
            }
        }

        Some(Self {
            category: category?,
            data: data?,
            get: get?,
            release: release?,
            seek: seek?,
        })
    }

    /// Resolve the carried identities back to callable callbacks
    ///
    /// Only identities of [`PULL_CALLBACKS`] resolve; anything else yields
    /// `None`.
    pub fn callbacks(&self) -> Option<PullCallbacks> {
        (PULL_CALLBACKS.identities() == [self.get, self.release, self.seek])
            .then_some(PULL_CALLBACKS)
    }
}
