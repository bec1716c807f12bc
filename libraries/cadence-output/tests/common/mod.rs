//! Shared helpers for output integration tests

#![allow(dead_code)]

use cadence_output::{
    AudioOutput, BackendEvent, BackendEventKind, EventSink, FrameHook, MediaHandle,
    NativeLibrary, OutputConfig, OutputError, PlayerHandle, Result,
};
use cadence_stream::{
    ImemOptions, PullCallbacks, ReadRequest, StreamBuffer, STATUS_FAILED, STATUS_OK,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ===== Fake native library =====

/// Everything the output asked the library to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    NewPlayer,
    ReleasePlayer,
    NewMedia(MediaHandle, String),
    AddOption(MediaHandle, String, bool),
    ReleaseMedia(MediaHandle),
    SetMedia(MediaHandle),
    Play,
    SetPause(bool),
    Stop,
    SetTime(i64),
    SetVolume(i32),
    AttachPlayerEvents(usize),
    AttachMediaEvents(MediaHandle),
    SetFrameHook,
    Release,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    args: Vec<String>,
    next_handle: u64,
    live_media: Vec<MediaHandle>,
    options: HashMap<MediaHandle, Vec<String>>,
    bound: Option<MediaHandle>,
    started: bool,
    duration: i64,
    fail_player: bool,
    player_sink: Option<EventSink>,
    media_sinks: HashMap<MediaHandle, EventSink>,
    frame_hook: Option<Arc<FrameHook>>,
}

/// In-memory stand-in for the playback engine
///
/// Records every call, tracks live media handles, and lets tests raise
/// events or pull data the way the engine's threads would.
#[derive(Default)]
pub struct FakeLibrary {
    state: Mutex<FakeState>,
}

impl FakeLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Engine reporting `duration` ms for every media
    pub fn with_duration(duration: i64) -> Arc<Self> {
        let library = Self::new();
        library.state.lock().duration = duration;
        library
    }

    /// Engine whose player cannot be created
    pub fn without_player() -> Arc<Self> {
        let library = Self::new();
        library.state.lock().fail_player = true;
        library
    }

    /// Output driving this library with default configuration
    pub fn output(self: &Arc<Self>) -> AudioOutput {
        self.output_with(&OutputConfig::default())
    }

    pub fn output_with(self: &Arc<Self>, config: &OutputConfig) -> AudioOutput {
        init_tracing();
        let library = Arc::clone(self);
        AudioOutput::new(config, move |args: &[String]| {
            library.state.lock().args = args.to_vec();
            Ok(library as Arc<dyn NativeLibrary>)
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn args(&self) -> Vec<String> {
        self.state.lock().args.clone()
    }

    pub fn live_media(&self) -> usize {
        self.state.lock().live_media.len()
    }

    pub fn bound_media(&self) -> Option<MediaHandle> {
        self.state.lock().bound
    }

    /// Options attached to the currently bound media
    pub fn bound_options(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .bound
            .and_then(|media| state.options.get(&media).cloned())
            .unwrap_or_default()
    }

    pub fn last_volume(&self) -> Option<i32> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::SetVolume(percent) => Some(percent),
            _ => None,
        })
    }

    /// Raise a player event as the engine thread would
    pub fn emit_player(&self, event: BackendEvent) {
        let sink = self.state.lock().player_sink.clone();
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    /// Raise an event on the bound media
    pub fn emit_media(&self, event: BackendEvent) {
        let sink = {
            let state = self.state.lock();
            state.bound.and_then(|media| state.media_sinks.get(&media).cloned())
        };
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    /// Pull one block through the imem options of the bound media
    ///
    /// Returns the read status and the delivered bytes, releasing the buffer
    /// afterwards like the engine does.
    pub fn pull(&self) -> (i32, Vec<u8>) {
        let Some((options, table)) = self.pull_table() else {
            return (STATUS_FAILED, Vec::new());
        };

        let mut request = ReadRequest::default();
        let status = (table.read)(options.data, "", &mut request);
        let bytes = request
            .buffer
            .as_ref()
            .map(StreamBuffer::to_vec)
            .unwrap_or_default();
        if status == STATUS_OK {
            (table.read_done)(options.data, "", request.size, request.buffer.take());
        }
        (status, bytes)
    }

    /// Seek the bound pull source through its callback
    pub fn seek_source(&self, position: u64) -> i32 {
        match self.pull_table() {
            Some((options, table)) => (table.seek)(options.data, position),
            None => STATUS_FAILED,
        }
    }

    fn pull_table(&self) -> Option<(ImemOptions, PullCallbacks)> {
        let options = ImemOptions::parse(&self.bound_options())?;
        let table = options.callbacks()?;
        Some((options, table))
    }

    /// Feed one block of samples through the installed frame hook
    pub fn render(&self, frame_number: i32, samples: &mut [f32], channels: usize) {
        let hook = self.state.lock().frame_hook.clone();
        if let Some(hook) = hook {
            hook.process(frame_number, samples, channels);
        }
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }

    fn handle(state: &mut FakeState) -> u64 {
        state.next_handle += 1;
        state.next_handle
    }
}

impl NativeLibrary for FakeLibrary {
    fn new_player(&self) -> Result<PlayerHandle> {
        let mut state = self.state.lock();
        if state.fail_player {
            return Err(OutputError::BackendInit("player refused".to_string()));
        }
        state.calls.push(Call::NewPlayer);
        Ok(PlayerHandle::from_raw(Self::handle(&mut state)))
    }

    fn release_player(&self, _player: PlayerHandle) {
        self.record(Call::ReleasePlayer);
    }

    fn new_media_location(&self, location: &str) -> Result<MediaHandle> {
        let mut state = self.state.lock();
        let media = MediaHandle::from_raw(Self::handle(&mut state));
        state.calls.push(Call::NewMedia(media, location.to_string()));
        state.live_media.push(media);
        Ok(media)
    }

    fn add_media_option(&self, media: MediaHandle, option: &str, trusted: bool) {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::AddOption(media, option.to_string(), trusted));
        state.options.entry(media).or_default().push(option.to_string());
    }

    fn media_duration(&self, _media: MediaHandle) -> i64 {
        self.state.lock().duration
    }

    fn release_media(&self, media: MediaHandle) {
        let mut state = self.state.lock();
        state.calls.push(Call::ReleaseMedia(media));
        state.live_media.retain(|live| *live != media);
        state.media_sinks.remove(&media);
        if state.bound == Some(media) {
            state.bound = None;
        }
    }

    fn set_media(&self, _player: PlayerHandle, media: MediaHandle) {
        let mut state = self.state.lock();
        state.calls.push(Call::SetMedia(media));
        state.bound = Some(media);
    }

    fn play(&self, _player: PlayerHandle) {
        let mut state = self.state.lock();
        state.calls.push(Call::Play);
        state.started = true;
    }

    fn set_pause(&self, _player: PlayerHandle, paused: bool) {
        self.record(Call::SetPause(paused));
    }

    fn stop(&self, _player: PlayerHandle) {
        let sink = {
            let mut state = self.state.lock();
            state.calls.push(Call::Stop);
            state.started = false;
            state.player_sink.clone()
        };
        // Engines report the stop asynchronously
        if let Some(sink) = sink {
            sink.emit(BackendEvent::Stopped);
        }
    }

    fn is_playing(&self, _player: PlayerHandle) -> bool {
        self.state.lock().started
    }

    fn set_time(&self, _player: PlayerHandle, time_ms: i64) {
        self.record(Call::SetTime(time_ms));
    }

    fn set_volume(&self, _player: PlayerHandle, percent: i32) {
        self.record(Call::SetVolume(percent));
    }

    fn attach_player_events(
        &self,
        _player: PlayerHandle,
        events: &[BackendEventKind],
        sink: EventSink,
    ) {
        let mut state = self.state.lock();
        state.calls.push(Call::AttachPlayerEvents(events.len()));
        state.player_sink = Some(sink);
    }

    fn attach_media_events(&self, media: MediaHandle, _events: &[BackendEventKind], sink: EventSink) {
        let mut state = self.state.lock();
        state.calls.push(Call::AttachMediaEvents(media));
        state.media_sinks.insert(media, sink);
    }

    fn set_frame_hook(&self, _player: PlayerHandle, hook: Arc<FrameHook>) {
        let mut state = self.state.lock();
        state.calls.push(Call::SetFrameHook);
        state.frame_hook = Some(hook);
    }

    fn release(&self) {
        self.record(Call::Release);
    }
}
