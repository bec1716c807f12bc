//! Property-based tests for the audio output
//!
//! Random command sequences must never leave more than one media bound, and
//! about-to-finish must fire exactly once per approach to the end.

mod common;

use cadence_output::{BackendEvent, OutputEvent, OutputState};
use cadence_stream::{registry, MediaStream};
use common::FakeLibrary;
use proptest::prelude::*;
use std::io::Cursor;

#[derive(Debug, Clone)]
enum Command {
    SetUrl,
    SetDevice,
    SetEmpty,
    Play,
    Pause,
    Stop,
    Seek(i64),
    BackendTime(i64),
    BackendError,
}

fn arbitrary_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        2 => Just(Command::SetUrl),
        2 => Just(Command::SetDevice),
        1 => Just(Command::SetEmpty),
        2 => Just(Command::Play),
        1 => Just(Command::Pause),
        1 => Just(Command::Stop),
        1 => (0i64..120_000).prop_map(Command::Seek),
        2 => (0i64..120_000).prop_map(Command::BackendTime),
        1 => Just(Command::BackendError),
    ]
}

proptest! {
    /// Property: at most one media handle is live at any time
    #[test]
    fn at_most_one_media_bound(commands in prop::collection::vec(arbitrary_command(), 1..40)) {
        let library = FakeLibrary::with_duration(100_000);
        let mut output = library.output();

        for command in commands {
            match command {
                Command::SetUrl => {
                    output.set_current_url("http://a.example/track.mp3");
                }
                Command::SetDevice => {
                    output.set_current_device(Cursor::new(vec![0u8; 32]));
                }
                Command::SetEmpty => {
                    output.set_current_source(MediaStream::empty());
                }
                Command::Play => output.play(),
                Command::Pause => output.pause(),
                Command::Stop => output.stop(),
                Command::Seek(time) => output.seek(time),
                Command::BackendTime(time) => {
                    library.emit_player(BackendEvent::TimeChanged(time));
                    output.process_backend_events();
                }
                Command::BackendError => {
                    library.emit_player(BackendEvent::EncounteredError);
                    output.process_backend_events();
                }
            }

            prop_assert!(library.live_media() <= 1);

            // Only the current pull source is reachable through the registry
            if let Some(stream) = output.current_source() {
                let registered = registry::global().contains(stream.id());
                prop_assert_eq!(registered, stream.kind().is_pull_source());
            }
        }

        drop(output);
        prop_assert_eq!(library.live_media(), 0);
    }

    /// Property: about-to-finish fires once for every approach to the end
    #[test]
    fn about_to_finish_once_per_approach(
        total in 10_000i64..600_000,
        approaches in 1usize..4,
        steps in 2usize..20,
    ) {
        let library = FakeLibrary::with_duration(total);
        let mut output = library.output();
        output.set_current_url("http://a.example/track.mp3");
        output.play();
        prop_assert_eq!(output.state(), OutputState::Playing);

        let step = total / steps as i64;
        for _ in 0..approaches {
            // Start well outside the window, then play through to the end
            for i in 0..=steps as i64 {
                library.emit_player(BackendEvent::TimeChanged(i * step));
            }
        }
        output.process_backend_events();

        let fired = std::iter::from_fn(|| output.try_recv_event())
            .filter(|event| *event == OutputEvent::AboutToFinish)
            .count();
        prop_assert_eq!(fired, approaches);
    }
}
