use anyhow::{anyhow, Result};
use tapmark::app::{AppState, Effect, Flow, FrameSink, FrameStep, InputEvent, Key};

#[derive(Default)]
struct RecordingSink {
    effects: Vec<Effect>,
    presented: Vec<usize>,
    fail_present: bool,
    no_surface: bool,
}

impl FrameSink for RecordingSink {
    fn apply(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn present(&mut self, state: &AppState) -> Result<bool> {
        if self.fail_present {
            return Err(anyhow!("device lost"));
        }
        if self.no_surface {
            return Ok(false);
        }
        self.presented.push(state.slots.active().count());
        Ok(true)
    }
}

fn step() -> FrameStep {
    FrameStep::new(AppState::new(640, 480, 50.0, false))
}

#[test]
fn events_are_dispatched_before_the_frame_is_drawn() {
    let mut frame = step();
    let mut sink = RecordingSink::default();

    let flow = frame
        .run_frame(
            [
                InputEvent::PointerDown { index: 0, x: 10.0, y: 10.0 },
                InputEvent::PointerDown { index: 1, x: 20.0, y: 20.0 },
            ],
            &mut sink,
        )
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(sink.presented, vec![2]);
    assert_eq!(sink.effects, vec![Effect::PlayClick, Effect::PlayClick]);
    assert_eq!(frame.frames_presented(), 1);
}

#[test]
fn quiet_frames_still_present() {
    let mut frame = step();
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        frame.run_frame([], &mut sink).unwrap();
    }
    assert_eq!(sink.presented, vec![0, 0, 0]);
}

#[test]
fn background_skips_rendering() {
    let mut frame = step();
    let mut sink = RecordingSink::default();

    frame.run_frame([InputEvent::WillEnterBackground], &mut sink).unwrap();
    frame.run_frame([], &mut sink).unwrap();
    assert!(sink.presented.is_empty());

    frame.run_frame([InputEvent::DidEnterForeground], &mut sink).unwrap();
    assert_eq!(sink.presented.len(), 1);
}

#[test]
fn no_frames_render_after_quit() {
    let mut frame = step();
    let mut sink = RecordingSink::default();

    frame.run_frame([], &mut sink).unwrap();
    let flow = frame
        .run_frame(
            [
                InputEvent::PointerDown { index: 0, x: 1.0, y: 1.0 },
                InputEvent::KeyUp { key: Key::Escape, alt: false },
            ],
            &mut sink,
        )
        .unwrap();
    assert_eq!(flow, Flow::Quit);

    let flow = frame
        .run_frame([InputEvent::PointerDown { index: 1, x: 1.0, y: 1.0 }], &mut sink)
        .unwrap();
    assert_eq!(flow, Flow::Quit);

    assert_eq!(sink.presented.len(), 1);
    assert_eq!(frame.frames_presented(), 1);
    // effects queued before the quit in the same batch still apply
    assert_eq!(sink.effects, vec![Effect::PlayClick]);
    assert!(frame.state().slots.get(1).map_or(false, |location| !location.valid));
}

#[test]
fn fullscreen_effect_reaches_sink() {
    let mut frame = step();
    let mut sink = RecordingSink::default();

    frame
        .run_frame([InputEvent::KeyUp { key: Key::Return, alt: true }], &mut sink)
        .unwrap();

    assert!(frame.state().fullscreen);
    assert_eq!(sink.effects, vec![Effect::SetFullscreen(true)]);
}

#[test]
fn frames_without_a_surface_are_not_counted() {
    let mut frame = step();
    let mut sink = RecordingSink {
        no_surface: true,
        ..Default::default()
    };

    frame.run_frame([], &mut sink).unwrap();
    frame.run_frame([], &mut sink).unwrap();
    assert_eq!(frame.frames_presented(), 0);

    sink.no_surface = false;
    frame.run_frame([], &mut sink).unwrap();
    assert_eq!(frame.frames_presented(), 1);
}

#[test]
fn present_errors_propagate() {
    let mut frame = step();
    let mut sink = RecordingSink {
        fail_present: true,
        ..Default::default()
    };

    let err = frame.run_frame([], &mut sink).unwrap_err();
    assert_eq!(err.to_string(), "device lost");
    assert_eq!(frame.frames_presented(), 0);
}
