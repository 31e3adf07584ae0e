use winit::event::{ElementState, TouchPhase, WindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};

use crate::app::{InputEvent, Key, Orientation};

/// The user-facing message channel. Mobile builds would surface these as
/// toasts; everywhere they land in the log.
pub fn notify(message: &str) {
    tracing::info!(target: "notify", "{message}");
}

/// Pointer index of the mouse. Slots are keyed by device, so every button of
/// the mouse drives this one slot.
pub const MOUSE_POINTER: u64 = 0;

pub fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        WinitKey::Named(NamedKey::Enter) => Key::Return,
        _ => Key::Other,
    }
}

/// Turns winit window events into [`InputEvent`]s.
///
/// winit reports mouse buttons without a position and modifiers out of band,
/// so the cursor and Alt state are tracked here.
#[derive(Debug)]
pub struct EventTranslator {
    cursor: (f32, f32),
    alt: bool,
    orientation: Orientation,
}

impl EventTranslator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cursor: (0.0, 0.0),
            alt: false,
            orientation: Orientation::from_size(width, height),
        }
    }

    pub fn window_event(&mut self, event: &WindowEvent, out: &mut Vec<InputEvent>) {
        match event {
            WindowEvent::CloseRequested => out.push(InputEvent::Quit),
            WindowEvent::Resized(size) => self.resized(size.width, size.height, out),
            WindowEvent::Occluded(true) => out.push(InputEvent::Hidden),
            WindowEvent::Occluded(false) => out.push(InputEvent::Shown),
            WindowEvent::ModifiersChanged(modifiers) => self.alt = modifiers.state().alt_key(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Released => {
                out.push(InputEvent::KeyUp {
                    key: map_key(&event.logical_key),
                    alt: self.alt,
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32, out);
            }
            WindowEvent::MouseInput { state, .. } => self.mouse_button(*state, out),
            WindowEvent::Touch(touch) => self.touch(
                touch.id,
                touch.phase,
                touch.location.x as f32,
                touch.location.y as f32,
                out,
            ),
            _ => {}
        }
    }

    pub fn resized(&mut self, width: u32, height: u32, out: &mut Vec<InputEvent>) {
        out.push(InputEvent::Resized { width, height });
        let orientation = Orientation::from_size(width, height);
        if orientation != self.orientation {
            self.orientation = orientation;
            out.push(InputEvent::Orientation(orientation));
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32, out: &mut Vec<InputEvent>) {
        self.cursor = (x, y);
        out.push(InputEvent::PointerMotion { index: MOUSE_POINTER, x, y });
    }

    pub fn mouse_button(&mut self, state: ElementState, out: &mut Vec<InputEvent>) {
        let (x, y) = self.cursor;
        let index = MOUSE_POINTER;
        tracing::debug!(x, y, ?state, "mouse button");
        out.push(match state {
            ElementState::Pressed => InputEvent::PointerDown { index, x, y },
            ElementState::Released => InputEvent::PointerUp { index, x, y },
        });
    }

    pub(crate) fn touch(
        &mut self,
        index: u64,
        phase: TouchPhase,
        x: f32,
        y: f32,
        out: &mut Vec<InputEvent>,
    ) {
        tracing::debug!(finger = index, x, y, ?phase, "touch");
        out.push(match phase {
            TouchPhase::Started => InputEvent::PointerDown { index, x, y },
            TouchPhase::Moved => InputEvent::PointerMotion { index, x, y },
            TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::PointerUp { index, x, y },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::{AppState, SLOT_COLORS};

    fn dispatch(state: &mut AppState, events: &[InputEvent]) {
        let mut effects = Vec::new();
        for event in events {
            state.handle(event, &mut effects);
        }
    }

    #[test]
    fn every_mouse_button_drives_the_mouse_slot() {
        let mut translator = EventTranslator::new(640, 480);
        let mut state = AppState::new(640, 480, 50.0, false);
        let mut out = Vec::new();

        translator.cursor_moved(100.0, 100.0, &mut out);
        // a right click; the button itself is not forwarded
        translator.mouse_button(ElementState::Pressed, &mut out);
        dispatch(&mut state, &out);

        let active: Vec<_> = state.slots.active().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, 0);
        assert_eq!(active[0].2, SLOT_COLORS[0]);
    }

    #[test]
    fn releasing_any_button_clears_the_mouse_marker() {
        let mut translator = EventTranslator::new(640, 480);
        let mut state = AppState::new(640, 480, 50.0, false);
        let mut out = Vec::new();

        translator.mouse_button(ElementState::Pressed, &mut out);
        translator.mouse_button(ElementState::Pressed, &mut out);
        translator.mouse_button(ElementState::Released, &mut out);
        dispatch(&mut state, &out);

        assert_eq!(state.slots.active().count(), 0);
    }

    #[test]
    fn only_escape_and_enter_are_special() {
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Escape)), Key::Escape);
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Enter)), Key::Return);
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Tab)), Key::Other);
    }

    #[test]
    fn mouse_events_use_the_last_cursor_position() {
        let mut translator = EventTranslator::new(640, 480);
        let mut out = Vec::new();

        translator.cursor_moved(10.0, 20.0, &mut out);
        translator.mouse_button(ElementState::Pressed, &mut out);
        translator.cursor_moved(30.0, 40.0, &mut out);
        translator.mouse_button(ElementState::Released, &mut out);

        assert_eq!(
            out,
            vec![
                InputEvent::PointerMotion { index: 0, x: 10.0, y: 20.0 },
                InputEvent::PointerDown { index: 0, x: 10.0, y: 20.0 },
                InputEvent::PointerMotion { index: 0, x: 30.0, y: 40.0 },
                InputEvent::PointerUp { index: 0, x: 30.0, y: 40.0 },
            ]
        );
    }

    #[test]
    fn touch_phases_map_to_pointer_events() {
        let mut translator = EventTranslator::new(640, 480);
        let mut out = Vec::new();

        translator.touch(3, TouchPhase::Started, 5.0, 6.0, &mut out);
        translator.touch(3, TouchPhase::Moved, 7.0, 8.0, &mut out);
        translator.touch(3, TouchPhase::Ended, 7.0, 8.0, &mut out);
        translator.touch(4, TouchPhase::Started, 1.0, 2.0, &mut out);
        translator.touch(4, TouchPhase::Cancelled, 1.0, 2.0, &mut out);

        assert_eq!(
            out,
            vec![
                InputEvent::PointerDown { index: 3, x: 5.0, y: 6.0 },
                InputEvent::PointerMotion { index: 3, x: 7.0, y: 8.0 },
                InputEvent::PointerUp { index: 3, x: 7.0, y: 8.0 },
                InputEvent::PointerDown { index: 4, x: 1.0, y: 2.0 },
                InputEvent::PointerUp { index: 4, x: 1.0, y: 2.0 },
            ]
        );
    }

    #[test]
    fn fingers_past_the_tenth_leave_slots_alone() {
        let mut translator = EventTranslator::new(640, 480);
        let mut state = AppState::new(640, 480, 50.0, false);
        let mut out = Vec::new();

        translator.touch(12, TouchPhase::Started, 40.0, 40.0, &mut out);
        assert_eq!(out, vec![InputEvent::PointerDown { index: 12, x: 40.0, y: 40.0 }]);
        dispatch(&mut state, &out);
        assert_eq!(state.slots.active().count(), 0);

        out.clear();
        translator.touch(9, TouchPhase::Started, 40.0, 40.0, &mut out);
        translator.touch(9, TouchPhase::Cancelled, 40.0, 40.0, &mut out);
        dispatch(&mut state, &out);
        assert!(state.slots.get(9).map_or(false, |location| !location.valid));
    }

    #[test]
    fn orientation_reported_on_change_only() {
        let mut translator = EventTranslator::new(640, 480);
        let mut out = Vec::new();

        translator.resized(800, 600, &mut out);
        translator.resized(600, 800, &mut out);

        assert_eq!(
            out,
            vec![
                InputEvent::Resized { width: 800, height: 600 },
                InputEvent::Resized { width: 600, height: 800 },
                InputEvent::Orientation(Orientation::Portrait),
            ]
        );
    }
}
