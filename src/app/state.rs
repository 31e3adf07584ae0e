use super::event::{InputEvent, Key};
use super::slots::InteractionSlots;

/// Side effects requested by the dispatcher, applied by the frame sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    PlayClick,
    SetFullscreen(bool),
    Notify(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub slots: InteractionSlots,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub foreground: bool,
    pub quit: bool,
}

impl AppState {
    pub fn new(width: u32, height: u32, marker_size: f32, fullscreen: bool) -> Self {
        Self {
            slots: InteractionSlots::new(marker_size),
            width,
            height,
            fullscreen,
            foreground: true,
            quit: false,
        }
    }

    pub fn handle(&mut self, event: &InputEvent, effects: &mut Vec<Effect>) {
        match *event {
            InputEvent::Quit => self.quit = true,
            InputEvent::Orientation(orientation) => {
                effects.push(Effect::Notify(orientation.label()));
            }
            InputEvent::Resized { width, height } => {
                self.width = width;
                self.height = height;
            }
            InputEvent::Shown | InputEvent::DidEnterForeground => self.foreground = true,
            InputEvent::Hidden | InputEvent::WillEnterBackground => self.foreground = false,
            InputEvent::PointerDown { index, x, y } => {
                tracing::debug!(index, x, y, "pointer down");
                self.slots.press(index, x, y);
                effects.push(Effect::PlayClick);
            }
            InputEvent::PointerUp { index, x, y } => {
                tracing::debug!(index, x, y, "pointer up");
                self.slots.release(index);
            }
            InputEvent::PointerMotion { index, x, y } => {
                tracing::trace!(index, x, y, "pointer motion");
                self.slots.motion(index, x, y);
            }
            InputEvent::KeyUp { key, alt } => match key {
                Key::Escape => self.quit = true,
                Key::Return if alt => {
                    self.fullscreen = !self.fullscreen;
                    effects.push(Effect::SetFullscreen(self.fullscreen));
                }
                Key::Return | Key::Other => {}
            },
        }
    }
}
