use anyhow::Result;

use super::event::InputEvent;
use super::state::{AppState, Effect};

/// Receives the outcome of a frame: effects first, then at most one present.
pub trait FrameSink {
    fn apply(&mut self, effect: Effect);
    /// Returns whether a frame actually reached the screen.
    fn present(&mut self, state: &AppState) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One poll-then-render iteration, shared by the native loop and the
/// browser-driven loop.
#[derive(Debug)]
pub struct FrameStep {
    state: AppState,
    effects: Vec<Effect>,
    frames: u64,
}

impl FrameStep {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            frames: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn run_frame<I, S>(&mut self, events: I, sink: &mut S) -> Result<Flow>
    where
        I: IntoIterator<Item = InputEvent>,
        S: FrameSink + ?Sized,
    {
        if self.state.quit {
            return Ok(Flow::Quit);
        }

        for event in events {
            self.state.handle(&event, &mut self.effects);
        }
        for effect in self.effects.drain(..) {
            sink.apply(effect);
        }

        if self.state.quit {
            tracing::info!(target: "engine", frames = self.frames, "quit requested");
            return Ok(Flow::Quit);
        }

        if self.state.foreground && sink.present(&self.state)? {
            self.frames += 1;
        }
        Ok(Flow::Continue)
    }
}
