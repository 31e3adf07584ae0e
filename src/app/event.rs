#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Return,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn from_size(width: u32, height: u32) -> Self {
        if width >= height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

/// Input understood by the frame step, independent of the windowing backend.
///
/// Pointer coordinates are physical pixels relative to the window's top-left
/// corner. `index` is a mouse button or touch id; only `0..SLOT_COUNT` reach a
/// slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Quit,
    Resized { width: u32, height: u32 },
    Orientation(Orientation),
    Shown,
    Hidden,
    WillEnterBackground,
    DidEnterForeground,
    PointerDown { index: u64, x: f32, y: f32 },
    PointerUp { index: u64, x: f32, y: f32 },
    PointerMotion { index: u64, x: f32, y: f32 },
    KeyUp { key: Key, alt: bool },
}
