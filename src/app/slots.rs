use crate::ui::{Color, Rect};

pub const SLOT_COUNT: usize = 10;

pub const SLOT_COLORS: [Color; SLOT_COUNT] = [
    Color::rgba(255, 0, 0, 255),
    Color::rgba(0, 255, 0, 255),
    Color::rgba(0, 0, 255, 255),
    Color::rgba(128, 0, 0, 255),
    Color::rgba(0, 128, 0, 255),
    Color::rgba(0, 0, 128, 255),
    Color::rgba(128, 128, 0, 255),
    Color::rgba(0, 128, 128, 255),
    Color::rgba(128, 0, 128, 255),
    Color::rgba(192, 192, 192, 255),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub valid: bool,
    pub rect: Rect,
}

/// Ten markers, one per pointer or touch index, drawn while pressed.
#[derive(Debug, Clone)]
pub struct InteractionSlots {
    locations: [Location; SLOT_COUNT],
    marker_size: f32,
}

impl InteractionSlots {
    pub fn new(marker_size: f32) -> Self {
        let empty = Location {
            valid: false,
            rect: Rect::new(0.0, 0.0, marker_size, marker_size),
        };
        Self {
            locations: [empty; SLOT_COUNT],
            marker_size,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn press(&mut self, index: u64, x: f32, y: f32) -> bool {
        let half = self.marker_size / 2.0;
        match self.slot_mut(index) {
            Some(location) => {
                location.valid = true;
                location.rect.x = x - half;
                location.rect.y = y - half;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, index: u64) -> bool {
        match self.slot_mut(index) {
            Some(location) => {
                location.valid = false;
                true
            }
            None => false,
        }
    }

    /// Moves the marker whether or not it is currently pressed.
    pub fn motion(&mut self, index: u64, x: f32, y: f32) -> bool {
        let half = self.marker_size / 2.0;
        match self.slot_mut(index) {
            Some(location) => {
                location.rect.x = x - half;
                location.rect.y = y - half;
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = (usize, Rect, Color)> + '_ {
        self.locations
            .iter()
            .zip(SLOT_COLORS.iter())
            .enumerate()
            .filter(|(_, (location, _))| location.valid)
            .map(|(idx, (location, color))| (idx, location.rect, *color))
    }

    fn slot_mut(&mut self, index: u64) -> Option<&mut Location> {
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.locations.get_mut(idx))
    }
}
