pub mod event;
pub mod frame;
pub mod slots;
pub mod state;

pub use event::{InputEvent, Key, Orientation};
pub use frame::{Flow, FrameSink, FrameStep};
pub use slots::{InteractionSlots, Location, SLOT_COLORS, SLOT_COUNT};
pub use state::{AppState, Effect};
