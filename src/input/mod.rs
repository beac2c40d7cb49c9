pub mod events;
pub mod selection;

pub use events::MapEvent;
pub use selection::{Selection, SelectionChange, SelectionState};
