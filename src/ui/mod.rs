pub mod overlay;
pub mod popup;
pub mod style;

#[cfg(feature = "egui")]
pub mod surface;

pub use overlay::{render_overlays, OverlayInputs, OverlayPanel};
pub use popup::{resolve_popup, PopupContent, PopupTemplate};
pub use style::{palette, HexColor};
