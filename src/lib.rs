//! # opsmap
//!
//! Map core for an operations console: normalizes heterogeneous entity
//! collections into position-valid markers, styles them by type and state,
//! keeps selection and highlight consistent between the map and the hosting
//! UI, and formats upstream analytics as overlay panels.
//!
//! Rendering goes through the [`traits::MapSurface`] capability; an egui
//! implementation ships behind the `egui` feature.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{MapConfig, ViewportDefaults},
    geo::LatLng,
    map::MapView,
    viewport::{Viewport, ViewportController},
};

pub use data::{
    analytics::{AnalyticsSummary, GpsAnalysis, RouteOptimizations},
    entity::{EntityDetails, MarkerEntity, MarkerId, MarkerKind},
    normalize::{normalize, EntitySources, NormalizeReport, Normalizer},
    position::resolve_position,
};

pub use layers::{
    icon::{init_default_icons, legend, marker_icon, IconSpec, IconTheme},
    marker::{MarkerKey, RenderedMarker},
    registry::{MarkerHandle, MarkerRegistry},
};

pub use input::{events::MapEvent, selection::SelectionState};

pub use traits::{MapSurface, RecordingSurface};

pub use ui::{
    overlay::{render_overlays, OverlayInputs, OverlayPanel},
    popup::{resolve_popup, PopupContent, PopupTemplate},
};

#[cfg(feature = "egui")]
pub use ui::surface::EguiSurface;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Surface error: {0}")]
    Surface(String),
}

/// Error type alias for convenience
pub type Error = MapError;
