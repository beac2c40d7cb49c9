//! Prelude module for common opsmap types and traits
//!
//! Re-exports the types most hosts need, for `use opsmap::prelude::*;`

pub use crate::core::{
    config::{DefaultsSource, MapConfig, MarkerStyleConfig, OrgRegion, ViewportDefaults},
    geo::{LatLng, Point},
    map::{MapView, MarkerClickCallback},
    viewport::{Viewport, ViewportController},
};

pub use crate::data::{
    analytics::{AnalyticsSummary, GpsAnalysis, RouteOptimizations},
    entity::{EntityDetails, MarkerEntity, MarkerId, MarkerKind, WorkerKind},
    normalize::{Collection, EntitySources, NormalizeReport, Normalizer},
};

pub use crate::layers::{
    icon::{IconSpec, IconTheme, LegendEntry},
    marker::{MarkerKey, RenderedMarker},
    registry::{MarkerHandle, MarkerRegistry},
};

pub use crate::input::{events::MapEvent, selection::SelectionState};

pub use crate::traits::{MapSurface, RecordingSurface, SurfaceCommand};

pub use crate::ui::{
    overlay::{OverlayInputs, OverlayPanel},
    popup::{PopupContent, PopupTemplate},
    style::HexColor,
};

#[cfg(feature = "egui")]
pub use crate::ui::surface::EguiSurface;

pub use crate::{Error as MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
