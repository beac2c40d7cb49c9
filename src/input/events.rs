use crate::{
    core::geo::LatLng,
    data::entity::{MarkerEntity, MarkerId},
    layers::marker::MarkerKey,
};

/// Events fed into the map view by the surface or by the hosting UI
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// One-time signal that the surface accepts imperative commands
    SurfaceReady,
    /// A marker was clicked on the surface
    MarkerClicked { key: MarkerKey },
    /// The user dismissed the open popup
    PopupClosed { key: MarkerKey },
    /// Click on empty map space
    MapClicked { lat_lng: LatLng },
    /// The surface view moved (pan or zoom by the user)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Hover or focus in an external list
    ExternalHighlight { id: Option<MarkerId> },
    /// Selection made in an external list
    ExternalSelect { entity: Option<MarkerEntity> },
}
