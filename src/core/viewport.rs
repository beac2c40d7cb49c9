use crate::{
    core::{
        config::ViewportDefaults,
        constants::{MAX_ZOOM, MIN_ZOOM, SELECTION_ZOOM, TILE_SIZE},
        geo::{LatLng, Point},
    },
    data::entity::MarkerEntity,
    layers::{
        marker::{MarkerKey, RenderedMarker},
        registry::{MarkerHandle, MarkerRegistry},
    },
    traits::{settle, MapSurface},
    ui::popup::resolve_popup,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Center, zoom and pixel size of a map view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// World size in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates (Web Mercator)
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        let scale = self.world_size();
        let lat = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let x = (lat_lng.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
        Point::new(x, y)
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(&self, pixel: &Point) -> LatLng {
        let scale = self.world_size();
        let lng = pixel.x / scale * 360.0 - 180.0;
        let n = PI - 2.0 * PI * pixel.y / scale;
        let lat = n.sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }

    /// Converts geographical coordinates to container pixels
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let offset = self.project(lat_lng).subtract(&self.project(&self.center));
        Point::new(offset.x + self.size.x / 2.0, offset.y + self.size.y / 2.0)
    }

    /// Converts container pixels back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let center = self.project(&self.center);
        let world = Point::new(
            center.x + pixel.x - self.size.x / 2.0,
            center.y + pixel.y - self.size.y / 2.0,
        );
        self.unproject(&world)
    }

    /// Pans by a pixel offset (drag delta)
    pub fn pan(&mut self, delta: Point) {
        let center = self.project(&self.center).subtract(&delta);
        let center = self.unproject(&center);
        self.set_center(center);
    }

    /// Zooms keeping `focus` (container pixels) stationary when given
    pub fn zoom_to(&mut self, zoom: f64, focus: Option<Point>) {
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < 0.001 {
            return;
        }

        match focus {
            Some(focus) => {
                let anchor = self.pixel_to_lat_lng(&focus);
                self.zoom = new_zoom;
                let moved = self.lat_lng_to_pixel(&anchor);
                self.pan(moved.subtract(&focus));
            }
            None => self.zoom = new_zoom,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        let defaults = ViewportDefaults::resolve_with(None, |_| None);
        Self::new(defaults.center, defaults.zoom, Point::new(800.0, 600.0))
    }
}

/// Drives the surface view from defaults and selection changes.
///
/// Commands are dropped while the surface is not ready. A popup request for
/// a marker that has not mounted yet is kept as pending and fulfilled when the
/// marker mounts; a newer selection replaces it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    defaults: ViewportDefaults,
    viewport: Viewport,
    pending_popup: Option<MarkerKey>,
}

impl ViewportController {
    pub fn new(defaults: ViewportDefaults) -> Self {
        Self {
            defaults,
            viewport: Viewport::new(defaults.center, defaults.zoom, Point::new(800.0, 600.0)),
            pending_popup: None,
        }
    }

    pub fn defaults(&self) -> &ViewportDefaults {
        &self.defaults
    }

    /// Last view commanded or observed
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pending_popup(&self) -> Option<&MarkerKey> {
        self.pending_popup.as_ref()
    }

    /// Records a view change made on the surface by the user
    pub fn observe_view(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
    }

    pub fn set_view<S: MapSurface>(&mut self, surface: &mut S, center: LatLng, zoom: f64) -> bool {
        if !surface.is_ready() {
            #[cfg(feature = "debug")]
            log::debug!("dropping set_view({center:?}, {zoom}): surface not ready");
            return false;
        }
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
        settle("set_view", surface.set_view(center, self.viewport.zoom))
    }

    pub fn reset_to_defaults<S: MapSurface>(&mut self, surface: &mut S) -> bool {
        let ViewportDefaults { center, zoom, .. } = self.defaults;
        self.set_view(surface, center, zoom)
    }

    /// Reacts to a selection change: recenter, then open the popup
    pub fn focus<S: MapSurface>(
        &mut self,
        surface: &mut S,
        registry: &MarkerRegistry,
        selected: Option<(&MarkerKey, &MarkerEntity)>,
    ) {
        let Some((key, entity)) = selected else {
            self.pending_popup = None;
            if surface.is_ready() {
                settle("close_popup", surface.close_popup());
            }
            return;
        };

        self.pending_popup = None;
        if !entity.position.is_finite() {
            return;
        }
        if !self.set_view(surface, entity.position, SELECTION_ZOOM) {
            return;
        }
        self.open_popup(surface, registry, key, entity);
    }

    /// Opens the popup now if the marker is mounted, otherwise leaves it pending
    pub fn open_popup<S: MapSurface>(
        &mut self,
        surface: &mut S,
        registry: &MarkerRegistry,
        key: &MarkerKey,
        entity: &MarkerEntity,
    ) -> bool {
        match registry.handle(key) {
            Some(handle) => {
                self.pending_popup = None;
                settle("open_popup", surface.open_popup(handle, &resolve_popup(entity)))
            }
            None => {
                #[cfg(feature = "debug")]
                log::debug!("popup for {key} pending until the marker mounts");
                self.pending_popup = Some(key.clone());
                false
            }
        }
    }

    /// Fulfils a pending popup request when its marker mounts
    pub fn on_marker_mounted<S: MapSurface>(
        &mut self,
        surface: &mut S,
        handle: MarkerHandle,
        marker: &RenderedMarker,
    ) -> bool {
        if self.pending_popup.as_ref() != Some(&marker.key) {
            return false;
        }
        self.pending_popup = None;
        settle("open_popup", surface.open_popup(handle, &resolve_popup(&marker.entity)))
    }

    /// A selected marker that unmounts takes its popup with it; the request
    /// stays pending so the popup returns with the marker. Any other pending
    /// request for the key is forgotten.
    pub fn on_marker_unmounted(&mut self, key: &MarkerKey, selected: bool) {
        if selected {
            self.pending_popup = Some(key.clone());
        } else if self.pending_popup.as_ref() == Some(key) {
            self.pending_popup = None;
        }
    }

    /// Initial view once the surface reports ready
    pub fn on_surface_ready<S: MapSurface>(
        &mut self,
        surface: &mut S,
        registry: &MarkerRegistry,
        selected: Option<(&MarkerKey, &MarkerEntity)>,
    ) {
        match selected {
            Some(selected) => self.focus(surface, registry, Some(selected)),
            None => {
                self.reset_to_defaults(surface);
            }
        }
    }
}
