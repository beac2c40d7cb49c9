//! Immediate-mode map surface painted with egui.
//!
//! No tiles: the surface draws a graticule under the markers so panning and
//! zooming stay legible. Interaction is reported back as [`MapEvent`]s.

use crate::{
    core::{
        constants::{MAX_ZOOM, MIN_ZOOM},
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::events::MapEvent,
    layers::{marker::RenderedMarker, registry::MarkerHandle},
    prelude::HashMap,
    traits::MapSurface,
    ui::{overlay::OverlayPanel, popup::PopupContent},
    MapError, Result,
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

const BACKGROUND: Color32 = Color32::from_rgb(232, 236, 240);
const GRID: Color32 = Color32::from_rgb(210, 216, 224);

pub struct EguiSurface {
    id: egui::Id,
    viewport: Viewport,
    ready: bool,
    next_handle: u64,
    markers: HashMap<MarkerHandle, RenderedMarker>,
    order: Vec<MarkerHandle>,
    popup: Option<(MarkerHandle, PopupContent)>,
    overlays: Vec<OverlayPanel>,
    show_controls: bool,
    attribution: String,
}

impl EguiSurface {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            id: egui::Id::new(id),
            viewport: Viewport::default(),
            ready: false,
            next_handle: 0,
            markers: HashMap::default(),
            order: Vec::new(),
            popup: None,
            overlays: Vec::new(),
            show_controls: true,
            attribution: String::new(),
        }
    }

    pub fn controls(mut self, show: bool) -> Self {
        self.show_controls = show;
        self
    }

    pub fn attribution(mut self, text: impl Into<String>) -> Self {
        self.attribution = text.into();
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Draws the surface and returns what the user did this frame.
    ///
    /// The first call reports [`MapEvent::SurfaceReady`].
    pub fn show(&mut self, ui: &mut Ui) -> Vec<MapEvent> {
        let mut events = Vec::new();
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.viewport
            .set_size(Point::new(rect.width() as f64, rect.height() as f64));

        if !self.ready {
            self.ready = true;
            events.push(MapEvent::SurfaceReady);
        }

        let mut view_changed = false;

        if response.hovered() {
            let (scroll, pinch) = ui.input(|i| (i.raw_scroll_delta.y, i.zoom_delta()));
            let mut zoom_step = scroll as f64 * 0.002;
            if (pinch - 1.0).abs() > f32::EPSILON {
                zoom_step += (pinch as f64).log2();
            }
            if zoom_step.abs() > 0.001 {
                let focus = response
                    .hover_pos()
                    .map(|pos| to_local(rect, pos));
                self.viewport.zoom_to(self.viewport.zoom + zoom_step, focus);
                view_changed = true;
            }
        }

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.viewport.pan(Point::new(delta.x as f64, delta.y as f64));
                view_changed = true;
            }
        }

        if self.show_controls {
            for (offset, step, label) in [(10.0, 1.0, "+"), (45.0, -1.0, "−")] {
                let min = rect.left_top() + Vec2::new(10.0, offset);
                let button = Rect::from_min_size(min, Vec2::splat(30.0));
                let clicked = ui
                    .interact(button, self.id.with(label), Sense::click())
                    .clicked();
                if clicked {
                    let zoom = (self.viewport.zoom + step).round().clamp(MIN_ZOOM, MAX_ZOOM);
                    self.viewport.zoom_to(zoom, None);
                    view_changed = true;
                }
            }
        }

        let controls =
            Rect::from_min_size(rect.left_top() + Vec2::new(10.0, 10.0), Vec2::new(30.0, 65.0));
        if response.clicked() {
            if let Some(pos) = response
                .interact_pointer_pos()
                .filter(|pos| !(self.show_controls && controls.contains(*pos)))
            {
                match self.hit_test(rect, pos) {
                    Some(handle) => {
                        if let Some(marker) = self.markers.get(&handle) {
                            events.push(MapEvent::MarkerClicked {
                                key: marker.key.clone(),
                            });
                        }
                    }
                    None => {
                        if let Some(event) = self.dismiss_popup() {
                            events.push(event);
                        }
                        let lat_lng = self.viewport.pixel_to_lat_lng(&to_local(rect, pos));
                        events.push(MapEvent::MapClicked { lat_lng });
                    }
                }
            }
        }

        if view_changed {
            events.push(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
            ui.ctx().request_repaint();
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);
        self.paint_graticule(&painter, rect);
        for handle in self.draw_order() {
            if let Some(marker) = self.markers.get(&handle) {
                paint_marker(&painter, self.screen_pos(rect, marker.position()), marker);
            }
        }
        if self.show_controls {
            self.paint_controls(&painter, rect);
        }
        if !self.attribution.is_empty() {
            painter.text(
                rect.left_bottom() + Vec2::new(5.0, -5.0),
                Align2::LEFT_BOTTOM,
                &self.attribution,
                FontId::proportional(10.0),
                Color32::from_gray(120),
            );
        }

        if let Some(event) = self.show_popup(ui.ctx(), rect) {
            events.push(event);
        }
        for panel in &self.overlays {
            panel.show(ui.ctx(), rect);
        }

        events
    }

    fn screen_pos(&self, rect: Rect, lat_lng: LatLng) -> Pos2 {
        let pixel = self.viewport.lat_lng_to_pixel(&lat_lng);
        rect.min + Vec2::new(pixel.x as f32, pixel.y as f32)
    }

    /// Highlighted markers are drawn last so they sit on top
    fn draw_order(&self) -> Vec<MarkerHandle> {
        let (mut top, mut rest): (Vec<_>, Vec<_>) = self
            .order
            .iter()
            .copied()
            .partition(|h| self.markers.get(h).is_some_and(|m| m.highlighted));
        rest.append(&mut top);
        rest
    }

    fn hit_test(&self, rect: Rect, pos: Pos2) -> Option<MarkerHandle> {
        self.draw_order().into_iter().rev().find(|handle| {
            self.markers.get(handle).is_some_and(|marker| {
                let center = self.screen_pos(rect, marker.position());
                center.distance(pos) <= marker.icon.size_px as f32 / 2.0
            })
        })
    }

    fn dismiss_popup(&mut self) -> Option<MapEvent> {
        let (handle, _) = self.popup.take()?;
        let key = self.markers.get(&handle)?.key.clone();
        Some(MapEvent::PopupClosed { key })
    }

    fn show_popup(&mut self, ctx: &egui::Context, rect: Rect) -> Option<MapEvent> {
        let (handle, content) = self.popup.as_ref()?;
        let marker = self.markers.get(handle)?;
        let anchor = self.screen_pos(rect, marker.position());
        if !rect.contains(anchor) {
            return None;
        }

        let mut closed = false;
        egui::Area::new(self.id.with("popup"))
            .order(egui::Order::Foreground)
            .pivot(Align2::CENTER_BOTTOM)
            .fixed_pos(anchor - Vec2::new(0.0, marker.icon.size_px as f32 / 2.0 + 6.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                            closed = ui.small_button("✕").clicked();
                        });
                    });
                    content.show(ui);
                });
            });

        if closed {
            self.dismiss_popup()
        } else {
            None
        }
    }

    fn paint_graticule(&self, painter: &egui::Painter, rect: Rect) {
        let step = 90.0 / 2_f64.powf(self.viewport.zoom.floor());
        let top_left = self.viewport.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let bottom_right = self
            .viewport
            .pixel_to_lat_lng(&Point::new(rect.width() as f64, rect.height() as f64));
        let stroke = Stroke::new(1.0, GRID);

        let mut lng = (top_left.lng / step).floor() * step;
        while lng <= bottom_right.lng {
            let x = self.screen_pos(rect, LatLng::new(0.0, lng)).x;
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            lng += step;
        }

        let mut lat = (bottom_right.lat / step).floor() * step;
        while lat <= top_left.lat {
            let y = self.screen_pos(rect, LatLng::new(lat, 0.0)).y;
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            lat += step;
        }
    }

    fn paint_controls(&self, painter: &egui::Painter, rect: Rect) {
        for (offset, label) in [(10.0, "+"), (45.0, "−")] {
            let min = rect.left_top() + Vec2::new(10.0, offset);
            let button = Rect::from_min_size(min, Vec2::splat(30.0));
            painter.rect_filled(button, 3.0, Color32::from_rgba_unmultiplied(255, 255, 255, 220));
            painter.rect_stroke(button, 3.0, Stroke::new(1.0, Color32::from_gray(100)));
            painter.text(
                button.center(),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(16.0),
                Color32::BLACK,
            );
        }
    }
}

fn to_local(rect: Rect, pos: Pos2) -> Point {
    let local = pos - rect.min;
    Point::new(local.x as f64, local.y as f64)
}

fn paint_marker(painter: &egui::Painter, center: Pos2, marker: &RenderedMarker) {
    let icon = &marker.icon;
    let radius = icon.size_px as f32 / 2.0;
    painter.circle_filled(center, radius, Color32::from(icon.color));
    painter.circle_stroke(
        center,
        radius - icon.border_width_px as f32 / 2.0,
        Stroke::new(icon.border_width_px as f32, Color32::from(icon.border_color)),
    );
    painter.text(
        center,
        Align2::CENTER_CENTER,
        icon.glyph.symbol(),
        FontId::proportional(radius),
        Color32::WHITE,
    );
}

impl MapSurface for EguiSurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        if !center.is_finite() || !zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!("{center:?} @ {zoom}")));
        }
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
        Ok(())
    }

    fn mount_marker(&mut self, marker: &RenderedMarker) -> Result<MarkerHandle> {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(handle, marker.clone());
        self.order.push(handle);
        Ok(handle)
    }

    fn update_marker(&mut self, handle: MarkerHandle, marker: &RenderedMarker) -> Result<()> {
        let slot = self
            .markers
            .get_mut(&handle)
            .ok_or_else(|| MapError::Surface(format!("no marker mounted for {handle:?}")))?;
        *slot = marker.clone();
        Ok(())
    }

    fn unmount_marker(&mut self, handle: MarkerHandle) -> Result<()> {
        self.markers.remove(&handle);
        self.order.retain(|h| *h != handle);
        if matches!(&self.popup, Some((h, _)) if *h == handle) {
            self.popup = None;
        }
        Ok(())
    }

    fn open_popup(&mut self, handle: MarkerHandle, content: &PopupContent) -> Result<()> {
        if !self.markers.contains_key(&handle) {
            return Err(MapError::Surface(format!("no marker mounted for {handle:?}")));
        }
        self.popup = Some((handle, content.clone()));
        Ok(())
    }

    fn close_popup(&mut self) -> Result<()> {
        self.popup = None;
        Ok(())
    }

    fn show_overlays(&mut self, panels: &[OverlayPanel]) -> Result<()> {
        self.overlays = panels.to_vec();
        Ok(())
    }
}
