//! Fixed analytics panels drawn over the map
//!
//! Pure formatting over upstream aggregates. The GPS panel shows whenever it
//! is enabled and data is present; the route panel additionally needs at least
//! one optimised worker.

use crate::data::analytics::{AnalyticsSummary, GpsAnalysis, RouteOptimizations};

/// Inputs controlling which panels appear
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayInputs {
    pub gps_analysis: Option<GpsAnalysis>,
    pub route_optimizations: Option<RouteOptimizations>,
    pub show_gps_analytics: bool,
    pub show_route_optimizations: bool,
}

impl OverlayInputs {
    pub fn from_summary(summary: &AnalyticsSummary) -> Self {
        Self {
            gps_analysis: summary.gps_analysis,
            route_optimizations: summary.route_optimizations,
            ..Self::default()
        }
    }

    pub fn with_gps(mut self, show: bool) -> Self {
        self.show_gps_analytics = show;
        self
    }

    pub fn with_routes(mut self, show: bool) -> Self {
        self.show_route_optimizations = show;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    GpsAnalysis,
    RouteOptimization,
}

/// Screen corner a panel is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAnchor {
    TopRight,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPanel {
    pub kind: OverlayKind,
    pub title: &'static str,
    pub anchor: OverlayAnchor,
    pub rows: Vec<(&'static str, String)>,
}

impl OverlayPanel {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

fn one_decimal(value: f64) -> String {
    format!("{value:.1}")
}

pub fn gps_panel(gps: &GpsAnalysis) -> OverlayPanel {
    OverlayPanel {
        kind: OverlayKind::GpsAnalysis,
        title: "GPS Analysis",
        anchor: OverlayAnchor::TopRight,
        rows: vec![
            ("Workers", gps.total_workers.to_string()),
            ("Total distance", format!("{} km", one_decimal(gps.total_distance))),
            ("Total stops", gps.total_stops.to_string()),
            ("Avg stops", one_decimal(gps.average_stops)),
            ("Avg speed", format!("{} km/h", one_decimal(gps.average_speed))),
            ("Max speed", format!("{} km/h", one_decimal(gps.max_speed))),
        ],
    }
}

pub fn route_panel(routes: &RouteOptimizations) -> OverlayPanel {
    OverlayPanel {
        kind: OverlayKind::RouteOptimization,
        title: "Route Optimization",
        anchor: OverlayAnchor::BottomRight,
        rows: vec![
            ("Workers optimized", routes.total_workers_optimized.to_string()),
            (
                "Potential saving",
                format!("{} km", one_decimal(routes.total_potential_saving)),
            ),
            (
                "Avg saving",
                format!("{} km", one_decimal(routes.average_potential_saving)),
            ),
        ],
    }
}

pub fn render_overlays(inputs: &OverlayInputs) -> Vec<OverlayPanel> {
    let mut panels = Vec::new();

    if inputs.show_gps_analytics {
        if let Some(gps) = &inputs.gps_analysis {
            panels.push(gps_panel(gps));
        }
    }

    if inputs.show_route_optimizations {
        if let Some(routes) = inputs
            .route_optimizations
            .as_ref()
            .filter(|r| r.has_suggestions())
        {
            panels.push(route_panel(routes));
        }
    }

    panels
}

#[cfg(feature = "egui")]
impl OverlayPanel {
    /// Paints the panel pinned to its corner of `rect`
    pub fn show(&self, ctx: &egui::Context, rect: egui::Rect) {
        let (align, offset) = match self.anchor {
            OverlayAnchor::TopRight => (egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0)),
            OverlayAnchor::BottomRight => (egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -10.0)),
        };
        let pivot = align.pos_in_rect(&rect);

        egui::Area::new(egui::Id::new(("overlay", self.kind)))
            .order(egui::Order::Foreground)
            .pivot(align)
            .fixed_pos(pivot + offset)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.strong(self.title);
                    egui::Grid::new(("overlay-rows", self.kind))
                        .num_columns(2)
                        .show(ui, |ui| {
                            for (label, value) in &self.rows {
                                ui.weak(*label);
                                ui.label(value);
                                ui.end_row();
                            }
                        });
                });
            });
    }
}
