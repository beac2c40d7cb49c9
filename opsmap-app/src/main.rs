mod cli;

use anyhow::Context as _;
use clap::Parser;
use cli::Args;
use opsmap::{
    init_default_icons, legend, AnalyticsSummary, EguiSurface, EntitySources, IconTheme, MapConfig,
    MapEvent, MapView, MarkerEntity, MarkerId, MarkerKey, OverlayInputs,
};
use serde_json::{json, Value};
use std::path::Path;

/// Standalone operations map console
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !init_default_icons(IconTheme::default()) {
        log::warn!("icon theme was already initialized");
    }

    let config = args
        .config
        .as_deref()
        .map(|path| -> anyhow::Result<MapConfig> {
            let text = read(path)?;
            Ok(MapConfig::from_json_str(&text)?)
        })
        .transpose()?;
    let sources = match args.entities.as_deref() {
        Some(path) => load_sources(path)?,
        None => demo_sources(),
    };
    let summary = match args.analytics.as_deref() {
        Some(path) => AnalyticsSummary::from_json_str(&read(path)?)?,
        None => demo_analytics(),
    };

    let surface = EguiSurface::new("ops-map")
        .controls(!args.no_controls)
        .attribution("opsmap");
    let mut view = MapView::new(surface, config.as_ref()).on_marker_click(|entity| {
        log::info!("marker clicked: {} ({})", entity.display_name(), entity.kind());
    });
    view.set_sources(sources);

    let mut app = OpsMapApp {
        view,
        summary,
        show_gps: args.gps_overlay,
        show_routes: args.route_overlay,
        show_legend: true,
        hovered: None,
    };
    app.refresh_overlays();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("OpsMap - Operations Console"),
        ..Default::default()
    };

    eframe::run_native("opsmap-app", options, Box::new(|_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("failed to start the console: {e}"))
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Accepts either an entity sources object or a bare array of markers
fn load_sources(path: &Path) -> anyhow::Result<EntitySources> {
    let value: Value = serde_json::from_str(&read(path)?)
        .with_context(|| format!("parsing {}", path.display()))?;
    match value {
        Value::Array(markers) => Ok(EntitySources::new().with_all_markers(markers)),
        other => Ok(serde_json::from_value(other)?),
    }
}

fn demo_sources() -> EntitySources {
    EntitySources::new().with_all_markers(vec![
        json!({
            "id": 1, "markerType": "check-in", "name": "Thabo M.",
            "position": [-26.1952, 28.0340], "jobStatus": "on site",
            "timestamp": "2026-10-19T08:12:00Z",
        }),
        json!({
            "id": 2, "markerType": "breakStart", "name": "Lerato K.",
            "location": {"lat": -26.1076, "lng": 28.0567},
            "breakData": {"startTime": "12:30", "reason": "Lunch"},
        }),
        json!({
            "id": 3, "markerType": "task", "name": "Sipho N.",
            "location": {"lat": -26.1460, "lng": 28.0436},
            "task": {"title": "Stock count", "priority": "high", "status": "in progress"},
        }),
        json!({
            "id": 5, "markerType": "client", "name": "Rosebank Pharmacy",
            "position": [-26.1467, 28.0436], "status": "active",
            "reference": "CL-005", "priceTier": "premium",
            "address": {"street": "12 Baker St", "suburb": "Rosebank", "city": "Johannesburg"},
            "contact": {"name": "Naledi", "phone": "+27 11 555 0101"},
        }),
        json!({
            "id": 6, "markerType": "client", "name": "Sandton Hardware",
            "position": [-26.1080, 28.0560], "status": "inactive",
        }),
        json!({
            "id": 7, "markerType": "competitor", "name": "Midrand Supplies",
            "position": [-25.9992, 28.1263], "threatLevel": "high", "isDirect": true,
        }),
        json!({
            "id": 9, "markerType": "quotation", "quotationNumber": "Q-2026-041",
            "clientName": "Rosebank Pharmacy", "position": [-26.1500, 28.0400],
            "totalAmount": 1520.5, "currency": "ZAR", "status": "pending",
        }),
        json!({
            "id": 11, "markerType": "lead", "name": "Braamfontein Deli",
            "position": [-26.1929, 28.0305],
        }),
    ])
}

fn demo_analytics() -> AnalyticsSummary {
    AnalyticsSummary::from_json_str(
        r#"{
            "gpsAnalysis": {"totalWorkers": 3, "totalDistance": 84.6, "totalStops": 19,
                            "averageStops": 6.3, "averageSpeed": 32.4, "maxSpeed": 88.0},
            "routeOptimizations": {"totalWorkersOptimized": 2, "totalPotentialSaving": 14.2,
                                   "averagePotentialSaving": 7.1}
        }"#,
    )
    .unwrap_or_default()
}

struct OpsMapApp {
    view: MapView<EguiSurface>,
    summary: AnalyticsSummary,
    show_gps: bool,
    show_routes: bool,
    show_legend: bool,
    hovered: Option<MarkerId>,
}

impl OpsMapApp {
    fn overlay_inputs(&self) -> OverlayInputs {
        OverlayInputs::from_summary(&self.summary)
            .with_gps(self.show_gps)
            .with_routes(self.show_routes)
    }

    fn refresh_overlays(&mut self) {
        let inputs = self.overlay_inputs();
        self.view.set_overlays(inputs);
    }

    fn entity_list(&mut self, ui: &mut egui::Ui) {
        let entities: Vec<(MarkerKey, MarkerEntity)> = self
            .view
            .markers()
            .into_iter()
            .map(|m| (m.key.clone(), m.entity.clone()))
            .collect();
        let mut hovered = None;
        let mut clicked = None;

        ui.heading("Entities");
        ui.label(format!("{} on map", entities.len()));
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (key, entity) in &entities {
                let selected = self.view.selection().is_selected(key);
                let response = ui.selectable_label(
                    selected,
                    format!("{}  ·  {}", entity.display_name(), entity.kind()),
                );
                if response.hovered() {
                    hovered = Some(entity.id.clone());
                }
                if response.clicked() {
                    clicked = Some((entity.clone(), selected));
                }
            }
        });

        if hovered != self.hovered {
            self.hovered = hovered.clone();
            self.view.handle_event(MapEvent::ExternalHighlight { id: hovered });
        }
        if let Some((entity, was_selected)) = clicked {
            let entity = (!was_selected).then_some(entity);
            self.view.handle_event(MapEvent::ExternalSelect { entity });
        }
    }

    fn legend_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Legend");
        for entry in legend() {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(entry.glyph.symbol().to_string())
                        .color(egui::Color32::from(entry.color))
                        .strong(),
                );
                ui.label(entry.label);
            });
        }
    }
}

impl eframe::App for OpsMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_legend, "Legend");
                });

                ui.separator();
                let gps = ui.checkbox(&mut self.show_gps, "GPS analysis").changed();
                let routes = ui
                    .checkbox(&mut self.show_routes, "Route optimization")
                    .changed();
                if gps || routes {
                    self.refresh_overlays();
                }

                ui.separator();
                if ui.button("Clear selection").clicked() {
                    self.view.clear_selection();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let viewport = self.view.surface().viewport();
                    ui.label(format!(
                        "Center: {:.4}, {:.4} | Zoom: {:.2}",
                        viewport.center.lat, viewport.center.lng, viewport.zoom
                    ));
                });
            });
        });

        egui::SidePanel::left("entity_panel")
            .resizable(true)
            .show(ctx, |ui| {
                self.entity_list(ui);
                let report = self.view.report();
                if report.dropped() > 0 {
                    ui.separator();
                    ui.label(format!("{} records skipped", report.dropped()));
                }
            });

        if self.show_legend {
            egui::SidePanel::right("legend_panel")
                .resizable(true)
                .show(ctx, |ui| self.legend_panel(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let events = self.view.surface_mut().show(ui);
                for event in events {
                    self.view.handle_event(event);
                }
            });
    }
}
