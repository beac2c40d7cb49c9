#![cfg(feature = "egui")]

use opsmap::{
    core::config::ViewportDefaults, EguiSurface, EntitySources, LatLng, MapEvent, MapSurface,
    MapView, MarkerKey, MarkerKind,
};
use serde_json::json;

/// Headless frames through a real egui context
mod egui_surface_test {
    use super::*;
    use egui::{Context, Event, PointerButton, Pos2, RawInput, Rect, Vec2};

    fn screen() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    fn input(events: Vec<Event>) -> RawInput {
        RawInput {
            screen_rect: Some(screen()),
            events,
            ..RawInput::default()
        }
    }

    /// Runs one frame and feeds every reported event back into the view
    fn frame(ctx: &Context, view: &mut MapView<EguiSurface>, raw: RawInput) -> Vec<MapEvent> {
        let mut events = Vec::new();
        let _ = ctx.run(raw, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    events = view.surface_mut().show(ui);
                });
        });
        for event in events.clone() {
            view.handle_event(event);
        }
        events
    }

    fn click_at(pos: Pos2) -> Vec<Event> {
        vec![
            Event::PointerMoved(pos),
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed: true,
                modifiers: Default::default(),
            },
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed: false,
                modifiers: Default::default(),
            },
        ]
    }

    fn view_with_client() -> MapView<EguiSurface> {
        let defaults = ViewportDefaults::resolve_with(None, |_| None);
        let mut view = MapView::with_defaults(EguiSurface::new("test-map"), defaults);
        view.set_sources(EntitySources::new().with_all_markers(vec![json!({
            "id": 5,
            "markerType": "client",
            "position": [-26.2041, 28.0473],
            "status": "active",
        })]));
        view
    }

    #[test]
    fn test_first_frame_reports_ready_and_mounts() {
        let ctx = Context::default();
        let mut view = view_with_client();
        assert!(!view.surface().is_ready());
        assert_eq!(view.surface().marker_count(), 0);

        let events = frame(&ctx, &mut view, input(Vec::new()));

        assert!(matches!(events.first(), Some(MapEvent::SurfaceReady)));
        assert!(view.surface().is_ready());
        assert_eq!(view.surface().marker_count(), 1);
        assert_eq!(view.markers().len(), 1);
    }

    #[test]
    fn test_second_frame_is_quiet() {
        let ctx = Context::default();
        let mut view = view_with_client();
        frame(&ctx, &mut view, input(Vec::new()));

        let events = frame(&ctx, &mut view, input(Vec::new()));
        assert!(events.is_empty());
    }

    #[test]
    fn test_click_on_marker_selects_it() {
        let ctx = Context::default();
        let mut view = view_with_client();
        frame(&ctx, &mut view, input(Vec::new()));

        // center the marker so its screen position is known
        view.surface_mut()
            .set_view(LatLng::new(-26.2041, 28.0473), 12.0)
            .unwrap();
        frame(&ctx, &mut view, input(Vec::new()));

        let events = frame(&ctx, &mut view, input(click_at(screen().center())));
        let key = MarkerKey::new("5", MarkerKind::Client);
        assert!(events
            .iter()
            .any(|e| matches!(e, MapEvent::MarkerClicked { key: k } if *k == key)));
        assert_eq!(view.selection().selected_key(), Some(&key));
        assert_eq!(view.surface().viewport().zoom, 15.0);
    }

    #[test]
    fn test_click_on_empty_map_reports_position() {
        let ctx = Context::default();
        let mut view = view_with_client();
        frame(&ctx, &mut view, input(Vec::new()));

        let events = frame(&ctx, &mut view, input(click_at(Pos2::new(700.0, 500.0))));
        assert!(events
            .iter()
            .any(|e| matches!(e, MapEvent::MapClicked { .. })));
        assert!(view.selection().selected_marker().is_none());
    }

    #[test]
    fn test_invalid_view_is_rejected() {
        let mut surface = EguiSurface::new("rejects");
        assert!(surface.set_view(LatLng::new(f64::NAN, 0.0), 5.0).is_err());
        assert!(surface.set_view(LatLng::new(-26.0, 28.0), 5.0).is_ok());
        assert_eq!(surface.viewport().zoom, 5.0);
    }
}
