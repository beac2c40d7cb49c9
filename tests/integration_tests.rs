use opsmap::{
    core::config::ViewportDefaults,
    data::normalize::Collection,
    traits::SurfaceCommand,
    ui::style::HexColor,
    EntitySources, LatLng, MapEvent, MapView, MarkerEntity, MarkerId, MarkerKey, MarkerKind,
    EntityDetails, OverlayInputs, PopupTemplate, RecordingSurface, RouteOptimizations,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Drives `MapView` end to end against the recording surface
mod integration_tests {
    use super::*;

    fn fallback_defaults() -> ViewportDefaults {
        ViewportDefaults::resolve_with(None, |_| None)
    }

    /// A view whose surface has already reported ready
    fn ready_view(sources: EntitySources) -> MapView<RecordingSurface> {
        let mut view = MapView::with_defaults(RecordingSurface::new(), fallback_defaults());
        view.set_sources(sources);
        view.surface_mut().set_ready(true);
        view.handle_event(MapEvent::SurfaceReady);
        view.surface_mut().take_commands();
        view
    }

    fn scenario_client() -> serde_json::Value {
        json!({
            "id": 5,
            "markerType": "client",
            "position": [-26.2041, 28.0473],
            "status": "active",
            "reference": "CL-005",
            "name": "Rosebank Pharmacy",
        })
    }

    fn is_popup(command: &SurfaceCommand, expected: &str) -> bool {
        matches!(command, SurfaceCommand::OpenPopup { title, .. } if title == expected)
    }

    fn marker_color(view: &MapView<RecordingSurface>, key: &MarkerKey) -> HexColor {
        view.registry().get(key).unwrap().icon.color
    }

    #[test]
    fn test_active_client_marker_and_popup() {
        let view = ready_view(EntitySources::new().with_all_markers(vec![scenario_client()]));
        let key = MarkerKey::new("5", MarkerKind::Client);

        assert_eq!(marker_color(&view, &key).to_hex(), "#06b6d4");

        let entity = &view.registry().get(&key).unwrap().entity;
        let popup = opsmap::resolve_popup(entity);
        assert_eq!(popup.template, PopupTemplate::Client);
        let info = popup.section("Client Information").unwrap();
        assert_eq!(info.value("Reference"), Some("CL-005"));
        assert_eq!(popup.badges[0].label, "active");
    }

    #[test]
    fn test_highlighted_competitor_is_brightened() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![json!({
            "id": 7,
            "markerType": "competitor",
            "position": [-25.0, 27.0],
        })]));
        let key = MarkerKey::new("7", MarkerKind::Competitor);
        assert_eq!(marker_color(&view, &key).to_hex(), "#ef4444");

        view.handle_event(MapEvent::ExternalHighlight {
            id: Some(MarkerId::from("7")),
        });

        let marker = view.registry().get(&key).unwrap();
        assert!(marker.highlighted);
        assert_eq!(marker.icon.color.to_hex(), "#ff6262");
        assert_eq!(marker.icon.size_px, 42);
        assert_eq!(marker.icon.border_width_px, 3);
        assert!(view.selection().selected_marker().is_none());
        assert!(matches!(
            view.surface().commands(),
            [SurfaceCommand::Update { highlighted: true, .. }]
        ));
    }

    #[test]
    fn test_positionless_quotation_is_excluded() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![
            json!({"id": 9, "markerType": "quotation"}),
            scenario_client(),
        ]));

        assert_eq!(view.markers().len(), 1);
        assert!(!view
            .registry()
            .contains(&MarkerKey::new("9", MarkerKind::Quotation)));
        let report = view.report();
        assert_eq!(report.unresolved_position, 1);
        assert_eq!(report.accepted(), 1);
    }

    #[test]
    fn test_selection_recenters_then_opens_popup() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![scenario_client()]));
        let entity = MarkerEntity::from_value(&scenario_client(), None).unwrap();

        view.select(Some(entity));

        let commands = view.surface().commands();
        let set_view = commands
            .iter()
            .position(|c| {
                *c == SurfaceCommand::SetView {
                    center: LatLng::new(-26.2041, 28.0473),
                    zoom: 15.0,
                }
            })
            .expect("recenter command");
        let popup = commands
            .iter()
            .position(|c| is_popup(c, "Rosebank Pharmacy"))
            .expect("popup command");
        assert!(set_view < popup);
        assert!(view.viewport().pending_popup().is_none());
    }

    #[test]
    fn test_route_panel_hidden_when_nothing_optimized() {
        let mut view = ready_view(EntitySources::new());
        view.set_overlays(OverlayInputs {
            route_optimizations: Some(RouteOptimizations {
                total_workers_optimized: 0,
                ..RouteOptimizations::default()
            }),
            show_route_optimizations: true,
            ..OverlayInputs::default()
        });

        assert!(view.overlay_panels().is_empty());
        assert_eq!(
            view.surface().commands(),
            &[SurfaceCommand::ShowOverlays { titles: vec![] }]
        );
    }

    #[test]
    fn test_shared_id_across_kinds_renders_twice() {
        let sources = EntitySources::new()
            .with_collection(
                Collection::Clients,
                vec![json!({"id": 3, "position": [-26.0, 28.0]})],
            )
            .with_collection(
                Collection::Competitors,
                vec![json!({"id": 3, "position": [-26.1, 28.1]})],
            );
        let view = ready_view(sources);

        let keys: Vec<_> = view.markers().iter().map(|m| m.key.to_string()).collect();
        assert_eq!(keys, vec!["client:3", "competitor:3"]);
    }

    #[test]
    fn test_filtered_entities_take_precedence() {
        let sources = EntitySources::new()
            .with_filtered(vec![
                json!({"id": "f1", "markerType": "lead", "position": [-26.0, 28.0]}),
                json!({"id": "f2", "markerType": "lead", "position": [f64::NAN, 28.0]}),
            ])
            .with_all_markers(vec![scenario_client()])
            .with_collection(
                Collection::Workers,
                vec![json!({"id": 1, "position": [-26.0, 28.0]})],
            );
        let view = ready_view(sources);

        let ids: Vec<_> = view.markers().iter().map(|m| m.id().to_string()).collect();
        assert_eq!(ids, vec!["f1"]);
    }

    #[test]
    fn test_encodings_resolve_to_same_marker_position() {
        let view = ready_view(EntitySources::new().with_all_markers(vec![
            json!({"id": 1, "markerType": "check-in", "position": [-26.5, 28.25]}),
            json!({"id": 2, "markerType": "check-in", "location": {"lat": -26.5, "lng": 28.25}}),
        ]));

        let positions: Vec<_> = view.markers().iter().map(|m| m.position()).collect();
        assert_eq!(positions[0], positions[1]);
    }

    #[test]
    fn test_commands_before_ready_are_dropped() {
        let mut view = MapView::with_defaults(RecordingSurface::new(), fallback_defaults());
        view.set_sources(EntitySources::new().with_all_markers(vec![scenario_client()]));
        view.select(MarkerEntity::from_value(&scenario_client(), None).ok());

        assert!(view.surface().commands().is_empty());
        assert!(view.selection().selected_marker().is_some());

        // readiness re-derives view and popup from current state
        view.surface_mut().set_ready(true);
        view.handle_event(MapEvent::SurfaceReady);
        assert_eq!(
            view.surface().last_view(),
            Some((LatLng::new(-26.2041, 28.0473), 15.0))
        );
        assert!(view
            .surface()
            .commands()
            .iter()
            .any(|c| matches!(c, SurfaceCommand::OpenPopup { .. })));
    }

    #[test]
    fn test_marker_click_invokes_callback_and_selects() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicked);

        let mut view = MapView::with_defaults(RecordingSurface::ready(), fallback_defaults())
            .on_marker_click(move |entity| sink.borrow_mut().push(entity.id.to_string()));
        view.set_sources(EntitySources::new().with_all_markers(vec![scenario_client()]));

        let key = MarkerKey::new("5", MarkerKind::Client);
        view.handle_event(MapEvent::MarkerClicked { key: key.clone() });

        assert_eq!(clicked.borrow().as_slice(), ["5".to_string()]);
        assert_eq!(view.selection().selected_key(), Some(&key));
        assert!(view.registry().get(&key).unwrap().highlighted);

        view.handle_event(MapEvent::PopupClosed { key: key.clone() });
        assert!(view.selection().selected_marker().is_none());
        assert!(!view.registry().get(&key).unwrap().highlighted);
    }

    #[test]
    fn test_click_on_unknown_marker_is_ignored() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![scenario_client()]));
        view.handle_event(MapEvent::MarkerClicked {
            key: MarkerKey::new("404", MarkerKind::Client),
        });
        assert!(view.selection().selected_marker().is_none());
        assert!(view.surface().commands().is_empty());
    }

    #[test]
    fn test_pending_popup_opens_when_marker_arrives() {
        let mut view = ready_view(EntitySources::new());
        let entity = MarkerEntity::from_value(&scenario_client(), None).unwrap();

        view.handle_event(MapEvent::ExternalSelect {
            entity: Some(entity),
        });
        assert_eq!(
            view.viewport().pending_popup(),
            Some(&MarkerKey::new("5", MarkerKind::Client))
        );

        view.surface_mut().take_commands();
        view.set_sources(EntitySources::new().with_all_markers(vec![scenario_client()]));

        assert!(view.viewport().pending_popup().is_none());
        let commands = view.surface().commands();
        assert!(matches!(commands[0], SurfaceCommand::Mount { highlighted: true, .. }));
        assert!(is_popup(&commands[1], "Rosebank Pharmacy"));
    }

    #[test]
    fn test_removed_markers_are_unmounted() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![
            scenario_client(),
            json!({"id": 7, "markerType": "competitor", "position": [-25.0, 27.0]}),
        ]));

        view.update_sources(|sources| {
            if let Some(markers) = sources.all_markers.as_mut() {
                markers.truncate(1);
            }
        });

        assert_eq!(view.markers().len(), 1);
        assert!(matches!(
            view.surface().commands(),
            [SurfaceCommand::Unmount { .. }]
        ));
    }

    #[test]
    fn test_selected_marker_popup_returns_after_remount() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![scenario_client()]));
        let key = MarkerKey::new("5", MarkerKind::Client);
        view.handle_event(MapEvent::MarkerClicked { key: key.clone() });

        view.set_sources(EntitySources::new());
        assert_eq!(view.viewport().pending_popup(), Some(&key));
        view.surface_mut().take_commands();

        view.set_sources(EntitySources::new().with_all_markers(vec![scenario_client()]));

        let commands = view.surface().commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], SurfaceCommand::Mount { highlighted: true, .. }));
        assert!(is_popup(&commands[1], "Rosebank Pharmacy"));
        assert!(view.viewport().pending_popup().is_none());
        assert_eq!(view.selection().selected_key(), Some(&key));
    }

    #[test]
    fn test_selected_entity_data_change_refreshes_popup() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![scenario_client()]));
        let key = MarkerKey::new("5", MarkerKind::Client);
        view.handle_event(MapEvent::MarkerClicked { key: key.clone() });
        view.surface_mut().take_commands();

        let mut inactive = scenario_client();
        inactive["status"] = json!("inactive");
        view.set_sources(EntitySources::new().with_all_markers(vec![inactive]));

        let commands = view.surface().commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            &commands[0],
            SurfaceCommand::Update { key: k, highlighted: true, .. } if *k == key
        ));
        assert!(is_popup(&commands[1], "Rosebank Pharmacy"));

        let selected = view.selection().selected_marker().unwrap();
        match &selected.details {
            EntityDetails::Client(client) => assert_eq!(client.status.as_deref(), Some("inactive")),
            other => panic!("unexpected details {other:?}"),
        }
        assert_eq!(view.registry().get(&key).unwrap().entity, *selected);
    }

    #[test]
    fn test_external_select_keeps_duplicate_occurrence() {
        let mut view = ready_view(EntitySources::new().with_all_markers(vec![
            json!({"id": 3, "markerType": "client", "position": [-26.1, 28.0]}),
            json!({"id": 3, "markerType": "client", "position": [-25.9, 28.3]}),
        ]));
        let first = MarkerKey::new("3", MarkerKind::Client);
        let second = first.clone().with_occurrence(1);
        let entity = view.entities()[1].clone();

        view.handle_event(MapEvent::ExternalSelect {
            entity: Some(entity),
        });

        assert_eq!(view.selection().selected_key(), Some(&second));
        assert!(!view.selection().is_selected(&first));
        assert!(view.registry().get(&second).unwrap().highlighted);
        assert!(!view.registry().get(&first).unwrap().highlighted);
        assert_eq!(
            view.surface().last_view(),
            Some((LatLng::new(-25.9, 28.3), 15.0))
        );
        let handle = view.registry().handle(&second).unwrap();
        assert!(view
            .surface()
            .commands()
            .iter()
            .any(|c| matches!(c, SurfaceCommand::OpenPopup { handle: h, .. } if *h == handle)));
    }
}
