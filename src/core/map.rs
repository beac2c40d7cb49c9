use crate::{
    core::{
        config::{MapConfig, ViewportDefaults},
        viewport::ViewportController,
    },
    data::{
        entity::{MarkerEntity, MarkerId, MarkerKind},
        normalize::{EntitySources, NormalizeReport, Normalizer},
    },
    input::{
        events::MapEvent,
        selection::{SelectionChange, SelectionState},
    },
    layers::{
        icon::icon_for,
        marker::{MarkerKey, RenderedMarker},
        registry::MarkerRegistry,
    },
    prelude::HashMap,
    traits::{settle, MapSurface},
    ui::overlay::{render_overlays, OverlayInputs, OverlayPanel},
};

/// Invoked with the clicked entity; what happens next is up to the caller
pub type MarkerClickCallback = Box<dyn FnMut(&MarkerEntity)>;

/// Ties the data pipeline, selection state and viewport to one surface.
///
/// All imperative work goes through the [`MapSurface`]; nothing is issued
/// before the surface reports ready, and surface failures are logged rather
/// than propagated.
pub struct MapView<S: MapSurface> {
    surface: S,
    normalizer: Normalizer,
    registry: MarkerRegistry,
    selection: SelectionState,
    viewport: ViewportController,
    overlays: OverlayInputs,
    on_marker_click: Option<MarkerClickCallback>,
    ready_seen: bool,
}

impl<S: MapSurface> MapView<S> {
    pub fn new(surface: S, config: Option<&MapConfig>) -> Self {
        Self::with_defaults(surface, ViewportDefaults::resolve(config))
    }

    pub fn with_defaults(surface: S, defaults: ViewportDefaults) -> Self {
        Self {
            surface,
            normalizer: Normalizer::default(),
            registry: MarkerRegistry::new(),
            selection: SelectionState::new(),
            viewport: ViewportController::new(defaults),
            overlays: OverlayInputs::default(),
            on_marker_click: None,
            ready_seen: false,
        }
    }

    pub fn on_marker_click<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&MarkerEntity) + 'static,
    {
        self.on_marker_click = Some(Box::new(callback));
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Mounted markers in source order
    pub fn markers(&self) -> Vec<&RenderedMarker> {
        self.registry.markers()
    }

    pub fn sources(&self) -> &EntitySources {
        self.normalizer.sources()
    }

    /// Diagnostics of the current normalization
    pub fn report(&mut self) -> NormalizeReport {
        self.normalizer.normalized().report
    }

    /// Position-valid entities of the current sources, mounted or not
    pub fn entities(&mut self) -> &[MarkerEntity] {
        &self.normalizer.normalized().markers
    }

    pub fn set_sources(&mut self, sources: EntitySources) {
        self.normalizer.set_sources(sources);
        self.sync();
    }

    pub fn update_sources<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EntitySources),
    {
        self.normalizer.update_sources(f);
        self.sync();
    }

    pub fn set_overlays(&mut self, overlays: OverlayInputs) {
        self.overlays = overlays;
        self.push_overlays();
    }

    pub fn overlay_panels(&self) -> Vec<OverlayPanel> {
        render_overlays(&self.overlays)
    }

    pub fn set_highlighted(&mut self, id: Option<MarkerId>) {
        if self.selection.set_highlighted(id) {
            self.sync();
        }
    }

    /// External selection; `None` clears it
    pub fn select(&mut self, entity: Option<MarkerEntity>) {
        let selected = entity.map(|entity| (self.key_of(&entity), entity));
        let change = self.selection.select(selected);
        self.apply_selection_change(change);
    }

    /// Key an entity renders under. Repeated `(id, kind)` pairs are told
    /// apart by equality, so an externally selected duplicate keeps its own
    /// occurrence.
    fn key_of(&mut self, entity: &MarkerEntity) -> MarkerKey {
        let key = MarkerKey::of(entity);
        let occurrence = self
            .normalizer
            .normalized()
            .markers
            .iter()
            .filter(|m| m.id == key.id && m.kind() == key.kind)
            .position(|m| m == entity)
            .unwrap_or(0);
        key.with_occurrence(occurrence as u32)
    }

    pub fn clear_selection(&mut self) {
        let change = self.selection.clear_selection();
        self.apply_selection_change(change);
    }

    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::SurfaceReady => self.on_surface_ready(),
            MapEvent::MarkerClicked { key } => self.on_marker_clicked(key),
            MapEvent::PopupClosed { key } => {
                if self.selection.is_selected(&key) {
                    self.clear_selection();
                }
            }
            MapEvent::MapClicked { .. } => {}
            MapEvent::ViewChanged { center, zoom } => self.viewport.observe_view(center, zoom),
            MapEvent::ExternalHighlight { id } => self.set_highlighted(id),
            MapEvent::ExternalSelect { entity } => self.select(entity),
        }
    }

    /// Reconciles the mounted markers with the current sources and selection
    pub fn sync(&mut self) {
        if !self.surface.is_ready() {
            return;
        }

        let desired = {
            let normalized = self.normalizer.normalized();
            build_markers(&normalized.markers, &self.selection)
        };

        let stale: Vec<MarkerKey> = self
            .registry
            .keys()
            .iter()
            .filter(|key| !desired.iter().any(|m| &m.key == *key))
            .cloned()
            .collect();
        for key in stale {
            if let Some((handle, _)) = self.registry.remove(&key) {
                settle("unmount_marker", self.surface.unmount_marker(handle));
                let selected = self.selection.is_selected(&key);
                self.viewport.on_marker_unmounted(&key, selected);
            }
        }

        let order: Vec<MarkerKey> = desired.iter().map(|m| m.key.clone()).collect();
        for marker in desired {
            let current = self
                .registry
                .get(&marker.key)
                .map(|current| (*current == marker, current.entity == marker.entity));
            match current {
                Some((true, _)) => {}
                Some((false, same_entity)) => {
                    if let Some(handle) = self.registry.handle(&marker.key) {
                        settle("update_marker", self.surface.update_marker(handle, &marker));
                        let key = marker.key.clone();
                        let refreshed = self.selection.refresh(&key, &marker.entity);
                        self.registry.update(marker);
                        if refreshed && !same_entity {
                            self.reopen_popup(&key);
                        }
                    }
                }
                None => match self.surface.mount_marker(&marker) {
                    Ok(handle) => {
                        self.selection.refresh(&marker.key, &marker.entity);
                        self.viewport
                            .on_marker_mounted(&mut self.surface, handle, &marker);
                        self.registry.insert(handle, marker);
                    }
                    Err(_err) => {
                        #[cfg(feature = "debug")]
                        log::warn!("failed to mount marker {}: {_err}", marker.key);
                    }
                },
            }
        }
        self.registry.reorder(&order);
    }

    /// Rebuilds the open popup of the selected marker from its current data
    fn reopen_popup(&mut self, key: &MarkerKey) {
        if let Some(entity) = self.selection.selected_marker() {
            self.viewport
                .open_popup(&mut self.surface, &self.registry, key, entity);
        }
    }

    fn on_surface_ready(&mut self) {
        if self.ready_seen {
            return;
        }
        self.ready_seen = true;

        #[cfg(feature = "debug")]
        log::debug!("map surface ready");

        self.sync();
        let selected = self
            .selection
            .selected_key()
            .zip(self.selection.selected_marker());
        self.viewport
            .on_surface_ready(&mut self.surface, &self.registry, selected);
        self.push_overlays();
    }

    fn on_marker_clicked(&mut self, key: MarkerKey) {
        let Some(entity) = self.registry.get(&key).map(|m| m.entity.clone()) else {
            #[cfg(feature = "debug")]
            log::debug!("click on unknown marker {key}");
            return;
        };

        if let Some(callback) = self.on_marker_click.as_mut() {
            callback(&entity);
        }
        let change = self.selection.click(key, entity);
        self.apply_selection_change(change);
    }

    fn apply_selection_change(&mut self, change: SelectionChange) {
        if !change.is_changed() {
            return;
        }
        self.sync();
        let selected = self
            .selection
            .selected_key()
            .zip(self.selection.selected_marker());
        self.viewport.focus(&mut self.surface, &self.registry, selected);
    }

    fn push_overlays(&mut self) {
        if self.surface.is_ready() {
            let panels = render_overlays(&self.overlays);
            settle("show_overlays", self.surface.show_overlays(&panels));
        }
    }
}

/// Builds render-ready markers with stable, occurrence-numbered keys
pub fn build_markers(entities: &[MarkerEntity], selection: &SelectionState) -> Vec<RenderedMarker> {
    let mut seen: HashMap<(MarkerId, MarkerKind), u32> = HashMap::default();
    entities
        .iter()
        .map(|entity| {
            let count = seen.entry((entity.id.clone(), entity.kind())).or_insert(0);
            let key = MarkerKey::of(entity).with_occurrence(*count);
            *count += 1;

            let highlighted = selection.is_highlighted(&key);
            RenderedMarker::new(key, entity.clone(), icon_for(entity, highlighted), highlighted)
        })
        .collect()
}
