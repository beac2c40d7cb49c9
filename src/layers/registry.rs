use crate::{layers::marker::{MarkerKey, RenderedMarker}, prelude::HashMap};

/// Opaque handle a surface hands back when a marker is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Tracks mounted markers, keyed by their stable render key
///
/// Populated synchronously as markers mount and unmount, so opening a popup is
/// a lookup followed by a direct call on the handle.
pub struct MarkerRegistry {
    /// Mounted markers indexed by key
    entries: HashMap<MarkerKey, (MarkerHandle, RenderedMarker)>,
    /// Keys in render order
    render_order: Vec<MarkerKey>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Records a mounted marker; a remount replaces the previous handle
    pub fn insert(&mut self, handle: MarkerHandle, marker: RenderedMarker) -> Option<MarkerHandle> {
        let key = marker.key.clone();
        let previous = self.entries.insert(key.clone(), (handle, marker));
        if previous.is_none() {
            self.render_order.push(key);
        }
        previous.map(|(handle, _)| handle)
    }

    /// Replaces the stored marker for an already mounted key
    pub fn update(&mut self, marker: RenderedMarker) -> Option<MarkerHandle> {
        let entry = self.entries.get_mut(&marker.key)?;
        entry.1 = marker;
        Some(entry.0)
    }

    pub fn remove(&mut self, key: &MarkerKey) -> Option<(MarkerHandle, RenderedMarker)> {
        self.render_order.retain(|k| k != key);
        self.entries.remove(key)
    }

    pub fn handle(&self, key: &MarkerKey) -> Option<MarkerHandle> {
        self.entries.get(key).map(|(handle, _)| *handle)
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&RenderedMarker> {
        self.entries.get(key).map(|(_, marker)| marker)
    }

    pub fn contains(&self, key: &MarkerKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Mounted markers in render order
    pub fn markers(&self) -> Vec<&RenderedMarker> {
        self.render_order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|(_, marker)| marker))
            .collect()
    }

    pub fn keys(&self) -> &[MarkerKey] {
        &self.render_order
    }

    /// Re-sorts render order to follow `order`. Keys not listed keep their
    /// relative order at the end.
    pub fn reorder(&mut self, order: &[MarkerKey]) {
        let position = |key: &MarkerKey| order.iter().position(|k| k == key).unwrap_or(usize::MAX);
        self.render_order.sort_by_key(|key| position(key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::data::entity::{Competitor, EntityDetails, MarkerEntity};
    use crate::layers::icon::icon_for;

    fn marker(id: &str) -> RenderedMarker {
        let entity = MarkerEntity::new(
            id,
            LatLng::new(-25.0, 27.0),
            EntityDetails::Competitor(Competitor::default()),
        );
        RenderedMarker::new(MarkerKey::of(&entity), entity.clone(), icon_for(&entity, false), false)
    }

    #[test]
    fn test_insert_lookup_remove() {
        let mut registry = MarkerRegistry::new();
        assert!(registry.is_empty());

        registry.insert(MarkerHandle(1), marker("a"));
        registry.insert(MarkerHandle(2), marker("b"));

        let key_a = marker("a").key;
        assert_eq!(registry.handle(&key_a), Some(MarkerHandle(1)));
        assert_eq!(registry.handle(&marker("b").key), Some(MarkerHandle(2)));
        assert_eq!(registry.len(), 2);

        let (handle, removed) = registry.remove(&key_a).unwrap();
        assert_eq!(handle, MarkerHandle(1));
        assert_eq!(removed.key, key_a);
        assert!(!registry.contains(&key_a));
        assert_eq!(registry.keys(), &[marker("b").key]);
    }

    #[test]
    fn test_update_keeps_handle() {
        let mut registry = MarkerRegistry::new();
        registry.insert(MarkerHandle(7), marker("a"));

        let mut highlighted = marker("a");
        highlighted.highlighted = true;
        assert_eq!(registry.update(highlighted), Some(MarkerHandle(7)));
        assert!(registry.get(&marker("a").key).unwrap().highlighted);

        assert_eq!(registry.update(marker("zzz")), None);
    }

    #[test]
    fn test_reorder_follows_source_order() {
        let mut registry = MarkerRegistry::new();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            registry.insert(MarkerHandle(i as u64), marker(id));
        }
        registry.reorder(&[marker("c").key, marker("a").key]);

        let ids: Vec<_> = registry.markers().iter().map(|m| m.id().to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
