//! Selection and highlight state
//!
//! Two independent signals: the selected marker (drives popup visibility and
//! recentering) and the highlighted id (visual emphasis only). A marker is
//! emphasized when its id equals the highlighted id or when it is the
//! selected marker.

use crate::{
    data::entity::{MarkerEntity, MarkerId},
    layers::marker::MarkerKey,
};

/// Current phase of the selection machine
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Idle,
    Selected { key: MarkerKey, entity: MarkerEntity },
}

/// Describes what a transition changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<MarkerKey>,
    pub current: Option<MarkerKey>,
}

impl SelectionChange {
    pub fn is_changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    selection: Selection,
    highlighted_marker_id: Option<MarkerId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            selection: Selection::Idle,
            highlighted_marker_id: None,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_marker(&self) -> Option<&MarkerEntity> {
        match &self.selection {
            Selection::Selected { entity, .. } => Some(entity),
            Selection::Idle => None,
        }
    }

    pub fn selected_key(&self) -> Option<&MarkerKey> {
        match &self.selection {
            Selection::Selected { key, .. } => Some(key),
            Selection::Idle => None,
        }
    }

    pub fn highlighted_marker_id(&self) -> Option<&MarkerId> {
        self.highlighted_marker_id.as_ref()
    }

    /// Marker click on the map surface
    pub fn click(&mut self, key: MarkerKey, entity: MarkerEntity) -> SelectionChange {
        self.transition(Selection::Selected { key, entity })
    }

    /// Selection driven from outside the map (a list row, a search result)
    pub fn select(&mut self, selected: Option<(MarkerKey, MarkerEntity)>) -> SelectionChange {
        let next = match selected {
            Some((key, entity)) => Selection::Selected { key, entity },
            None => Selection::Idle,
        };
        self.transition(next)
    }

    /// Replaces the selected entity with fresher data for the same key.
    ///
    /// Returns true when the stored entity changed.
    pub fn refresh(&mut self, key: &MarkerKey, fresh: &MarkerEntity) -> bool {
        match &mut self.selection {
            Selection::Selected { key: selected, entity } if selected == key && entity != fresh => {
                *entity = fresh.clone();
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        self.transition(Selection::Idle)
    }

    /// Changes the emphasis signal only; returns whether it changed
    pub fn set_highlighted(&mut self, id: Option<MarkerId>) -> bool {
        if self.highlighted_marker_id == id {
            return false;
        }
        self.highlighted_marker_id = id;
        true
    }

    pub fn is_selected(&self, key: &MarkerKey) -> bool {
        self.selected_key().is_some_and(|selected| selected == key)
    }

    pub fn is_highlighted(&self, key: &MarkerKey) -> bool {
        self.highlighted_marker_id.as_ref() == Some(&key.id) || self.is_selected(key)
    }

    /// Popup visibility rule: only the selected marker shows its popup
    pub fn popup_visible_for(&self, key: &MarkerKey) -> bool {
        self.is_selected(key)
    }

    fn transition(&mut self, next: Selection) -> SelectionChange {
        let previous = self.selected_key().cloned();
        self.selection = next;
        SelectionChange {
            previous,
            current: self.selected_key().cloned(),
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::data::entity::{Client, Competitor, EntityDetails, MarkerKind};

    fn client(id: &str) -> MarkerEntity {
        let position = LatLng::new(-26.2041, 28.0473);
        MarkerEntity::new(id, position, EntityDetails::Client(Client::default()))
    }

    #[test]
    fn test_click_selects_and_clear_returns_to_idle() {
        let mut state = SelectionState::new();
        assert_eq!(state.selection(), &Selection::Idle);

        let entity = client("5");
        let change = state.click(MarkerKey::of(&entity), entity.clone());
        assert!(change.is_changed());
        assert_eq!(change.previous, None);
        assert_eq!(state.selected_marker(), Some(&entity));

        let change = state.clear_selection();
        assert_eq!(change.previous, Some(MarkerKey::of(&entity)));
        assert_eq!(change.current, None);
        assert!(state.selected_marker().is_none());
    }

    #[test]
    fn test_reclick_same_marker_is_not_a_change() {
        let mut state = SelectionState::new();
        let entity = client("5");
        state.click(MarkerKey::of(&entity), entity.clone());
        assert!(!state.click(MarkerKey::of(&entity), entity).is_changed());
    }

    #[test]
    fn test_highlight_does_not_touch_selection() {
        let mut state = SelectionState::new();
        let entity = client("5");
        state.select(Some((MarkerKey::of(&entity), entity.clone())));

        assert!(state.set_highlighted(Some(MarkerId::from("9"))));
        assert!(!state.set_highlighted(Some(MarkerId::from("9"))));
        assert_eq!(state.selected_marker(), Some(&entity));

        let other = MarkerKey::new("9", MarkerKind::Competitor);
        assert!(state.is_highlighted(&other));
        assert!(state.is_highlighted(&MarkerKey::of(&entity)));
        assert!(!state.popup_visible_for(&other));
        assert!(state.popup_visible_for(&MarkerKey::of(&entity)));
    }

    #[test]
    fn test_highlight_matches_id_across_kinds() {
        let mut state = SelectionState::new();
        state.set_highlighted(Some(MarkerId::from("3")));
        assert!(state.is_highlighted(&MarkerKey::new("3", MarkerKind::Client)));
        assert!(state.is_highlighted(&MarkerKey::new("3", MarkerKind::Competitor)));
        assert!(!state.is_highlighted(&MarkerKey::new("4", MarkerKind::Client)));
    }

    #[test]
    fn test_selection_is_keyed_by_kind() {
        let mut state = SelectionState::new();
        let client = client("3");
        state.select(Some((MarkerKey::of(&client), client)));

        let competitor = MarkerEntity::new(
            "3",
            LatLng::new(-25.0, 27.0),
            EntityDetails::Competitor(Competitor::default()),
        );
        assert!(!state.popup_visible_for(&MarkerKey::of(&competitor)));
        assert!(state
            .select(Some((MarkerKey::of(&competitor), competitor)))
            .is_changed());
    }

    #[test]
    fn test_refresh_replaces_selected_entity_only() {
        let mut state = SelectionState::new();
        let stale = client("5");
        let key = MarkerKey::of(&stale);
        state.click(key.clone(), stale.clone());

        let mut fresh = stale.clone();
        fresh.position = LatLng::new(-25.0, 27.0);
        assert!(!state.refresh(&MarkerKey::new("6", MarkerKind::Client), &fresh));
        assert!(!state.refresh(&key.clone().with_occurrence(1), &fresh));
        assert!(state.refresh(&key, &fresh));
        assert!(!state.refresh(&key, &fresh));
        assert_eq!(state.selected_marker(), Some(&fresh));
    }
}
