use crate::{
    core::geo::LatLng,
    data::entity::{MarkerEntity, MarkerId, MarkerKind},
    layers::icon::IconSpec,
};
use std::fmt;

/// Stable render identity of a marker.
///
/// `(id, kind)` is unique in well-formed data; `occurrence` numbers repeated
/// keys in source order so undeduplicated duplicates still render separately
/// without random keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub occurrence: u32,
}

impl MarkerKey {
    pub fn new(id: impl Into<MarkerId>, kind: MarkerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            occurrence: 0,
        }
    }

    /// Key of the first occurrence of an entity
    pub fn of(entity: &MarkerEntity) -> Self {
        Self::new(entity.id.clone(), entity.kind())
    }

    pub fn with_occurrence(mut self, occurrence: u32) -> Self {
        self.occurrence = occurrence;
        self
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.occurrence == 0 {
            write!(f, "{}:{}", self.kind, self.id)
        } else {
            write!(f, "{}:{}#{}", self.kind, self.id, self.occurrence)
        }
    }
}

/// A marker ready for the surface: entity, position and resolved icon
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub key: MarkerKey,
    pub entity: MarkerEntity,
    pub icon: IconSpec,
    pub highlighted: bool,
}

impl RenderedMarker {
    pub fn new(key: MarkerKey, entity: MarkerEntity, icon: IconSpec, highlighted: bool) -> Self {
        Self {
            key,
            entity,
            icon,
            highlighted,
        }
    }

    pub fn position(&self) -> LatLng {
        self.entity.position
    }

    pub fn id(&self) -> &MarkerId {
        &self.key.id
    }
}
