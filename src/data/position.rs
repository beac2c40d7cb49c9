//! Position resolution for entities of unknown shape
//!
//! Upstream collections encode positions either as a `position: [lat, lng]`
//! tuple or, for event-style records, as `location: { lat, lng }`. Both are
//! accepted; anything else resolves to `None`. No range check is applied, so
//! a latitude of 120.0 still resolves.

use crate::core::geo::LatLng;
use serde_json::Value;

/// Extracts a finite `(lat, lng)` pair from a raw entity
pub fn resolve_position(entity: &Value) -> Option<LatLng> {
    entity
        .get("position")
        .and_then(position_tuple)
        .or_else(|| entity.get("location").and_then(location_object))
}

fn position_tuple(value: &Value) -> Option<LatLng> {
    match value.as_array()?.as_slice() {
        [lat, lng] => LatLng::finite(lat.as_f64()?, lng.as_f64()?),
        _ => None,
    }
}

fn location_object(value: &Value) -> Option<LatLng> {
    let location = value.as_object()?;
    let lat = location.get("lat")?.as_f64()?;
    let lng = location.get("lng")?.as_f64()?;
    LatLng::finite(lat, lng)
}
