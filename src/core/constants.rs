//! Core constants for marker styling and viewport behaviour.
//! Keeping them in a single place makes it easier to tweak console-wide magic numbers.

/// Marker icon edge length in pixels.
pub const MARKER_SIZE_PX: u32 = 34;

/// Marker icon edge length while highlighted or selected.
pub const MARKER_SIZE_HIGHLIGHTED_PX: u32 = 42;

/// Icon border width in pixels.
pub const MARKER_BORDER_PX: u32 = 2;

/// Icon border width while highlighted or selected.
pub const MARKER_BORDER_HIGHLIGHTED_PX: u32 = 3;

/// Amount added to each 8-bit channel when brightening a highlighted icon.
pub const HIGHLIGHT_BRIGHTEN_DELTA: u8 = 30;

/// Zoom level used when the viewport recenters on a selected marker.
pub const SELECTION_ZOOM: f64 = 15.0;

/// Fallback map center (Johannesburg) when neither config nor environment provide one.
pub const FALLBACK_CENTER: (f64, f64) = (-26.2041, 28.0473);

/// Fallback zoom level paired with [`FALLBACK_CENTER`].
pub const FALLBACK_ZOOM: f64 = 10.0;

/// Zoom range accepted by the viewport.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Environment variables consulted for the default center and zoom.
pub const ENV_DEFAULT_LAT: &str = "OPSMAP_DEFAULT_LAT";
pub const ENV_DEFAULT_LNG: &str = "OPSMAP_DEFAULT_LNG";
pub const ENV_DEFAULT_ZOOM: &str = "OPSMAP_DEFAULT_ZOOM";

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Placeholder strings used by popup templates for missing optional fields.
pub const NO_ADDRESS: &str = "No address available";
pub const UNKNOWN_STATUS: &str = "Unknown Status";
pub const NOT_AVAILABLE: &str = "N/A";
