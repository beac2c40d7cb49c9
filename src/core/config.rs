//! Configuration for the map view
//!
//! `MapConfig` is the caller-supplied configuration object (wire names are
//! camelCase, matching the upstream payload). Default center and zoom are
//! resolved in order: explicit config, environment fallback, then the
//! hardcoded fallback city.

use crate::core::{constants, geo::LatLng};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// An organisational region the console can jump to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgRegion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub center: Option<LatLng>,
    #[serde(default)]
    pub zoom: Option<f64>,
}

/// Caller-supplied map configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(default)]
    pub default_center: Option<LatLng>,
    #[serde(default)]
    pub default_zoom: Option<f64>,
    #[serde(default)]
    pub org_regions: Vec<OrgRegion>,
}

impl MapConfig {
    /// Parses a configuration object from its JSON wire form
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        if let Some(center) = config.default_center {
            if !center.is_finite() {
                return Err(MapError::Config(format!(
                    "defaultCenter must be finite, got {:?}",
                    center
                )));
            }
        }
        Ok(config)
    }

    pub fn with_default_center(mut self, center: LatLng) -> Self {
        self.default_center = Some(center);
        self
    }

    pub fn with_default_zoom(mut self, zoom: f64) -> Self {
        self.default_zoom = Some(zoom);
        self
    }

    pub fn with_region(mut self, region: OrgRegion) -> Self {
        self.org_regions.push(region);
        self
    }

    /// Looks up a region by id or (case-insensitive) name
    pub fn region(&self, key: &str) -> Option<&OrgRegion> {
        self.org_regions
            .iter()
            .find(|r| r.id == key || r.name.eq_ignore_ascii_case(key))
    }
}

/// Where the resolved default view came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsSource {
    Config,
    Environment,
    Fallback,
}

/// The initial center and zoom of the map surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportDefaults {
    pub center: LatLng,
    pub zoom: f64,
    pub source: DefaultsSource,
}

impl ViewportDefaults {
    /// Resolves defaults using the process environment as fallback
    pub fn resolve(config: Option<&MapConfig>) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolves defaults with an injectable environment lookup
    pub fn resolve_with<F>(config: Option<&MapConfig>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_zoom = || {
            env(constants::ENV_DEFAULT_ZOOM)
                .and_then(|z| z.trim().parse::<f64>().ok())
                .filter(|z| z.is_finite())
        };

        if let Some(center) = config
            .and_then(|c| c.default_center)
            .filter(LatLng::is_finite)
        {
            let zoom = config
                .and_then(|c| c.default_zoom)
                .filter(|z| z.is_finite())
                .or_else(env_zoom)
                .unwrap_or(constants::FALLBACK_ZOOM);
            return Self {
                center,
                zoom,
                source: DefaultsSource::Config,
            };
        }

        let parse = |key: &str| env(key).and_then(|v| v.trim().parse::<f64>().ok());
        if let (Some(lat), Some(lng)) = (
            parse(constants::ENV_DEFAULT_LAT),
            parse(constants::ENV_DEFAULT_LNG),
        ) {
            if let Some(center) = LatLng::finite(lat, lng) {
                return Self {
                    center,
                    zoom: env_zoom().unwrap_or(constants::FALLBACK_ZOOM),
                    source: DefaultsSource::Environment,
                };
            }
        }

        let (lat, lng) = constants::FALLBACK_CENTER;
        Self {
            center: LatLng::new(lat, lng),
            zoom: constants::FALLBACK_ZOOM,
            source: DefaultsSource::Fallback,
        }
    }
}

/// Sizing rules for marker icons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyleConfig {
    pub size_px: u32,
    pub highlighted_size_px: u32,
    pub border_px: u32,
    pub highlighted_border_px: u32,
    pub brighten_delta: u8,
}

impl Default for MarkerStyleConfig {
    fn default() -> Self {
        Self {
            size_px: constants::MARKER_SIZE_PX,
            highlighted_size_px: constants::MARKER_SIZE_HIGHLIGHTED_PX,
            border_px: constants::MARKER_BORDER_PX,
            highlighted_border_px: constants::MARKER_BORDER_HIGHLIGHTED_PX,
            brighten_delta: constants::HIGHLIGHT_BRIGHTEN_DELTA,
        }
    }
}
