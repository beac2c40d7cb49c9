//! Upstream analytics aggregates consumed by the overlay panels.
//!
//! These arrive pre-computed; nothing here derives trips, stops or routes.

use serde::{Deserialize, Serialize};

/// Fleet-wide GPS trip summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpsAnalysis {
    pub total_workers: u32,
    /// Kilometres
    pub total_distance: f64,
    pub total_stops: u32,
    pub average_stops: f64,
    /// km/h
    pub average_speed: f64,
    /// km/h
    pub max_speed: f64,
}

/// Route optimisation suggestions summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptimizations {
    pub total_workers_optimized: u32,
    /// Kilometres saved across all optimised routes
    pub total_potential_saving: f64,
    pub average_potential_saving: f64,
}

impl RouteOptimizations {
    pub fn has_suggestions(&self) -> bool {
        self.total_workers_optimized > 0
    }
}

/// Both aggregates as delivered by the analytics service
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSummary {
    pub gps_analysis: Option<GpsAnalysis>,
    pub route_optimizations: Option<RouteOptimizations>,
}

impl AnalyticsSummary {
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
