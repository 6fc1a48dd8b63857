//! Flat-Earth projection of a geodetic fix onto the local tangent plane.
//!
//! ```text
//! x_m = (lon − origin.lon) · lon_meters_per_degree
//! y_m = (lat − origin.lat) · lat_meters_per_degree
//! ```
//!
//! This is not a geodesic projection. The scale factors are fixed for one
//! latitude band (see [`ProjectionConfig`]) and the error grows with distance
//! from the origin, so it is only fit for short-range local operation.

use swarmie_types::{Origin, PositionSample};

use crate::config::ProjectionConfig;

/// Metric displacement from the origin (x east, y north).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalDisplacement {
    pub x_m: f64,
    pub y_m: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProjector {
    config: ProjectionConfig,
}

impl LocalProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn project(&self, fix: &PositionSample, origin: &Origin) -> LocalDisplacement {
        LocalDisplacement {
            x_m: (fix.longitude - origin.x) * self.config.lon_meters_per_degree,
            y_m: (fix.latitude - origin.y) * self.config.lat_meters_per_degree,
        }
    }
}
