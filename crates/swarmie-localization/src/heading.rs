//! Orientation → compass heading.
//!
//! The inertial sensor reports a quaternion whose yaw grows counter-clockwise.
//! Downstream consumers expect a compass-style heading that grows the other
//! way, so the yaw is mirrored:
//!
//! ```text
//! yaw <  0  →  heading = 360 − (360 + yaw)
//! yaw >= 0  →  heading = 360 − yaw
//! ```
//!
//! # Example
//!
//! ```rust
//! use swarmie_localization::heading::{mirror_yaw, OrientationNormalizer};
//! use swarmie_localization::HeadingWrap;
//! use swarmie_types::{OrientationSample, Quaternion};
//!
//! assert_eq!(mirror_yaw(45.0, HeadingWrap::Normalized), 315.0);
//!
//! let normalizer = OrientationNormalizer::new(HeadingWrap::Normalized);
//! let sample = OrientationSample { orientation: Quaternion::identity() };
//! assert_eq!(normalizer.heading(&sample), 0.0);
//! ```

use swarmie_types::{OrientationSample, Quaternion};

use crate::config::HeadingWrap;

/// Yaw (rotation about Z) of `q` in degrees, in `[-180, 180]`.
///
/// Uses the Z-Y-X Euler decomposition. A non-unit quaternion still yields a
/// finite angle, just not a meaningful one.
pub fn yaw_degrees(q: &Quaternion) -> f64 {
    let siny_cosp = 2.0 * (q.w * q.z + q.x * q.y);
    let cosy_cosp = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    siny_cosp.atan2(cosy_cosp).to_degrees()
}

/// Mirror a mathematical yaw into the compass convention.
pub fn mirror_yaw(yaw_deg: f64, wrap: HeadingWrap) -> f64 {
    let mirrored = if yaw_deg < 0.0 {
        360.0 - (360.0 + yaw_deg)
    } else {
        360.0 - yaw_deg
    };
    match wrap {
        HeadingWrap::Normalized => mirrored.rem_euclid(360.0),
        HeadingWrap::Unclamped => mirrored,
    }
}

/// Converts raw orientation readings into a single heading in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationNormalizer {
    wrap: HeadingWrap,
}

impl OrientationNormalizer {
    pub fn new(wrap: HeadingWrap) -> Self {
        Self { wrap }
    }

    pub fn wrap(&self) -> HeadingWrap {
        self.wrap
    }

    /// Heading of `sample` in degrees.
    pub fn heading(&self, sample: &OrientationSample) -> f64 {
        mirror_yaw(yaw_degrees(&sample.orientation), self.wrap)
    }
}
