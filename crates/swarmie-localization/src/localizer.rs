//! The localization context object.
//!
//! [`Localizer`] owns all mutable state of the core (the origin lock and the
//! six poses) and exposes one handler per sample kind. Each handler runs to
//! completion and returns a [`Handoff`] by value, so callers only ever see
//! snapshots.
//!
//! # Example
//!
//! ```rust
//! use swarmie_localization::Localizer;
//! use swarmie_types::{FixStatus, FrameId, PositionSample};
//!
//! let mut localizer = Localizer::default();
//! let handoff = localizer.handle_position(&PositionSample {
//!     longitude: -80.6,
//!     latitude: 28.5,
//!     status: FixStatus::Fix,
//! });
//!
//! assert!(handoff.origin.unwrap().locked);
//! assert_eq!(handoff.poses[FrameId::Unm].x, 0.0);
//! ```

use swarmie_types::{FramePoses, Handoff, OrientationSample, Origin, PositionSample};
use tracing::{debug, info};

use crate::config::{HeadingWrap, LocalizationConfig};
use crate::frames::FrameTransformer;
use crate::heading::OrientationNormalizer;
use crate::origin::{LockState, OriginLock};
use crate::projector::LocalProjector;

#[derive(Debug, Clone, Default)]
pub struct Localizer {
    normalizer: OrientationNormalizer,
    origin_lock: OriginLock,
    projector: LocalProjector,
    transformer: FrameTransformer,
    poses: FramePoses,
}

impl Localizer {
    pub fn new(config: LocalizationConfig) -> Self {
        Self {
            normalizer: OrientationNormalizer::new(config.heading_wrap),
            origin_lock: OriginLock::new(),
            projector: LocalProjector::new(config.projection),
            transformer: FrameTransformer::new(config.pixels),
            poses: FramePoses::default(),
        }
    }

    /// Heading policy this localizer was built with.
    pub fn heading_wrap(&self) -> HeadingWrap {
        self.normalizer.wrap()
    }

    /// Update the heading of all six frames.
    ///
    /// Positions are left as they were after the last position sample. The
    /// returned hand-off carries no origin.
    pub fn handle_orientation(&mut self, sample: &OrientationSample) -> Handoff {
        let heading = self.normalizer.heading(sample);
        self.transformer.set_heading(&mut self.poses, heading);
        debug!(heading_deg = heading, "orientation applied");
        Handoff {
            origin: None,
            poses: self.poses,
        }
    }

    /// Run origin lock, projection and frame fan-out for one fix.
    pub fn handle_position(&mut self, sample: &PositionSample) -> Handoff {
        if self.origin_lock.observe(sample) == LockState::JustLocked {
            let origin = self.origin_lock.origin();
            info!(lon = origin.x, lat = origin.y, "origin locked");
        }
        let origin = self.origin_lock.origin();
        let displacement = self.projector.project(sample, &origin);
        self.transformer.place(&mut self.poses, sample, displacement);
        debug!(
            x_m = displacement.x_m,
            y_m = displacement.y_m,
            origin_locked = origin.locked,
            "position applied"
        );
        Handoff {
            origin: Some(origin),
            poses: self.poses,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin_lock.origin()
    }

    pub fn poses(&self) -> FramePoses {
        self.poses
    }
}
