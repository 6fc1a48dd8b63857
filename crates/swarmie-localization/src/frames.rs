//! Fan-out of one local displacement into the six frame conventions.
//!
//! | Frame  | x                          | y                          | Units   |
//! |--------|----------------------------|----------------------------|---------|
//! | Raw    | longitude                  | latitude                   | degrees |
//! | UNM    | x_m                        | y_m                        | metres  |
//! | Real   | y_m                        | −x_m                       | metres  |
//! | Gazebo | y_m                        | −x_m                       | metres  |
//! | Image  | round((y_m + offset)·ppm)  | round((x_m + offset)·ppm)  | pixels  |
//! | Map    | round(y_m·ppm)             | round(x_m·ppm)             | pixels  |
//!
//! Rounding is half-away-from-zero. Heading is frame-invariant and is written
//! separately by [`FrameTransformer::set_heading`].

use swarmie_types::{FrameId, FramePoses, PositionSample};

use crate::config::PixelConfig;
use crate::projector::LocalDisplacement;

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTransformer {
    pixels: PixelConfig,
}

impl FrameTransformer {
    pub fn new(pixels: PixelConfig) -> Self {
        Self { pixels }
    }

    /// `(x, y)` of `frame` for the given fix and its local displacement.
    pub fn position(
        &self,
        frame: FrameId,
        fix: &PositionSample,
        d: LocalDisplacement,
    ) -> (f64, f64) {
        let ppm = self.pixels.pixels_per_meter;
        let offset = self.pixels.image_offset_m;
        match frame {
            FrameId::Raw => (fix.longitude, fix.latitude),
            FrameId::Unm => (d.x_m, d.y_m),
            FrameId::Real | FrameId::Gazebo => (d.y_m, -d.x_m),
            FrameId::Image => (
                ((d.y_m + offset) * ppm).round(),
                ((d.x_m + offset) * ppm).round(),
            ),
            FrameId::Map => ((d.y_m * ppm).round(), (d.x_m * ppm).round()),
        }
    }

    /// Overwrite the position of every frame in `poses`; headings are kept.
    pub fn place(&self, poses: &mut FramePoses, fix: &PositionSample, d: LocalDisplacement) {
        for (frame, pose) in poses.iter_mut() {
            let (x, y) = self.position(frame, fix, d);
            pose.x = x;
            pose.y = y;
        }
    }

    /// Write `heading_deg` into every frame; positions are kept.
    pub fn set_heading(&self, poses: &mut FramePoses, heading_deg: f64) {
        for (_, pose) in poses.iter_mut() {
            pose.theta = heading_deg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmie_types::{FixStatus, Pose2D};

    fn fix() -> PositionSample {
        PositionSample {
            longitude: -80.6,
            latitude: 28.5,
            status: FixStatus::Fix,
        }
    }

    #[test]
    fn real_and_gazebo_swap_axes_and_flip_y() {
        let t = FrameTransformer::default();
        let d = LocalDisplacement { x_m: 3.0, y_m: 4.0 };
        assert_eq!(t.position(FrameId::Real, &fix(), d), (4.0, -3.0));
        assert_eq!(t.position(FrameId::Gazebo, &fix(), d), (4.0, -3.0));
        assert_eq!(t.position(FrameId::Unm, &fix(), d), (3.0, 4.0));
    }

    #[test]
    fn raw_ignores_displacement() {
        let t = FrameTransformer::default();
        let d = LocalDisplacement { x_m: 99.0, y_m: -99.0 };
        assert_eq!(t.position(FrameId::Raw, &fix(), d), (-80.6, 28.5));
    }

    #[test]
    fn image_offsets_before_scaling() {
        let t = FrameTransformer::default();
        let d = LocalDisplacement { x_m: 1.0, y_m: -2.0 };
        assert_eq!(t.position(FrameId::Image, &fix(), d), (130.0, 160.0));
        assert_eq!(t.position(FrameId::Map, &fix(), d), (-20.0, 10.0));
    }

    #[test]
    fn pixel_rounding_is_half_away_from_zero() {
        let t = FrameTransformer::default();
        let d = LocalDisplacement { x_m: -0.25, y_m: 0.25 };
        // 2.5 → 3, −2.5 → −3
        assert_eq!(t.position(FrameId::Map, &fix(), d), (3.0, -3.0));
    }

    #[test]
    fn place_keeps_heading_and_set_heading_keeps_position() {
        let t = FrameTransformer::default();
        let mut poses = FramePoses::default();
        t.set_heading(&mut poses, 315.0);
        t.place(&mut poses, &fix(), LocalDisplacement { x_m: 1.0, y_m: 2.0 });

        assert_eq!(poses[FrameId::Unm], Pose2D::new(1.0, 2.0, 315.0));
        for (_, pose) in poses.iter() {
            assert_eq!(pose.theta, 315.0);
        }

        t.set_heading(&mut poses, 90.0);
        assert_eq!(poses[FrameId::Unm], Pose2D::new(1.0, 2.0, 90.0));
    }

    #[test]
    fn custom_pixel_config() {
        let t = FrameTransformer::new(PixelConfig {
            image_offset_m: 0.0,
            pixels_per_meter: 2.0,
        });
        let d = LocalDisplacement { x_m: 1.0, y_m: 3.0 };
        assert_eq!(t.position(FrameId::Image, &fix(), d), (6.0, 2.0));
    }
}
