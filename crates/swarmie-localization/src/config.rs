//! Tunable constants of the localization core.
//!
//! The defaults encode a flat-Earth approximation calibrated for roughly
//! 28° N (Kennedy Space Center). They are only meaningful for short-range
//! operation near that latitude band; anywhere else the metric frames drift
//! from true ground distance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do with the heading after the compass mirror is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingWrap {
    /// Wrap into `[0, 360)`.
    #[default]
    Normalized,
    /// Leave the mirrored value as-is; a yaw of exactly 0° yields 360°.
    Unclamped,
}

impl fmt::Display for HeadingWrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingWrap::Normalized => write!(f, "normalized"),
            HeadingWrap::Unclamped => write!(f, "unclamped"),
        }
    }
}

impl FromStr for HeadingWrap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" => Ok(HeadingWrap::Normalized),
            "unclamped" => Ok(HeadingWrap::Unclamped),
            other => Err(format!("unknown heading wrap policy `{other}`")),
        }
    }
}

/// Degree-to-metre scale factors of the local tangent-plane projection.
///
/// One degree of longitude shrinks with latitude while one degree of latitude
/// stays roughly constant, hence the two separate factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_lon_meters_per_degree")]
    pub lon_meters_per_degree: f64,
    #[serde(default = "default_lat_meters_per_degree")]
    pub lat_meters_per_degree: f64,
}

fn default_lon_meters_per_degree() -> f64 {
    100_000.0
}
fn default_lat_meters_per_degree() -> f64 {
    111_180.0
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            lon_meters_per_degree: default_lon_meters_per_degree(),
            lat_meters_per_degree: default_lat_meters_per_degree(),
        }
    }
}

/// Scaling of the two pixel-indexed visualization frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelConfig {
    /// Metres added before scaling in the Image frame so the canvas stays
    /// non-negative around the origin.
    #[serde(default = "default_image_offset_m")]
    pub image_offset_m: f64,
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f64,
}

fn default_image_offset_m() -> f64 {
    15.0
}
fn default_pixels_per_meter() -> f64 {
    10.0
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            image_offset_m: default_image_offset_m(),
            pixels_per_meter: default_pixels_per_meter(),
        }
    }
}

/// Full configuration of a [`Localizer`][crate::Localizer].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationConfig {
    #[serde(default)]
    pub heading_wrap: HeadingWrap,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub pixels: PixelConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_latitude_constants() {
        let cfg = LocalizationConfig::default();
        assert_eq!(cfg.heading_wrap, HeadingWrap::Normalized);
        assert_eq!(cfg.projection.lon_meters_per_degree, 100_000.0);
        assert_eq!(cfg.projection.lat_meters_per_degree, 111_180.0);
        assert_eq!(cfg.pixels.image_offset_m, 15.0);
        assert_eq!(cfg.pixels.pixels_per_meter, 10.0);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: LocalizationConfig = toml::from_str(
            r#"
            heading_wrap = "unclamped"

            [projection]
            lon_meters_per_degree = 96000.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.heading_wrap, HeadingWrap::Unclamped);
        assert_eq!(cfg.projection.lon_meters_per_degree, 96_000.0);
        assert_eq!(cfg.projection.lat_meters_per_degree, 111_180.0);
        assert_eq!(cfg.pixels, PixelConfig::default());
    }

    #[test]
    fn heading_wrap_parses_case_insensitively() {
        assert_eq!("Unclamped".parse::<HeadingWrap>(), Ok(HeadingWrap::Unclamped));
        assert_eq!(" normalized ".parse::<HeadingWrap>(), Ok(HeadingWrap::Normalized));
        assert!("wrapped".parse::<HeadingWrap>().is_err());
    }
}
