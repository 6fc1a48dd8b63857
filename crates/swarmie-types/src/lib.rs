//! `swarmie-types` – shared data model for the rover localization stack.
//!
//! Everything that crosses a crate boundary lives here: the sensor samples
//! delivered to the localization core, the pose snapshots it hands back, the
//! bus [`Event`] envelope, and the [`SwarmieError`] used by the plumbing.

use std::fmt;
use std::ops::{Index, IndexMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Poses and frames
// ────────────────────────────────────────────────────────────────────────────

/// A 2-D position plus heading in degrees.
///
/// The units of `x` and `y` depend on the [`FrameId`] the pose belongs to
/// (degrees, metres or pixels); `theta` is always degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }
}

/// The six coordinate conventions a pose is published in.
///
/// Declaration order is the canonical hand-off order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameId {
    /// Physical rover frame (metres, axes swapped relative to UNM).
    Real,
    /// Unmodified geodetic degrees.
    Raw,
    /// Simulator frame; same convention as `Real`.
    Gazebo,
    /// Local metric east/north frame relative to the locked origin.
    #[serde(rename = "UNM")]
    Unm,
    /// Visualization canvas pixels with a fixed offset.
    Image,
    /// Map pixels without offset.
    Map,
}

impl FrameId {
    /// All frames in canonical order.
    pub const ALL: [FrameId; 6] = [
        FrameId::Real,
        FrameId::Raw,
        FrameId::Gazebo,
        FrameId::Unm,
        FrameId::Image,
        FrameId::Map,
    ];

    /// Position of this frame in [`FrameId::ALL`].
    pub const fn index(self) -> usize {
        match self {
            FrameId::Real => 0,
            FrameId::Raw => 1,
            FrameId::Gazebo => 2,
            FrameId::Unm => 3,
            FrameId::Image => 4,
            FrameId::Map => 5,
        }
    }

    /// Topic leaf name, e.g. `location_real`.
    pub const fn topic_leaf(self) -> &'static str {
        match self {
            FrameId::Real => "location_real",
            FrameId::Raw => "location_raw",
            FrameId::Gazebo => "location_gazebo",
            FrameId::Unm => "location_unm",
            FrameId::Image => "location_image",
            FrameId::Map => "location_map",
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameId::Real => "Real",
            FrameId::Raw => "Raw",
            FrameId::Gazebo => "Gazebo",
            FrameId::Unm => "UNM",
            FrameId::Image => "Image",
            FrameId::Map => "Map",
        };
        f.write_str(name)
    }
}

/// One [`Pose2D`] per [`FrameId`], indexable by frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePoses([Pose2D; 6]);

impl FramePoses {
    /// Iterate `(frame, pose)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Pose2D)> {
        FrameId::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (FrameId, &mut Pose2D)> {
        FrameId::ALL.into_iter().zip(self.0.iter_mut())
    }
}

impl Index<FrameId> for FramePoses {
    type Output = Pose2D;

    fn index(&self, frame: FrameId) -> &Pose2D {
        &self.0[frame.index()]
    }
}

impl IndexMut<FrameId> for FramePoses {
    fn index_mut(&mut self, frame: FrameId) -> &mut Pose2D {
        &mut self.0[frame.index()]
    }
}

/// Geodetic reference point (`x` = longitude, `y` = latitude, degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
    /// `true` once the first valid fix has been captured.
    pub locked: bool,
}

/// What the localization core hands to the distribution boundary after each
/// sample.
///
/// `origin` is `Some` after a position sample and `None` after an
/// orientation-only update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    pub origin: Option<Origin>,
    pub poses: FramePoses,
}

// ────────────────────────────────────────────────────────────────────────────
// Sensor samples
// ────────────────────────────────────────────────────────────────────────────

/// Orientation quaternion (w, x, y, z convention).
///
/// Not validated: a non-unit quaternion is passed through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Pure rotation of `yaw_rad` about the vertical axis.
    pub fn from_yaw(yaw_rad: f64) -> Self {
        let half = yaw_rad / 2.0;
        Self::new(half.cos(), 0.0, 0.0, half.sin())
    }
}

/// A reading from the inertial sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub orientation: Quaternion,
}

/// Fix quality reported by the satellite receiver.
///
/// Codes follow the navigation-satellite status message: `-1` no fix, `0`
/// fix, `1` SBAS-augmented, `2` ground-based augmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixStatus {
    NoFix,
    Fix,
    SbasFix,
    GbasFix,
    Other(i8),
}

impl FixStatus {
    pub fn from_code(code: i8) -> Self {
        match code {
            -1 => FixStatus::NoFix,
            0 => FixStatus::Fix,
            1 => FixStatus::SbasFix,
            2 => FixStatus::GbasFix,
            other => FixStatus::Other(other),
        }
    }

    /// Anything but an explicit "no fix" counts as usable.
    pub fn is_valid(self) -> bool {
        self != FixStatus::NoFix
    }
}

/// A geodetic fix from the satellite receiver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub longitude: f64,
    pub latitude: f64,
    pub status: FixStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Bus envelope
// ────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper for the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Topic path the event was published on, e.g. `"/achilles/gps"`.
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Stamp `payload` with a fresh id and the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Orientation(OrientationSample),
    Position(PositionSample),
    Origin(Origin),
    Location { frame: FrameId, pose: Pose2D },
}

/// Error type for the plumbing around the localization core.
///
/// The core itself never fails; these cover channels, wire formats and
/// configuration.
#[derive(Error, Debug)]
pub enum SwarmieError {
    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}
