//! `swarmie-localization` – the frame-conversion and origin-locking core.
//!
//! Turns an inertial orientation and a satellite geodetic fix into one pose
//! expressed in six coordinate conventions under a single shared origin.
//! Everything here is synchronous, allocation-free arithmetic; delivering
//! samples and distributing results is left to `swarmie-middleware`.
//!
//! # Modules
//!
//! - [`heading`] – [`OrientationNormalizer`][heading::OrientationNormalizer]:
//!   quaternion → mirrored compass heading in degrees.
//! - [`origin`] – [`OriginLock`][origin::OriginLock]: one-shot capture of the
//!   first valid fix as the local reference point.
//! - [`projector`] – [`LocalProjector`][projector::LocalProjector]: flat-Earth
//!   degrees → metres relative to the origin.
//! - [`frames`] – [`FrameTransformer`][frames::FrameTransformer]: fans the
//!   metric displacement out into the Real, Raw, Gazebo, UNM, Image and Map
//!   frames.
//! - [`localizer`] – [`Localizer`]: the context object that owns the state and
//!   runs the pipeline once per sample.
//! - [`config`] – named scale constants and the heading wrap policy.

pub mod config;
pub mod frames;
pub mod heading;
pub mod localizer;
pub mod origin;
pub mod projector;

pub use config::{HeadingWrap, LocalizationConfig, PixelConfig, ProjectionConfig};
pub use localizer::Localizer;
