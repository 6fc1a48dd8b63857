//! One-shot capture of the local reference point.
//!
//! The first usable geodetic fix becomes the origin of every local frame for
//! the rest of the process lifetime. Until that happens the origin is the
//! degenerate `(0, 0)`, so downstream arithmetic always has a defined value
//! to subtract even though the result is not locally meaningful yet.

use swarmie_types::{Origin, PositionSample};

/// Outcome of feeding one fix to [`OriginLock::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No usable fix seen yet; origin is `(0, 0)`.
    Pending,
    /// This fix locked the origin.
    JustLocked,
    /// The origin was already locked; the fix changed nothing.
    Locked,
}

/// Sticky origin state.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginLock {
    origin: Origin,
}

impl OriginLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_locked(&self) -> bool {
        self.origin.locked
    }

    /// Apply the lock policy to `fix`.
    ///
    /// A fix locks the origin when its status is valid and both coordinates
    /// are non-zero. Exactly-zero coordinates are what receivers report
    /// before acquiring satellites, so they never lock.
    pub fn observe(&mut self, fix: &PositionSample) -> LockState {
        if self.origin.locked {
            return LockState::Locked;
        }
        if fix.status.is_valid() && fix.longitude != 0.0 && fix.latitude != 0.0 {
            self.origin = Origin {
                x: fix.longitude,
                y: fix.latitude,
                locked: true,
            };
            LockState::JustLocked
        } else {
            self.origin = Origin::default();
            LockState::Pending
        }
    }
}
