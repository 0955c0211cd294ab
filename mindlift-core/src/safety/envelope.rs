//! Safety envelope
//!
//! Axis-aligned box in world coordinates (mm) that the tool point must stay
//! strictly inside. Bounds are exclusive: touching a wall counts as outside,
//! which leaves room for the few millimeters the real arm can deviate from
//! its reported position.

use crate::config::ConfigError;
use crate::motion::{Axis, Pose};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Workspace bounds (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SafetyEnvelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Default for SafetyEnvelope {
    /// Bench setup: 40 cm wide, 10 cm deep in front of the base, table at 6 mm
    fn default() -> Self {
        Self {
            min_x: -300.0,
            max_x: 100.0,
            min_y: -850.0,
            max_y: -750.0,
            min_z: 6.0,
            max_z: 400.0,
        }
    }
}

impl SafetyEnvelope {
    /// Lower and upper bound for an axis
    pub fn bounds(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.min_x, self.max_x),
            Axis::Y => (self.min_y, self.max_y),
            Axis::Z => (self.min_z, self.max_z),
        }
    }

    /// Check that every axis has `min < max`
    ///
    /// NaN bounds fail the comparison and are rejected as well.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in Axis::ALL {
            let (min, max) = self.bounds(axis);
            if !(min < max) {
                return Err(ConfigError::InvalidEnvelope(axis));
            }
        }
        Ok(())
    }

    /// True if a position lies strictly inside the bounds on one axis
    pub fn contains_on(&self, axis: Axis, position_mm: f64) -> bool {
        let (min, max) = self.bounds(axis);
        min < position_mm && position_mm < max
    }

    /// True if the pose position lies strictly inside the envelope
    pub fn contains(&self, pose: &Pose) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| self.contains_on(axis, pose.position(axis)))
    }
}
