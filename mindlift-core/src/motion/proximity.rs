//! Proximity detection for the Down/Up cycle
//!
//! The lower limit is the work surface, taken as the envelope floor. The
//! upper limit is the reference (home) pose the arm starts from. Both are
//! widened by a configured margin so the state machine turns around before
//! the boundary guard has to clamp.

use super::pose::Pose;
use crate::safety::SafetyEnvelope;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Margins used to decide when the tool is near a turnaround point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProximityConfig {
    /// Distance above the envelope floor counted as "near table" (mm)
    pub lower_margin_mm: f64,
    /// Distance below the reference height counted as "near start" (mm)
    pub upper_margin_mm: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            lower_margin_mm: 30.0,
            upper_margin_mm: 10.0,
        }
    }
}

/// Proximity flags for one evaluation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Proximity {
    /// Tool is close to the work surface
    pub near_lower_limit: bool,
    /// Tool is back at (or above) the reference height
    pub near_upper_limit: bool,
}

impl Proximity {
    /// No proximity signal (used when the pose is unknown)
    pub const NONE: Proximity = Proximity {
        near_lower_limit: false,
        near_upper_limit: false,
    };

    /// Derive proximity flags from the current pose
    pub fn detect(
        pose: &Pose,
        envelope: &SafetyEnvelope,
        reference: &Pose,
        config: &ProximityConfig,
    ) -> Self {
        Self {
            near_lower_limit: pose.z <= envelope.min_z + config.lower_margin_mm,
            near_upper_limit: pose.z >= reference.z - config.upper_margin_mm,
        }
    }
}
