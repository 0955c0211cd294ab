//! Control configuration
//!
//! Everything the control loop needs to decide and bound motion. Link
//! addresses and other transport settings live with the daemon.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::input::sample::MAX_LEVEL;
use crate::motion::{Axis, Direction, Pose, ProximityConfig};
use crate::safety::{QuotaCeilings, SafetyEnvelope};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Envelope min is not below max on this axis
    InvalidEnvelope(Axis),
    /// Watchdog timeout is zero
    NonPositiveTimeout,
    /// Blink window is zero
    NonPositiveWindow,
    /// Command interval is zero
    NonPositiveInterval,
    /// Acceleration, velocity or stop deceleration is NaN or not positive
    InvalidMotionLimit,
    /// Attention/meditation threshold above the headset's 0-100 scale
    ThresholdOutOfRange,
    /// A direction ceiling is zero or negative
    InvalidQuotaCeiling,
    /// Reference pose lies outside the envelope
    ReferenceOutsideEnvelope,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEnvelope(axis) => {
                write!(f, "envelope min must be below max on {} axis", axis.as_str())
            }
            ConfigError::NonPositiveTimeout => f.write_str("watchdog timeout must be positive"),
            ConfigError::NonPositiveWindow => f.write_str("blink window must be positive"),
            ConfigError::NonPositiveInterval => f.write_str("command interval must be positive"),
            ConfigError::InvalidMotionLimit => {
                f.write_str("acceleration, velocity and stop deceleration must be positive")
            }
            ConfigError::ThresholdOutOfRange => f.write_str("threshold must be within 0-100"),
            ConfigError::InvalidQuotaCeiling => f.write_str("direction ceilings must be positive"),
            ConfigError::ReferenceOutsideEnvelope => {
                f.write_str("reference pose lies outside the envelope")
            }
        }
    }
}

/// Acceleration and velocity caps for `movel`/`stopj`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionLimits {
    /// Tool acceleration (m/s²)
    pub acceleration: f64,
    /// Tool velocity (m/s)
    pub velocity: f64,
    /// Deceleration used when stopping (rad/s²)
    pub stop_deceleration: f64,
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self {
            acceleration: 0.1,
            velocity: 0.1,
            stop_deceleration: 1.5,
        }
    }
}

impl MotionLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        for value in [self.acceleration, self.velocity, self.stop_deceleration] {
            // NaN fails the comparison too
            if !(value > 0.0) {
                return Err(ConfigError::InvalidMotionLimit);
            }
        }
        Ok(())
    }
}

/// Control loop configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlConfig {
    /// Box the tool point must stay inside
    pub envelope: SafetyEnvelope,
    /// Move/stop speed caps
    pub limits: MotionLimits,
    /// Per-direction move ceilings
    pub ceilings: QuotaCeilings,
    /// Attention (going down) and meditation (going up) level that moves the arm
    pub threshold: u8,
    /// Blink strength (1-255) a blink must exceed to count
    pub blink_threshold: u8,
    /// Window for the second blink of a pair
    pub blink_window_ms: u64,
    /// Stop if no eSense sample arrives for this long
    pub watchdog_timeout_ms: u64,
    /// Minimum time between two state machine evaluations
    pub command_interval_ms: u64,
    /// Start and home pose
    pub reference_pose: Pose,
    /// Tool centre point relative to the flange
    pub tool_offset: Pose,
    /// Digital output driving the magnet
    pub magnet_output: u8,
    /// Margins for near-table / near-start detection
    pub proximity: ProximityConfig,
    /// Return to the reference pose before processing samples
    pub home_on_start: bool,
    /// No step is decided for this long after a home move is sent
    ///
    /// Any command sent to the arm aborts the move in progress, so the
    /// home move must be left to finish.
    pub home_settle_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            envelope: SafetyEnvelope::default(),
            limits: MotionLimits::default(),
            ceilings: QuotaCeilings::default(),
            threshold: 60,
            blink_threshold: 30,
            blink_window_ms: 1000,
            watchdog_timeout_ms: 15_000,
            command_interval_ms: 2000,
            reference_pose: Pose::new(-100.0, -800.0, 300.0, 0.0, 3.14, 0.0),
            tool_offset: Pose::new(50.0, -50.0, 295.0, 0.0, 0.0, 0.0),
            magnet_output: 8,
            proximity: ProximityConfig::default(),
            home_on_start: true,
            home_settle_ms: 7500,
        }
    }
}

impl ControlConfig {
    /// Check every invariant the control loop relies on
    ///
    /// Called once before the loop starts; any error is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.envelope.validate()?;

        if self.watchdog_timeout_ms == 0 {
            return Err(ConfigError::NonPositiveTimeout);
        }
        if self.blink_window_ms == 0 {
            return Err(ConfigError::NonPositiveWindow);
        }
        if self.command_interval_ms == 0 {
            return Err(ConfigError::NonPositiveInterval);
        }

        self.limits.validate()?;

        if self.threshold > MAX_LEVEL {
            return Err(ConfigError::ThresholdOutOfRange);
        }

        if Direction::ALL.iter().any(|&dir| self.ceilings.get(dir) <= 0) {
            return Err(ConfigError::InvalidQuotaCeiling);
        }

        if !self.envelope.contains(&self.reference_pose) {
            return Err(ConfigError::ReferenceOutsideEnvelope);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ControlConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_defaults_match_robot_setup() {
        let config = ControlConfig::default();
        assert_eq!(config.ceilings.get(Direction::Up), 2);
        assert_eq!(config.ceilings.get(Direction::Down), 3);
        assert_eq!(config.magnet_output, 8);
        assert_eq!(config.command_interval_ms, 2000);
        assert_eq!(config.limits.acceleration, 0.1);
        assert_eq!(config.limits.velocity, 0.1);
        // 0.5 s after set_tcp plus 7 s for the move itself
        assert_eq!(config.home_settle_ms, 7500);
    }

    #[test]
    fn test_inverted_envelope_rejected() {
        let mut config = ControlConfig::default();
        config.envelope.min_z = config.envelope.max_z;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidEnvelope(Axis::Z))
        );
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut config = ControlConfig::default();
        config.watchdog_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveTimeout));

        let mut config = ControlConfig::default();
        config.blink_window_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveWindow));

        let mut config = ControlConfig::default();
        config.command_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveInterval));
    }

    #[test]
    fn test_bad_motion_limits_rejected() {
        let mut config = ControlConfig::default();
        config.limits.velocity = f64::NAN;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMotionLimit));

        let mut config = ControlConfig::default();
        config.limits.acceleration = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMotionLimit));

        let mut config = ControlConfig::default();
        config.limits.stop_deceleration = -1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMotionLimit));
    }

    #[test]
    fn test_threshold_above_scale_rejected() {
        let mut config = ControlConfig::default();
        config.threshold = 101;
        assert_eq!(config.validate(), Err(ConfigError::ThresholdOutOfRange));

        // Blink strength runs up to 255
        let mut config = ControlConfig::default();
        config.blink_threshold = 200;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_non_positive_ceiling_rejected() {
        let mut config = ControlConfig::default();
        config.ceilings.backward = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidQuotaCeiling));
    }

    #[test]
    fn test_reference_outside_envelope_rejected() {
        let mut config = ControlConfig::default();
        config.reference_pose.z = config.envelope.max_z + 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReferenceOutsideEnvelope)
        );
    }
}
