//! Pose and motion traits for an arm controller

use crate::motion::Pose;

/// Source of the current tool pose
pub trait PoseProvider {
    type Error;

    /// Read the tool pose (position in mm, orientation in rad)
    ///
    /// Takes `&mut self` because the read is a request/response exchange.
    fn get_pose(&mut self) -> Result<Pose, Self::Error>;
}

/// Sink for motion commands
///
/// Every call is fire-and-forget from the caller's point of view: errors are
/// reported but never retried.
pub trait MotionSink {
    type Error;

    /// Linear move of the tool point to `target`
    fn move_linear(
        &mut self,
        target: Pose,
        acceleration: f64,
        velocity: f64,
    ) -> Result<(), Self::Error>;

    /// Decelerate to a halt
    fn stop(&mut self, deceleration: f64) -> Result<(), Self::Error>;

    /// Set the tool centre point relative to the flange
    fn set_tool_offset(&mut self, offset: Pose) -> Result<(), Self::Error>;

    /// Drive a digital output
    fn set_digital_output(&mut self, index: u8, on: bool) -> Result<(), Self::Error>;
}
