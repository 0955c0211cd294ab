//! Pose and translation types
//!
//! Poses are expressed the way the teaching pendant shows them: position in
//! millimeters, orientation as a rotation vector in radians. Translations
//! requested by the control loop are in meters, matching the step sizes the
//! arm is commanded with.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Millimeters per meter
pub const MM_PER_M: f64 = 1000.0;

/// Cartesian axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All translational axes, in component order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Tool pose in the world frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Position X (mm)
    pub x: f64,
    /// Position Y (mm)
    pub y: f64,
    /// Position Z (mm)
    pub z: f64,
    /// Rotation vector X (rad)
    pub rx: f64,
    /// Rotation vector Y (rad)
    pub ry: f64,
    /// Rotation vector Z (rad)
    pub rz: f64,
}

impl Pose {
    /// Create a pose from position (mm) and orientation (rad)
    pub const fn new(x: f64, y: f64, z: f64, rx: f64, ry: f64, rz: f64) -> Self {
        Self {
            x,
            y,
            z,
            rx,
            ry,
            rz,
        }
    }

    /// Position component along an axis (mm)
    pub fn position(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Pose reached by translating this one; orientation is kept
    pub fn translated(&self, by: Vector3) -> Self {
        Self {
            x: self.x + by.dx * MM_PER_M,
            y: self.y + by.dy * MM_PER_M,
            z: self.z + by.dz * MM_PER_M,
            ..*self
        }
    }
}

/// Requested translation (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector3 {
    /// Zero translation
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Component along an axis (m)
    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
            Axis::Z => self.dz,
        }
    }

    /// Replace the component along an axis (m)
    pub fn set_component(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.dx = value,
            Axis::Y => self.dy = value,
            Axis::Z => self.dz = value,
        }
    }

    /// True if no component moves the tool
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.dz == 0.0
    }
}
