//! Discrete move directions
//!
//! The arm is only ever moved in fixed steps along one of six named
//! directions. Each direction has an opposite (used by the move quota) and a
//! fixed step translation.

use super::pose::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Named step direction in the world frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
    Forward,
    Backward,
}

impl Direction {
    /// All directions, in counter index order
    pub const ALL: [Direction; 6] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::Forward,
        Direction::Backward,
    ];

    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Index into per-direction tables
    pub fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Left => 1,
            Direction::Up => 2,
            Direction::Down => 3,
            Direction::Forward => 4,
            Direction::Backward => 5,
        }
    }

    /// Fixed step translation for this direction (m)
    ///
    /// Up and down also shift 2 cm along Y so the tool clears the table
    /// edge on the way down and backs away from it on the way up.
    pub fn step(self) -> Vector3 {
        match self {
            Direction::Right => Vector3::new(0.10, 0.0, 0.0),
            Direction::Left => Vector3::new(-0.10, 0.0, 0.0),
            Direction::Up => Vector3::new(0.0, 0.02, 0.098),
            Direction::Down => Vector3::new(0.0, -0.02, -0.098),
            Direction::Forward => Vector3::new(0.0, -0.05, 0.0),
            Direction::Backward => Vector3::new(0.0, 0.05, 0.0),
        }
    }

    /// Lowercase name for logs and config keys
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_indices_are_unique() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_opposite_steps_cancel() {
        for dir in Direction::ALL {
            let a = dir.step();
            let b = dir.opposite().step();
            assert_eq!(a.dx + b.dx, 0.0);
            assert_eq!(a.dy + b.dy, 0.0);
            assert_eq!(a.dz + b.dz, 0.0);
        }
    }

    #[test]
    fn test_vertical_steps() {
        assert!(Direction::Down.step().dz < 0.0);
        assert!(Direction::Up.step().dz > 0.0);
        assert_eq!(Direction::Right.step().dz, 0.0);
    }
}
