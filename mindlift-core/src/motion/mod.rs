//! Motion types
//!
//! Poses, translations and the six discrete step directions.

pub mod direction;
pub mod pose;
pub mod proximity;

pub use direction::Direction;
pub use pose::{Axis, Pose, Vector3, MM_PER_M};
pub use proximity::{Proximity, ProximityConfig};
