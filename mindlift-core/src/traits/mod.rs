//! Robot abstraction traits
//!
//! These traits define the interface between the control logic and a
//! concrete robot link.

pub mod robot;

pub use robot::{MotionSink, PoseProvider};
