//! Robot links
//!
//! Implementations of the core `PoseProvider`/`MotionSink` traits over the
//! robot controller's network interfaces.

pub mod ur;

pub use ur::UrLink;
