//! Board-agnostic core logic for the Mindlift arm controller
//!
//! This crate contains all control logic that does not depend on a
//! particular robot, headset, or runtime:
//!
//! - Pose, translation and direction types
//! - Safety envelope, boundary guard and per-direction move quota
//! - Stop-on-silence watchdog
//! - Double-blink debouncer
//! - Down/Up motion state machine and proximity detection
//! - Configuration type definitions and validation
//! - Robot abstraction traits (pose provider, motion sink)
//!
//! Every component takes time as explicit milliseconds so it can be driven
//! from a host test without a clock.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod input;
pub mod motion;
pub mod safety;
pub mod state;
pub mod traits;
