//! Biometric input processing
//!
//! Interprets individual readings from the headset: sample validity and
//! double-blink detection.

pub mod blink;
pub mod sample;

pub use blink::BlinkDebouncer;
pub use sample::BiometricSample;
