//! Motion state machine
//!
//! Defines how biometric levels and proximity signals turn into up/down
//! commands. The state machine is explicit, finite, and deterministic.

pub mod machine;

pub use machine::{
    MotionCommand, MotionState, MotionStateMachine, TickCommands, TickInputs, MAX_TICK_COMMANDS,
};
