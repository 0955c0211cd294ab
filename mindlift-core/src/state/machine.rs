//! Down/Up motion state machine
//!
//! The arm cycles between lowering towards the table (driven by attention)
//! and rising back to the start (driven by meditation). Biometric levels
//! only decide whether to move or hold; the direction flips only on
//! proximity to the table or the start pose.

use heapless::Vec;

use crate::input::BiometricSample;
use crate::motion::{Direction, Proximity};

/// Maximum commands one tick can emit (decision + proximity stop)
pub const MAX_TICK_COMMANDS: usize = 2;

/// Commands emitted for one tick
pub type TickCommands = Vec<MotionCommand, MAX_TICK_COMMANDS>;

/// Motion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Lowering towards the table
    #[default]
    Down,
    /// Rising back to the start pose
    Up,
}

impl MotionState {
    pub fn as_str(self) -> &'static str {
        match self {
            MotionState::Down => "down",
            MotionState::Up => "up",
        }
    }
}

/// Command produced by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionCommand {
    /// Take one step down
    MoveDown,
    /// Take one step up
    MoveUp,
    /// Halt the arm
    Stop,
}

impl MotionCommand {
    /// Step direction for a move command
    pub fn direction(self) -> Option<Direction> {
        match self {
            MotionCommand::MoveDown => Some(Direction::Down),
            MotionCommand::MoveUp => Some(Direction::Up),
            MotionCommand::Stop => None,
        }
    }
}

/// Inputs evaluated on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInputs {
    /// Latest attention/meditation levels
    pub sample: BiometricSample,
    /// Latest sample carried a signal
    pub valid: bool,
    /// Watchdog has expired since the last sample
    pub stale: bool,
    /// Proximity to the table / start pose
    pub proximity: Proximity,
}

/// Down/Up state machine
#[derive(Debug, Clone)]
pub struct MotionStateMachine {
    state: MotionState,
    /// Level (0-100) at or above which the arm moves
    threshold: u8,
}

impl MotionStateMachine {
    /// Create a state machine in the Down state
    pub fn new(threshold: u8) -> Self {
        Self {
            state: MotionState::Down,
            threshold,
        }
    }

    /// Current state
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Evaluate one tick
    ///
    /// Always emits a decision (move or stop). The proximity check runs
    /// afterwards regardless of that decision and may append a second stop
    /// together with a state flip.
    pub fn evaluate(&mut self, inputs: &TickInputs) -> TickCommands {
        let mut commands = TickCommands::new();

        let decision = if inputs.stale || !inputs.valid {
            MotionCommand::Stop
        } else {
            match self.state {
                MotionState::Down if inputs.sample.attention >= self.threshold => {
                    MotionCommand::MoveDown
                }
                MotionState::Up if inputs.sample.meditation >= self.threshold => {
                    MotionCommand::MoveUp
                }
                _ => MotionCommand::Stop,
            }
        };
        // At most MAX_TICK_COMMANDS pushes per tick, neither can fail
        commands.push(decision).ok();

        let turnaround = match self.state {
            MotionState::Down if inputs.proximity.near_lower_limit => Some(MotionState::Up),
            MotionState::Up if inputs.proximity.near_upper_limit => Some(MotionState::Down),
            _ => None,
        };
        if let Some(next) = turnaround {
            commands.push(MotionCommand::Stop).ok();
            self.state = next;
        }

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u8 = 40;

    fn inputs(attention: u8, meditation: u8) -> TickInputs {
        let sample = BiometricSample::new(attention, meditation);
        TickInputs {
            sample,
            valid: sample.is_valid(),
            stale: false,
            proximity: Proximity::NONE,
        }
    }

    fn near_table(mut tick: TickInputs) -> TickInputs {
        tick.proximity.near_lower_limit = true;
        tick
    }

    fn near_start(mut tick: TickInputs) -> TickInputs {
        tick.proximity.near_upper_limit = true;
        tick
    }

    #[test]
    fn test_starts_down() {
        let machine = MotionStateMachine::new(THRESHOLD);
        assert_eq!(machine.state(), MotionState::Down);
    }

    #[test]
    fn test_stale_or_invalid_stops() {
        let mut machine = MotionStateMachine::new(THRESHOLD);

        let mut stale = inputs(90, 90);
        stale.stale = true;
        assert_eq!(machine.evaluate(&stale).as_slice(), &[MotionCommand::Stop]);

        assert_eq!(
            machine.evaluate(&inputs(0, 0)).as_slice(),
            &[MotionCommand::Stop]
        );
        assert_eq!(machine.state(), MotionState::Down);
    }

    #[test]
    fn test_down_cycle_end_to_end() {
        let mut machine = MotionStateMachine::new(THRESHOLD);

        for _ in 0..3 {
            assert_eq!(
                machine.evaluate(&inputs(80, 0)).as_slice(),
                &[MotionCommand::MoveDown]
            );
        }

        // Reaching the table: decision plus proximity stop, flip to Up
        assert_eq!(
            machine.evaluate(&near_table(inputs(80, 0))).as_slice(),
            &[MotionCommand::MoveDown, MotionCommand::Stop]
        );
        assert_eq!(machine.state(), MotionState::Up);

        // Low meditation holds the arm
        assert_eq!(
            machine.evaluate(&inputs(80, 20)).as_slice(),
            &[MotionCommand::Stop]
        );
        assert_eq!(
            machine.evaluate(&inputs(80, 39)).as_slice(),
            &[MotionCommand::Stop]
        );
        assert_eq!(
            machine.evaluate(&inputs(0, 40)).as_slice(),
            &[MotionCommand::MoveUp]
        );
    }

    #[test]
    fn test_up_turns_around_at_start() {
        let mut machine = MotionStateMachine::new(THRESHOLD);
        machine.evaluate(&near_table(inputs(10, 10)));
        assert_eq!(machine.state(), MotionState::Up);

        assert_eq!(
            machine.evaluate(&near_start(inputs(10, 90))).as_slice(),
            &[MotionCommand::MoveUp, MotionCommand::Stop]
        );
        assert_eq!(machine.state(), MotionState::Down);
    }

    #[test]
    fn test_proximity_runs_even_when_stale() {
        let mut machine = MotionStateMachine::new(THRESHOLD);
        let mut tick = near_table(inputs(90, 0));
        tick.stale = true;

        assert_eq!(
            machine.evaluate(&tick).as_slice(),
            &[MotionCommand::Stop, MotionCommand::Stop]
        );
        assert_eq!(machine.state(), MotionState::Up);
    }

    #[test]
    fn test_wrong_limit_is_ignored() {
        let mut machine = MotionStateMachine::new(THRESHOLD);

        // Near the start while going down does not flip
        assert_eq!(
            machine.evaluate(&near_start(inputs(90, 0))).as_slice(),
            &[MotionCommand::MoveDown]
        );
        assert_eq!(machine.state(), MotionState::Down);
    }

    #[test]
    fn test_biometrics_never_change_state() {
        let mut machine = MotionStateMachine::new(THRESHOLD);
        for level in [0u8, 20, 40, 60, 100] {
            machine.evaluate(&inputs(level, level));
            assert_eq!(machine.state(), MotionState::Down);
        }
    }

    #[test]
    fn test_command_directions() {
        assert_eq!(MotionCommand::MoveDown.direction(), Some(Direction::Down));
        assert_eq!(MotionCommand::MoveUp.direction(), Some(Direction::Up));
        assert_eq!(MotionCommand::Stop.direction(), None);
    }
}
