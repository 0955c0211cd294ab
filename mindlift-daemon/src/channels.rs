//! Inter-task communication channels
//!
//! Static channels connecting the blocking reader threads to the embassy
//! tasks. `CriticalSectionRawMutex` is backed by the std critical-section
//! implementation, so threads may send while tasks receive.

use std::str::FromStr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use mindlift_core::motion::Direction;

/// Channel capacity for headset records
pub const RECORD_CHANNEL_SIZE: usize = 64;

/// Channel capacity for operator commands
pub const OPERATOR_CHANNEL_SIZE: usize = 4;

/// Item produced by the headset reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// One raw text record
    Record(String),
    /// The stream ended or failed; no more records follow
    Closed,
}

/// Command typed on the operator console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Return to the reference pose and reset the move quota
    Home,
    /// Stop the arm now
    Stop,
    /// Stop the arm and exit
    Quit,
    /// One bounded manual step
    Jog(Direction),
}

impl FromStr for OperatorCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "h" => Ok(OperatorCommand::Home),
            "stop" | "s" => Ok(OperatorCommand::Stop),
            "quit" | "q" | "exit" => Ok(OperatorCommand::Quit),
            "left" => Ok(OperatorCommand::Jog(Direction::Left)),
            "right" => Ok(OperatorCommand::Jog(Direction::Right)),
            "up" => Ok(OperatorCommand::Jog(Direction::Up)),
            "down" => Ok(OperatorCommand::Jog(Direction::Down)),
            "forward" | "fwd" => Ok(OperatorCommand::Jog(Direction::Forward)),
            "backward" | "back" => Ok(OperatorCommand::Jog(Direction::Backward)),
            _ => Err(()),
        }
    }
}

pub type RecordChannel = Channel<CriticalSectionRawMutex, SourceEvent, RECORD_CHANNEL_SIZE>;
pub type OperatorChannel = Channel<CriticalSectionRawMutex, OperatorCommand, OPERATOR_CHANNEL_SIZE>;

/// Records from the headset reader thread
pub static RECORDS: RecordChannel = Channel::new();

/// Commands from the operator console thread
pub static OPERATOR: OperatorChannel = Channel::new();

/// Signal that the watchdog was re-armed (wakes the watchdog task early)
pub static WATCHDOG_TOUCHED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_commands() {
        assert_eq!("home".parse(), Ok(OperatorCommand::Home));
        assert_eq!(" STOP \n".parse(), Ok(OperatorCommand::Stop));
        assert_eq!("q".parse(), Ok(OperatorCommand::Quit));
        assert_eq!("dance".parse::<OperatorCommand>(), Err(()));
    }

    #[test]
    fn test_jog_commands() {
        assert_eq!(
            "Left".parse(),
            Ok(OperatorCommand::Jog(Direction::Left))
        );
        assert_eq!(
            "back".parse(),
            Ok(OperatorCommand::Jog(Direction::Backward))
        );
        assert_eq!(
            "forward".parse(),
            Ok(OperatorCommand::Jog(Direction::Forward))
        );
        assert_eq!("up\n".parse(), Ok(OperatorCommand::Jog(Direction::Up)));
    }
}
