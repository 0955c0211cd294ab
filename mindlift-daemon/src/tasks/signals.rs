//! Termination signal handling
//!
//! SIGINT or SIGTERM queues a quit for the controller so the final stop
//! still reaches the arm. A second signal exits without waiting.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, warn};

use crate::channels::{OperatorChannel, OperatorCommand, OPERATOR};

/// Exit status when shutdown is forced (128 + SIGINT)
const FORCED_EXIT_CODE: i32 = 130;

/// What the handler does with a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Quit was queued, the controller stops the arm and exits
    Quit,
    /// Exit immediately
    Exit,
}

/// Install the process-wide handler (runs on its own thread)
pub fn install_signal_handler() -> Result<(), ctrlc::Error> {
    static RECEIVED: AtomicBool = AtomicBool::new(false);

    ctrlc::set_handler(|| match on_signal(&RECEIVED, &OPERATOR) {
        SignalAction::Quit => warn!("termination signal, stopping arm"),
        SignalAction::Exit => {
            error!("forced exit, final stop skipped");
            process::exit(FORCED_EXIT_CODE);
        }
    })
}

/// Decide how to handle one signal
///
/// Only the first signal queues a quit. A full operator queue means the
/// controller is not draining it, so the quit could never be seen.
pub fn on_signal(received: &AtomicBool, operator: &OperatorChannel) -> SignalAction {
    if received.swap(true, Ordering::SeqCst) {
        return SignalAction::Exit;
    }
    match operator.try_send(OperatorCommand::Quit) {
        Ok(()) => SignalAction::Quit,
        Err(_) => {
            warn!("operator queue full");
            SignalAction::Exit
        }
    }
}
