//! Operator console thread
//!
//! Reads commands from stdin, one per line, into [`OPERATOR`]. A closed
//! stdin (daemon run without a terminal) just ends the thread.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use embassy_futures::block_on;
use tracing::{debug, warn};

use crate::channels::{OperatorCommand, OPERATOR};

/// Start the console thread
pub fn spawn_console() -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("console".into()).spawn(|| {
        let stdin = io::stdin();
        read_commands(stdin.lock(), |command| block_on(OPERATOR.send(command)));
        debug!("console closed");
    })
}

/// Parse each non-empty line and hand recognised commands to `emit`
pub fn read_commands<R: BufRead>(input: R, mut emit: impl FnMut(OperatorCommand)) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "console read failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<OperatorCommand>() {
            Ok(command) => emit(command),
            Err(()) => warn!(
                input = line.trim(),
                "unknown command (home, stop, quit, left, right, up, down, forward, backward)"
            ),
        }
    }
}
