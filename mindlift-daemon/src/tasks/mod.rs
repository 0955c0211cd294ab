//! Embassy async tasks and their feeder threads
//!
//! The two tasks share the robot link and the shared state. Blocking reads
//! (headset socket, stdin) run on std threads and feed the tasks through
//! the static channels. Termination signals are routed into the operator
//! channel as a quit.

pub mod console;
pub mod controller;
pub mod headset;
pub mod signals;
pub mod watchdog;

pub use console::spawn_console;
pub use controller::controller_task;
pub use headset::spawn_headset_reader;
pub use signals::install_signal_handler;
pub use watchdog::watchdog_task;

/// Monotonic milliseconds from the embassy time driver
pub fn now_ms() -> u64 {
    embassy_time::Instant::now().as_millis()
}
