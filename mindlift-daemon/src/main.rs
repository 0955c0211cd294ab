//! Mindlift - Biometric-driven robot arm controller
//!
//! Host daemon linking a ThinkGear EEG headset to a Universal Robots arm.
//! Attention lowers the arm, meditation raises it, a double blink toggles
//! the magnet, and silence from the headset stops everything.
//!
//! Named for what it does: lifting things by thinking about it.

use std::fmt::Display;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use embassy_executor::Spawner;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;
use tracing::{error, info, warn};

use mindlift_core::config::ControlConfig;

use crate::config::{load_config, DaemonConfig};
use crate::controller::{shared_state, Shared, SharedLink};
use crate::robot::UrLink;

mod channels;
mod config;
mod controller;
mod logging;
mod robot;
mod tasks;

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "mindlift", version, about)]
struct Args {
    /// Configuration file (defaults to the embedded mindlift.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "info,mindlift_daemon=trace"
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Robot controller host, overriding the configuration
    #[arg(long, value_name = "HOST")]
    robot: Option<String>,

    /// ThinkGear connector address (host:port), overriding the configuration
    #[arg(long, value_name = "ADDR")]
    headset: Option<String>,

    /// Skip the move to the reference pose at startup
    #[arg(long)]
    no_home: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

impl Args {
    fn apply(&self, config: &mut DaemonConfig) {
        if let Some(robot) = &self.robot {
            config.link.robot_host = robot.clone();
        }
        if let Some(headset) = &self.headset {
            config.link.headset_addr = headset.clone();
        }
        if self.no_home {
            config.control.home_on_start = false;
        }
    }
}

// Static cells for state the tasks borrow for the life of the process
static CONTROL: StaticCell<ControlConfig> = StaticCell::new();
static SHARED: StaticCell<Shared> = StaticCell::new();
static LINK: StaticCell<SharedLink<UrLink>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_level.as_deref()) {
        eprintln!("mindlift: {e}");
        process::exit(1);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "mindlift starting");

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fatal("configuration rejected", e),
    };
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        fatal("configuration rejected", e);
    }
    if args.check {
        info!("configuration ok");
        process::exit(0);
    }

    let robot = match UrLink::connect(&config.link) {
        Ok(robot) => robot,
        Err(e) => fatal("robot connection failed", e),
    };
    info!(host = %config.link.robot_host, "robot connected");

    let DaemonConfig { link: link_settings, control } = config;
    let deceleration = control.limits.stop_deceleration;
    let control: &'static ControlConfig = CONTROL.init(control);
    let shared: &'static Shared = SHARED.init(shared_state(control));
    let link: &'static SharedLink<UrLink> = LINK.init(Mutex::new(robot));

    if let Err(e) = tasks::spawn_headset_reader(link_settings.headset_addr) {
        fatal("headset reader thread failed to start", e);
    }
    if let Err(e) = tasks::spawn_console() {
        warn!(error = %e, "operator console unavailable");
    }
    if let Err(e) = tasks::install_signal_handler() {
        warn!(error = %e, "signal handler unavailable, ctrl-c skips the final stop");
    }

    if let Err(e) = spawner.spawn(tasks::watchdog_task(shared, link, deceleration)) {
        fatal("watchdog task failed to spawn", format_args!("{e:?}"));
    }
    if let Err(e) = spawner.spawn(tasks::controller_task(control, shared, link)) {
        fatal("controller task failed to spawn", format_args!("{e:?}"));
    }

    info!("all tasks spawned, type home, stop, quit or a jog direction");
}

/// Log a startup failure and exit with status 1
fn fatal(context: &str, e: impl Display) -> ! {
    error!(error = %e, "{context}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply() {
        let args = Args::parse_from([
            "mindlift",
            "--robot",
            "10.1.1.2",
            "--headset",
            "127.0.0.1:9999",
            "--no-home",
        ]);
        let mut config = DaemonConfig::default();
        args.apply(&mut config);

        assert_eq!(config.link.robot_host, "10.1.1.2");
        assert_eq!(config.link.headset_addr, "127.0.0.1:9999");
        assert!(!config.control.home_on_start);
        assert_eq!(
            config.control,
            ControlConfig {
                home_on_start: false,
                ..ControlConfig::default()
            }
        );
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = Args::parse_from(["mindlift", "--check"]);
        let mut config = DaemonConfig::default();
        args.apply(&mut config);
        assert!(args.check);
        assert_eq!(config, DaemonConfig::default());
    }
}
