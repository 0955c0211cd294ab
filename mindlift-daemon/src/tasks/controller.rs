//! Control loop task
//!
//! Owns the [`Controller`] for the life of the process. When the loop
//! returns (headset gone or operator quit) the arm is stopped and the
//! process exits.

use tracing::info;

use mindlift_core::config::ControlConfig;

use crate::channels::{OPERATOR, RECORDS};
use crate::controller::{Controller, ExitReason, Shared, SharedLink};
use crate::robot::UrLink;
use crate::tasks::now_ms;

#[embassy_executor::task]
pub async fn controller_task(
    config: &'static ControlConfig,
    shared: &'static Shared,
    link: &'static SharedLink<UrLink>,
) {
    info!("controller task started");

    let mut controller = Controller::new(config, shared, link);
    controller.start(now_ms()).await;

    let reason = controller.run(&RECORDS, &OPERATOR, now_ms).await;
    controller.shutdown().await;

    match reason {
        ExitReason::EndOfStream => info!("headset closed, exiting"),
        ExitReason::Quit => info!("operator quit, exiting"),
    }
    std::process::exit(0);
}
