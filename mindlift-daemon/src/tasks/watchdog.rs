//! Watchdog timer task
//!
//! Sleeps until the watchdog deadline, then stops the arm if no fresh
//! sample arrived in the meantime. Every touch wakes the task so it can
//! re-read the deadline.

use core::fmt::Display;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use tracing::{info, warn};

use mindlift_core::traits::MotionSink;

use crate::channels::WATCHDOG_TOUCHED;
use crate::controller::{Shared, SharedLink};
use crate::robot::UrLink;
use crate::tasks::now_ms;

#[embassy_executor::task]
pub async fn watchdog_task(
    shared: &'static Shared,
    link: &'static SharedLink<UrLink>,
    deceleration: f64,
) {
    info!("watchdog task started");

    loop {
        watch(
            shared,
            link,
            deceleration,
            &WATCHDOG_TOUCHED,
            now_ms,
            |deadline| Timer::at(Instant::from_millis(deadline)),
        )
        .await;
    }
}

/// Wait for the next touch or the current deadline, whichever comes first
///
/// Returns true if the deadline passed and a stop was issued. A touch
/// returns false so the caller re-reads the new deadline.
pub async fn watch<L, F>(
    shared: &Shared,
    link: &SharedLink<L>,
    deceleration: f64,
    touched: &Signal<CriticalSectionRawMutex, ()>,
    now_ms: impl Fn() -> u64,
    sleep_until: impl Fn(u64) -> F,
) -> bool
where
    L: MotionSink,
    L::Error: Display,
    F: Future<Output = ()>,
{
    match shared.lock(|s| s.borrow().watchdog.deadline_ms()) {
        None => {
            touched.wait().await;
            false
        }
        Some(deadline) => match select(touched.wait(), sleep_until(deadline)).await {
            Either::First(()) => false,
            Either::Second(()) => expire(shared, link, now_ms(), deceleration).await,
        },
    }
}

/// Poll the watchdog and stop the arm if it expired
///
/// Returns true if a stop was issued. A touch that lands between the timer
/// firing and this poll pushes the deadline out, so nothing is sent.
pub async fn expire<L>(
    shared: &Shared,
    link: &SharedLink<L>,
    now_ms: u64,
    deceleration: f64,
) -> bool
where
    L: MotionSink,
    L::Error: Display,
{
    let (expired, expiries) = shared.lock(|s| {
        let mut s = s.borrow_mut();
        (s.watchdog.poll(now_ms), s.watchdog.fired_count())
    });
    if !expired {
        return false;
    }

    warn!(expiries, "no headset sample within timeout, stopping arm");
    if let Err(e) = link.lock().await.stop(deceleration) {
        warn!(error = %e, "watchdog stop failed");
    }
    true
}
