//! Control loop
//!
//! The controller turns headset records into robot commands:
//! - Parses each record, dropping malformed ones
//! - Toggles the magnet on a double blink
//! - Feeds eSense samples to the watchdog and the validity flag
//! - Evaluates the Down/Up state machine at most once per command interval
//! - Bounds every step with the safety envelope and the move quota
//! - Holds off decisions while a home move is still running
//!
//! State shared with the watchdog task lives in [`SharedState`] behind a
//! blocking mutex; the robot link sits behind an async mutex so both tasks
//! can issue commands.

use core::cell::RefCell;
use core::fmt::Display;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use tracing::{debug, info, trace, warn};

use mindlift_core::config::ControlConfig;
use mindlift_core::input::{BiometricSample, BlinkDebouncer};
use mindlift_core::motion::{Direction, Pose, Proximity};
use mindlift_core::safety::{clamp, MoveQuota, Watchdog};
use mindlift_core::state::{MotionCommand, MotionState, MotionStateMachine, TickInputs};
use mindlift_core::traits::{MotionSink, PoseProvider};
use mindlift_protocol::headset::{parse_record, HeadsetPacket};

use crate::channels::{
    OperatorChannel, OperatorCommand, RecordChannel, SourceEvent, WATCHDOG_TOUCHED,
};

/// State touched by both the controller and the watchdog task
#[derive(Debug)]
pub struct SharedState {
    pub watchdog: Watchdog,
    pub magnet_on: bool,
    pub motion: MotionStateMachine,
}

impl SharedState {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            watchdog: Watchdog::new(config.watchdog_timeout_ms),
            magnet_on: false,
            motion: MotionStateMachine::new(config.threshold),
        }
    }
}

/// Shared state cell
pub type Shared = BlockingMutex<CriticalSectionRawMutex, RefCell<SharedState>>;

/// Robot link shared between tasks
pub type SharedLink<L> = Mutex<CriticalSectionRawMutex, L>;

pub fn shared_state(config: &ControlConfig) -> Shared {
    BlockingMutex::new(RefCell::new(SharedState::new(config)))
}

/// Why the control loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Headset stream closed
    EndOfStream,
    /// Operator asked to quit
    Quit,
}

/// Record-processing loop state
pub struct Controller<'a, L> {
    config: &'a ControlConfig,
    shared: &'a Shared,
    link: &'a SharedLink<L>,
    blinks: BlinkDebouncer,
    quota: MoveQuota,
    sample: BiometricSample,
    valid: bool,
    last_eval_ms: Option<u64>,
    /// End of the settle window after a home move
    settle_until_ms: Option<u64>,
    evaluations: u32,
}

impl<'a, L> Controller<'a, L>
where
    L: PoseProvider + MotionSink<Error = <L as PoseProvider>::Error>,
    <L as PoseProvider>::Error: Display,
{
    pub fn new(config: &'a ControlConfig, shared: &'a Shared, link: &'a SharedLink<L>) -> Self {
        Self {
            config,
            shared,
            link,
            blinks: BlinkDebouncer::new(),
            quota: MoveQuota::new(config.ceilings),
            sample: BiometricSample::default(),
            valid: false,
            last_eval_ms: None,
            settle_until_ms: None,
            evaluations: 0,
        }
    }

    /// Arm the watchdog and optionally return home
    pub async fn start(&mut self, now_ms: u64) {
        self.touch_watchdog(now_ms);
        if self.config.home_on_start {
            self.return_home(now_ms).await;
        }
        info!(
            threshold = self.config.threshold,
            interval_ms = self.config.command_interval_ms,
            "control loop started"
        );
    }

    /// Process records and operator commands until the stream ends or quit
    pub async fn run(
        &mut self,
        records: &RecordChannel,
        operator: &OperatorChannel,
        now_ms: impl Fn() -> u64,
    ) -> ExitReason {
        loop {
            match select(records.receive(), operator.receive()).await {
                Either::First(SourceEvent::Record(line)) => self.on_record(&line, now_ms()).await,
                Either::First(SourceEvent::Closed) => {
                    info!("headset stream ended");
                    return ExitReason::EndOfStream;
                }
                Either::Second(OperatorCommand::Home) => {
                    info!("operator: home");
                    self.return_home(now_ms()).await;
                }
                Either::Second(OperatorCommand::Jog(direction)) => {
                    info!(direction = direction.as_str(), "operator: jog");
                    self.jog(direction, now_ms()).await;
                }
                Either::Second(OperatorCommand::Stop) => {
                    info!("operator: stop");
                    self.send_stop().await;
                }
                Either::Second(OperatorCommand::Quit) => {
                    info!("operator: quit");
                    return ExitReason::Quit;
                }
            }
        }
    }

    /// Handle one raw record
    pub async fn on_record(&mut self, line: &str, now_ms: u64) {
        let packet = match parse_record(line) {
            Ok(packet) => packet,
            Err(e) => {
                trace!(error = %e, "dropping record");
                return;
            }
        };

        self.report_status(&packet);

        if let Some(strength) = packet.blink_strength {
            self.on_blink(strength, now_ms).await;
        }

        if let Some(esense) = packet.esense {
            self.sample = esense.sample();
            self.valid = self.sample.is_valid();
            self.touch_watchdog(now_ms);
            trace!(
                attention = self.sample.attention,
                meditation = self.sample.meditation,
                valid = self.valid,
                "sample"
            );
        }

        if self.evaluation_due(now_ms) {
            self.evaluate(now_ms).await;
        }
    }

    fn report_status(&self, packet: &HeadsetPacket) {
        if let Some(status) = &packet.status {
            info!(status = status.as_str(), "awaiting headset");
        }
        if packet.has_poor_signal() {
            warn!(
                level = packet.poor_signal_level.unwrap_or_default(),
                "poor headset signal, check fitting"
            );
        }
    }

    async fn on_blink(&mut self, strength: u8, now_ms: u64) {
        let fired = self.blinks.observe(
            strength,
            now_ms,
            self.config.blink_threshold,
            self.config.blink_window_ms,
        );
        if !fired {
            return;
        }

        let on = self.shared.lock(|s| {
            let mut s = s.borrow_mut();
            s.magnet_on = !s.magnet_on;
            s.magnet_on
        });

        let result = self
            .link
            .lock()
            .await
            .set_digital_output(self.config.magnet_output, on);
        match result {
            Ok(()) => info!(on, "double blink, magnet toggled"),
            Err(e) => {
                warn!(error = %e, "magnet output failed, keeping previous state");
                self.shared.lock(|s| s.borrow_mut().magnet_on = !on);
            }
        }
    }

    fn touch_watchdog(&self, now_ms: u64) {
        self.shared.lock(|s| s.borrow_mut().watchdog.touch(now_ms));
        WATCHDOG_TOUCHED.signal(());
    }

    fn settling(&self, now_ms: u64) -> bool {
        self.settle_until_ms.is_some_and(|until| now_ms < until)
    }

    fn evaluation_due(&self, now_ms: u64) -> bool {
        if self.settling(now_ms) {
            return false;
        }
        match self.last_eval_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.command_interval_ms,
        }
    }

    /// One state machine tick: read the pose once, decide, execute
    async fn evaluate(&mut self, now_ms: u64) {
        self.last_eval_ms = Some(now_ms);
        self.evaluations += 1;

        let pose = self.link.lock().await.get_pose();
        let pose = match pose {
            Ok(pose) => Some(pose),
            Err(e) => {
                warn!(error = %e, "pose unavailable, holding position");
                None
            }
        };
        let proximity = pose.as_ref().map_or(Proximity::NONE, |pose| {
            Proximity::detect(
                pose,
                &self.config.envelope,
                &self.config.reference_pose,
                &self.config.proximity,
            )
        });

        let (expired, before, after, commands) = self.shared.lock(|s| {
            let mut s = s.borrow_mut();
            let expired = s.watchdog.poll(now_ms);
            let inputs = TickInputs {
                sample: self.sample,
                valid: self.valid,
                stale: s.watchdog.is_stale(),
                proximity,
            };
            let before = s.motion.state();
            let commands = s.motion.evaluate(&inputs);
            (expired, before, s.motion.state(), commands)
        });
        if expired {
            warn!("headset silent, watchdog expired");
        }
        if before != after {
            info!(from = before.as_str(), to = after.as_str(), "turnaround");
        }
        debug!(state = after.as_str(), ?commands, "tick");

        for command in commands {
            self.execute(command, pose.as_ref()).await;
        }
    }

    async fn execute(&mut self, command: MotionCommand, pose: Option<&Pose>) {
        let Some(direction) = command.direction() else {
            self.send_stop().await;
            return;
        };
        let Some(pose) = pose else {
            self.send_stop().await;
            return;
        };
        self.step(direction, pose).await;
    }

    /// Take one bounded step from `pose`
    async fn step(&mut self, direction: Direction, pose: &Pose) {
        let clamped = clamp(direction.step(), pose, &self.config.envelope);
        if clamped.vector.is_zero() {
            debug!(direction = direction.as_str(), "at envelope boundary");
            self.send_stop().await;
            return;
        }
        if !clamped.fully_within {
            debug!(direction = direction.as_str(), "step clamped to envelope");
        }

        if !self.quota.try_consume(direction) {
            info!(
                direction = direction.as_str(),
                ceiling = self.quota.ceiling(direction),
                "move quota exhausted"
            );
            self.send_stop().await;
            return;
        }

        let target = pose.translated(clamped.vector);
        let limits = self.config.limits;
        let result = self
            .link
            .lock()
            .await
            .move_linear(target, limits.acceleration, limits.velocity);
        if let Err(e) = result {
            warn!(error = %e, direction = direction.as_str(), "move failed");
        }
    }

    /// One manual step from the current pose, bounded like any other
    pub async fn jog(&mut self, direction: Direction, now_ms: u64) {
        if self.settling(now_ms) {
            info!(direction = direction.as_str(), "home move in progress, jog ignored");
            return;
        }
        let pose = self.link.lock().await.get_pose();
        match pose {
            Ok(pose) => self.step(direction, &pose).await,
            Err(e) => warn!(error = %e, "pose unavailable, jog skipped"),
        }
    }

    /// Decelerate the arm to a halt
    pub async fn send_stop(&mut self) {
        let deceleration = self.config.limits.stop_deceleration;
        if let Err(e) = self.link.lock().await.stop(deceleration) {
            warn!(error = %e, "stop failed");
        }
    }

    /// Move to the reference pose and reset the move quota
    ///
    /// Step decisions pause for `home_settle_ms` so the move is not cut
    /// short by the next command.
    pub async fn return_home(&mut self, now_ms: u64) {
        let mut link = self.link.lock().await;
        if let Err(e) = link.set_tool_offset(self.config.tool_offset) {
            warn!(error = %e, "tool offset failed");
        }
        let limits = self.config.limits;
        match link.move_linear(
            self.config.reference_pose,
            limits.acceleration,
            limits.velocity,
        ) {
            Ok(()) => {
                self.quota.reset_all();
                self.settle_until_ms = Some(now_ms.saturating_add(self.config.home_settle_ms));
                info!(settle_ms = self.config.home_settle_ms, "returning to reference pose");
            }
            Err(e) => warn!(error = %e, "return home failed, quota kept"),
        }
    }

    /// Cancel the watchdog and issue the final stop
    pub async fn shutdown(&mut self) {
        self.shared.lock(|s| s.borrow_mut().watchdog.cancel());
        self.send_stop().await;
        info!(
            state = self.state().as_str(),
            magnet = self.magnet_on(),
            evaluations = self.evaluations(),
            "control loop stopped"
        );
    }

    pub fn state(&self) -> MotionState {
        self.shared.lock(|s| s.borrow().motion.state())
    }

    pub fn magnet_on(&self) -> bool {
        self.shared.lock(|s| s.borrow().magnet_on)
    }

    #[cfg(test)]
    pub fn quota(&self) -> &MoveQuota {
        &self.quota
    }

    /// State machine evaluations so far
    pub fn evaluations(&self) -> u32 {
        self.evaluations
    }
}
