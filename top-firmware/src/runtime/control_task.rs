//! Search, evasion, trigger, and mode arbitration loop.
//!
//! The poll leg samples the selector, the target detectors, and the
//! obstacle queue, then publishes motion, trigger width, and status
//! color. The slow leg advances every timed phase, standing in for the
//! 250 ms compare-match; it is gated on machines that are actually
//! counting, so an idle system leaves the timer parked.

use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};

use super::{OBSTACLES, StatusLamp, now_tick};
use crate::motion_port::MotionPort;
use crate::status;
use sentry_core::config::{SLOW_TICK_TICKS, TICK_MICROS};
use sentry_core::mode::{ModeCoordinator, StatusColor, SystemMode};
use sentry_core::pursuit::{Motion, PursuitFsm, PursuitState, TargetSnapshot};
use sentry_core::telemetry::{EventKind, TelemetryRecorder};
use sentry_core::trigger::{TriggerFsm, TriggerState, effective_pull};

/// Polling period of the control loop.
const POLL_PERIOD: Duration = Duration::from_millis(10);

/// Period of the slow phase timer (one compare-match interval).
const SLOW_PERIOD: Duration = Duration::from_micros(SLOW_TICK_TICKS as u64 * TICK_MICROS as u64);

#[embassy_executor::task]
pub async fn run(
    mode_select: Input<'static>,
    manual_pull: Input<'static>,
    target_detectors: [Input<'static>; 3],
    mut lamp: StatusLamp<'static>,
    mut motion_port: MotionPort<'static>,
) -> ! {
    let mut pursuit = PursuitFsm::new();
    let mut trigger = TriggerFsm::new();
    let mut mode = ModeCoordinator::new();
    let mut telemetry = TelemetryRecorder::new();
    let mut last_mode = None;

    let mut slow = Ticker::every(SLOW_PERIOD);
    let mut poll = Ticker::every(POLL_PERIOD);

    loop {
        match select(slow.next(), poll.next()).await {
            Either::First(()) => {
                let was_evading = matches!(pursuit.state(), PursuitState::Evade { .. });
                if pursuit.wants_slow_tick() {
                    pursuit.on_slow_tick();
                }
                if was_evading && !matches!(pursuit.state(), PursuitState::Evade { .. }) {
                    info!("evasion complete, resuming search");
                    telemetry.record(EventKind::EvasionCompleted, now_tick());
                }
                if trigger.wants_slow_tick() {
                    trigger.on_slow_tick();
                }
            }
            Either::Second(()) => {
                let now = now_tick();
                let auto = mode_select.is_high();
                mode.observe_selector(auto);

                while let Ok(obstacle) = OBSTACLES.try_receive() {
                    if auto && pursuit.begin_evasion(obstacle.sensor) {
                        info!("evading sensor {}", obstacle.sensor.as_index());
                        telemetry.record(EventKind::EvasionStarted(obstacle.sensor), now);
                    }
                }

                let targets = TargetSnapshot {
                    left: target_detectors[0].is_high(),
                    center: target_detectors[1].is_high(),
                    right: target_detectors[2].is_high(),
                };

                let motion = if auto {
                    pursuit.poll(targets)
                } else {
                    pursuit.reset();
                    Motion::Stop
                };

                let system_mode = mode.system_mode(targets.center);
                if last_mode != Some(system_mode) {
                    info!("mode {}", system_mode.as_index());
                    telemetry.record(EventKind::ModeChanged(system_mode), now);
                    last_mode = Some(system_mode);
                }

                let was_standby = matches!(trigger.state(), TriggerState::Standby);
                trigger.poll(effective_pull(
                    auto,
                    matches!(system_mode, SystemMode::Engaged),
                    manual_pull.is_high(),
                ));
                if was_standby && matches!(trigger.state(), TriggerState::Pulled) {
                    info!("trigger pulled");
                    telemetry.record(EventKind::TriggerPulled, now);
                }

                status::record_mode(system_mode);
                status::record_trigger_width(trigger.pulse_width());
                lamp.apply(StatusColor::for_mode(system_mode));
                motion_port.apply(motion);
            }
        }
    }
}
