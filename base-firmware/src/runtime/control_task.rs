//! Decode/drive polling loop for the base board.
//!
//! Every pass runs the decoder's void check, arbitrates manual versus
//! autonomous drive, and applies the result to the motor direction
//! lines. In auto mode the top board owns motion through its command
//! lines; the radio is reduced to the mode toggle.

use defmt::info;
use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};

use super::{DECODER, now_tick};
use crate::drive::{MotorDriver, motion_from_lines};
use crate::status;
use sentry_core::mode::{ModeCoordinator, manual_motion};
use sentry_core::telemetry::{EventKind, TelemetryRecorder};

/// Polling period of the drive loop.
const POLL_PERIOD: Duration = Duration::from_millis(5);

#[embassy_executor::task]
pub async fn run(mut motors: MotorDriver<'static>, motion_lines: [Input<'static>; 3]) -> ! {
    let mut mode = ModeCoordinator::new();
    let mut telemetry = TelemetryRecorder::new();
    let mut last_command = None;
    let mut ticker = Ticker::every(POLL_PERIOD);

    loop {
        ticker.next().await;
        let now = now_tick();

        let command = DECODER.lock(|decoder| decoder.borrow_mut().poll(now));
        if last_command != Some(command) {
            info!("rc command {}", command.as_index());
            telemetry.record(EventKind::CommandDecoded(command), now);
            last_command = Some(command);
        }

        mode.observe_command(command);
        let motion = if mode.is_auto() {
            motion_from_lines([
                motion_lines[0].is_high(),
                motion_lines[1].is_high(),
                motion_lines[2].is_high(),
            ])
        } else {
            manual_motion(command)
        };

        status::record_command(command);
        status::record_auto(mode.is_auto());
        status::record_motion(motion);
        motors.apply(motion);
    }
}
