//! Ultrasonic round-robin cycle.
//!
//! Drives the shared ranging state machine: trigger pulse width comes
//! from a short async timer standing in for the fast-interval hardware
//! timer, echo edges arrive through the packed latch, and classified
//! obstacles flow to the control loop over the obstacle queue.

use defmt::{info, warn};
use embassy_time::{Duration, Ticker, Timer};

use super::{ECHO_EDGES, OBSTACLES, now_tick};
use crate::probes::HardwareProbeDriver;
use crate::status;
use sentry_core::config::{PROBE_PULSE_TICKS, TICK_MICROS};
use sentry_core::ranging::RangingController;

/// Cycle service period while waiting on echoes.
const SERVICE_PERIOD: Duration = Duration::from_micros(200);

/// Trigger pulse width on the wire.
const PULSE_WIDTH: Duration =
    Duration::from_micros(PROBE_PULSE_TICKS as u64 * TICK_MICROS as u64);

#[embassy_executor::task]
pub async fn run(mut driver: HardwareProbeDriver<'static>) -> ! {
    let mut controller = RangingController::new();
    let mut ticker = Ticker::every(SERVICE_PERIOD);

    loop {
        if driver.pulse_pending() {
            Timer::after(PULSE_WIDTH).await;
            controller.on_pulse_timer();
        } else {
            ticker.next().await;
        }

        if let Some(edge) = ECHO_EDGES.take() {
            controller.on_echo_edge(edge);
        }

        if let Some(obstacle) = controller.poll(now_tick(), &mut driver) {
            info!(
                "obstacle on sensor {} ({} ticks)",
                obstacle.sensor.as_index(),
                obstacle.echo_ticks
            );
            status::count_obstacle();
            if OBSTACLES.try_send(obstacle).is_err() {
                warn!("obstacle queue full, report dropped");
            }
        }
    }
}
