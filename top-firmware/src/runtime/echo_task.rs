//! Echo edge capture for the ultrasonic transducers.
//!
//! Only transitions on the line the ranging cycle is actively listening
//! to are published; anything else on the shared echo bank is noise
//! from sensors outside their window.

use embassy_futures::select::{Either3, select3};
use embassy_stm32::exti::ExtiInput;

use super::{ECHO_EDGES, now_tick};
use crate::status;
use sentry_core::ranging::Sensor;
use sentry_core::time::EdgeEvent;

#[embassy_executor::task]
pub async fn run(
    mut left: ExtiInput<'static>,
    mut center: ExtiInput<'static>,
    mut right: ExtiInput<'static>,
) -> ! {
    loop {
        let (sensor, level) = match select3(
            left.wait_for_any_edge(),
            center.wait_for_any_edge(),
            right.wait_for_any_edge(),
        )
        .await
        {
            Either3::First(()) => (Sensor::Left, left.is_high()),
            Either3::Second(()) => (Sensor::Center, center.is_high()),
            Either3::Third(()) => (Sensor::Right, right.is_high()),
        };

        if status::listening() == Some(sensor) {
            ECHO_EDGES.publish(EdgeEvent::new(now_tick(), level));
        }
    }
}
