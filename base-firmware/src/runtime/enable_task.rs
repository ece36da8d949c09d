//! Soft-PWM motor enable pulser.
//!
//! The enable pair toggles between an active and a rest phase with
//! asymmetric durations; a stopped motion parks both lines low without
//! disturbing the pulser's phase timing.

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};

use crate::status;
use sentry_core::config::TICK_MICROS;
use sentry_core::pursuit::Motion;
use sentry_core::pwm::EnablePulser;

#[embassy_executor::task]
pub async fn run(mut enables: [Output<'static>; 2]) -> ! {
    let mut pulser = EnablePulser::new();
    loop {
        let (level, hold_ticks) = pulser.step();
        let driven = level && status::motion() != Motion::Stop;
        for enable in &mut enables {
            if driven {
                enable.set_high();
            } else {
                enable.set_low();
            }
        }
        Timer::after(Duration::from_micros(
            u64::from(hold_ticks) * u64::from(TICK_MICROS),
        ))
        .await;
    }
}
