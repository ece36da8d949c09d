//! Trigger servo pulse generation.
//!
//! One scheduler slot per compare period, two channels multiplexed on
//! it. The control loop only publishes the commanded width; every
//! output transition happens here.

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Ticker};

use crate::status;
use sentry_core::config::{PWM_SLOT_TICKS, TICK_MICROS};
use sentry_core::pwm::ServoMux;

/// Slot period of the pulse scheduler.
const SLOT_PERIOD: Duration = Duration::from_micros(PWM_SLOT_TICKS as u64 * TICK_MICROS as u64);

#[embassy_executor::task]
pub async fn run(mut primary: Output<'static>, mut secondary: Output<'static>) -> ! {
    let mut mux = ServoMux::<2>::new();
    let mut ticker = Ticker::every(SLOT_PERIOD);

    loop {
        ticker.next().await;

        let width = status::trigger_width();
        mux.set_width(0, width.slots())
            .expect("commanded width fits servo frame");
        mux.set_width(1, width.complement().slots())
            .expect("complement width fits servo frame");

        let [primary_level, secondary_level] = mux.step();
        set(&mut primary, primary_level);
        set(&mut secondary, secondary_level);
    }
}

fn set(pin: &mut Output<'_>, level: bool) {
    if level {
        pin.set_high();
    } else {
        pin.set_low();
    }
}
