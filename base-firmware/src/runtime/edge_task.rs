//! Radio edge capture feeding the protocol decoder.

use embassy_stm32::exti::ExtiInput;

use super::{DECODER, now_tick};
use sentry_core::time::EdgeEvent;

/// Timestamps every transition on the receiver line and steps the
/// decoder. This task is the interrupt-context half of the decoder's
/// shared-state contract; the polling loop owns the other half.
#[embassy_executor::task]
pub async fn run(mut rc_input: ExtiInput<'static>) -> ! {
    loop {
        rc_input.wait_for_any_edge().await;
        let event = EdgeEvent::new(now_tick(), rc_input.is_high());
        DECODER.lock(|decoder| decoder.borrow_mut().on_edge(event));
    }
}
