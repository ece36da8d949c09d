//! One-time transducer warm-up hold at power-on.

use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Instant, Timer};

/// How long the sensors get to settle before the first mode evaluation.
pub const WARMUP_HOLD: Duration = Duration::from_secs(60);

/// Override poll period during the hold.
const CHECK_PERIOD: Duration = Duration::from_millis(50);

/// Waits out the warm-up window; pulling the skip input low ends the
/// hold early for bench work.
pub async fn hold(skip: &Input<'_>) {
    let deadline = Instant::now() + WARMUP_HOLD;
    while Instant::now() < deadline {
        if skip.is_low() {
            break;
        }
        Timer::after(CHECK_PERIOD).await;
    }
}
