#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the top board.
//!
//! Lightweight atomics bridge the ranging, control, and servo tasks:
//! which echo line is being listened to, the commanded trigger width,
//! the derived system mode, and a running obstacle count.

use portable_atomic::{AtomicU8, AtomicU32, Ordering};
use sentry_core::mode::SystemMode;
use sentry_core::ranging::Sensor;
use sentry_core::trigger::PulseWidth;

const LISTEN_NONE: u8 = u8::MAX;
const WIDTH_WIDE: u8 = 1;

/// Echo line currently under observation ([`LISTEN_NONE`] when idle).
static LISTENING: AtomicU8 = AtomicU8::new(LISTEN_NONE);
/// Commanded trigger servo width (0 narrow, 1 wide).
static TRIGGER_WIDTH: AtomicU8 = AtomicU8::new(0);
/// Index of the derived system mode.
static MODE: AtomicU8 = AtomicU8::new(0);
/// Obstacles classified since power-on.
static OBSTACLE_COUNT: AtomicU32 = AtomicU32::new(0);

/// Records which sensor's echo line the ranging cycle watches.
pub fn record_listening(sensor: Option<Sensor>) {
    let stored = sensor.map_or(LISTEN_NONE, |sensor| sensor.as_index() as u8);
    LISTENING.store(stored, Ordering::Relaxed);
}

/// Sensor currently being listened to, if any.
#[must_use]
pub fn listening() -> Option<Sensor> {
    match LISTENING.load(Ordering::Relaxed) {
        LISTEN_NONE => None,
        index => Sensor::from_index(usize::from(index)),
    }
}

/// Records the trigger servo command for the PWM task.
pub fn record_trigger_width(width: PulseWidth) {
    let stored = match width {
        PulseWidth::Narrow => 0,
        PulseWidth::Wide => WIDTH_WIDE,
    };
    TRIGGER_WIDTH.store(stored, Ordering::Relaxed);
}

/// Trigger servo command as last published by the control loop.
#[must_use]
pub fn trigger_width() -> PulseWidth {
    if TRIGGER_WIDTH.load(Ordering::Relaxed) == WIDTH_WIDE {
        PulseWidth::Wide
    } else {
        PulseWidth::Narrow
    }
}

/// Records the derived system mode.
pub fn record_mode(mode: SystemMode) {
    MODE.store(mode.as_index() as u8, Ordering::Relaxed);
}

/// Most recently derived system mode.
#[must_use]
pub fn mode() -> SystemMode {
    SystemMode::from_index(usize::from(MODE.load(Ordering::Relaxed))).unwrap_or(SystemMode::Init)
}

/// Counts one classified obstacle.
pub fn count_obstacle() {
    OBSTACLE_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Obstacles classified since power-on.
#[must_use]
pub fn obstacle_count() -> u32 {
    OBSTACLE_COUNT.load(Ordering::Relaxed)
}
