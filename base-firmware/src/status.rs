#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the base board.
//!
//! Lightweight atomics carry the decoded command, the commanded motion,
//! and the mode flag between tasks so the enable pulser and any debug
//! surface can read them without touching task-owned state.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};
use sentry_core::decoder::Command;
use sentry_core::pursuit::Motion;

/// Index of the most recently decoded command.
static LAST_COMMAND: AtomicU8 = AtomicU8::new(0);
/// Wire code of the motion currently applied to the motors.
static MOTION: AtomicU8 = AtomicU8::new(0);
/// Mirrors the mode coordinator's auto flag.
static AUTO: AtomicBool = AtomicBool::new(false);

/// Records the decoded command for observers.
pub fn record_command(command: Command) {
    LAST_COMMAND.store(command.as_index() as u8, Ordering::Relaxed);
}

/// Most recently decoded command.
#[must_use]
pub fn command() -> Command {
    Command::from_index(usize::from(LAST_COMMAND.load(Ordering::Relaxed)))
        .unwrap_or(Command::Stop)
}

/// Records the motion handed to the motor driver.
pub fn record_motion(motion: Motion) {
    MOTION.store(motion.as_code(), Ordering::Relaxed);
}

/// Motion currently commanded; unknown stored codes read as stop.
#[must_use]
pub fn motion() -> Motion {
    Motion::from_code(MOTION.load(Ordering::Relaxed)).unwrap_or(Motion::Stop)
}

/// Records the auto/manual flag.
pub fn record_auto(auto: bool) {
    AUTO.store(auto, Ordering::Relaxed);
}

/// `true` while autonomy owns the motors.
#[must_use]
pub fn is_auto() -> bool {
    AUTO.load(Ordering::Relaxed)
}
