//! Rate-limited firing trigger.
//!
//! A pull holds the actuator engaged for a fixed count of slow ticks,
//! then a longer cooldown must fully elapse before the next pull is
//! accepted. The commanded servo width is derived purely from the
//! current state, giving the mechanism exactly two positions.

use crate::config::{
    COOLDOWN_DELAY_TICKS, PULL_DELAY_TICKS, SERVO_NARROW_SLOTS, SERVO_WIDE_SLOTS,
};

/// Firing mechanism state.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TriggerState {
    /// Armed and waiting for a pull.
    #[default]
    Standby,
    /// Actuator engaged.
    Pulled,
    /// Mandatory rest before re-arming.
    Cooldown,
}

/// Actuator servo command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PulseWidth {
    /// Rest position.
    Narrow,
    /// Engaged position.
    Wide,
}

impl PulseWidth {
    /// Servo high time, in scheduler slots.
    #[must_use]
    pub const fn slots(self) -> u8 {
        match self {
            PulseWidth::Narrow => SERVO_NARROW_SLOTS,
            PulseWidth::Wide => SERVO_WIDE_SLOTS,
        }
    }

    /// Width the paired servo takes; the two always move opposite.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            PulseWidth::Narrow => PulseWidth::Wide,
            PulseWidth::Wide => PulseWidth::Narrow,
        }
    }
}

/// Effective pull condition: autonomous engage under auto mode, the
/// momentary operator input under manual mode.
#[must_use]
pub const fn effective_pull(auto: bool, auto_engage: bool, manual_pull: bool) -> bool {
    if auto { auto_engage } else { manual_pull }
}

/// Pull/cooldown state machine.
///
/// [`TriggerFsm::poll`] runs in the main loop;
/// [`TriggerFsm::on_slow_tick`] runs from the 250 ms compare-match.
#[derive(Debug, Default)]
pub struct TriggerFsm {
    state: TriggerState,
    counter: u8,
}

impl TriggerFsm {
    /// Creates a trigger in standby.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: TriggerState::Standby,
            counter: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TriggerState {
        self.state
    }

    /// Servo command derived purely from the current state.
    #[must_use]
    pub const fn pulse_width(&self) -> PulseWidth {
        match self.state {
            TriggerState::Pulled => PulseWidth::Wide,
            TriggerState::Standby | TriggerState::Cooldown => PulseWidth::Narrow,
        }
    }

    /// `true` while the pull or cooldown delay needs the slow timer.
    #[must_use]
    pub const fn wants_slow_tick(&self) -> bool {
        !matches!(self.state, TriggerState::Standby)
    }

    /// Samples the pull condition. Main-loop context.
    ///
    /// A pull held across states is idempotent: only standby accepts
    /// it, so one condition yields one actuation per cycle.
    pub fn poll(&mut self, pull: bool) {
        if matches!(self.state, TriggerState::Standby) && pull {
            self.state = TriggerState::Pulled;
            self.counter = 0;
        }
    }

    /// Advances the live delay. Slow compare-match context.
    pub fn on_slow_tick(&mut self) {
        match self.state {
            TriggerState::Standby => {}
            TriggerState::Pulled => {
                self.counter += 1;
                if self.counter >= PULL_DELAY_TICKS {
                    self.state = TriggerState::Cooldown;
                    self.counter = 0;
                }
            }
            TriggerState::Cooldown => {
                self.counter += 1;
                if self.counter >= COOLDOWN_DELAY_TICKS {
                    self.state = TriggerState::Standby;
                    self.counter = 0;
                }
            }
        }
    }
}
