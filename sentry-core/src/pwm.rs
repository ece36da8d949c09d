//! Compare-match pulse generation.
//!
//! One hardware compare channel fans out to several logical outputs. A
//! free-running slot counter advances on every compare-match interrupt
//! (the handler re-arms the compare register by
//! [`PWM_SLOT_TICKS`](crate::config::PWM_SLOT_TICKS)) and each channel
//! drives high while the counter sits below its configured width, so
//! independent pulse trains share a single timer resource. Output
//! transitions happen only on the interrupt path; the polling loop is
//! limited to writing width parameters.

use crate::config::{ENABLE_HIGH_TICKS, ENABLE_LOW_TICKS, SERVO_FRAME_SLOTS, SERVO_NARROW_SLOTS};

/// Rejected pulse-width configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PwmConfigError {
    /// Requested width does not fit in the servo frame.
    WidthExceedsFrame,
}

/// Time-division multiplexer mapping one compare channel onto
/// `CHANNELS` servo outputs.
#[derive(Clone, Debug)]
pub struct ServoMux<const CHANNELS: usize> {
    counter: u8,
    widths: [u8; CHANNELS],
}

impl<const CHANNELS: usize> ServoMux<CHANNELS> {
    /// Creates a multiplexer with every channel at the narrow width.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: 0,
            widths: [SERVO_NARROW_SLOTS; CHANNELS],
        }
    }

    /// Sets a channel's high time, in scheduler slots.
    pub fn set_width(&mut self, channel: usize, slots: u8) -> Result<(), PwmConfigError> {
        if slots > SERVO_FRAME_SLOTS {
            return Err(PwmConfigError::WidthExceedsFrame);
        }
        self.widths[channel] = slots;
        Ok(())
    }

    /// Currently configured width for a channel, in slots.
    #[must_use]
    pub const fn width(&self, channel: usize) -> u8 {
        self.widths[channel]
    }

    /// Advances one slot and reports every channel's output level.
    /// Compare-match interrupt context.
    pub fn step(&mut self) -> [bool; CHANNELS] {
        let mut levels = [false; CHANNELS];
        for (level, width) in levels.iter_mut().zip(self.widths.iter()) {
            *level = self.counter < *width;
        }
        self.counter += 1;
        if self.counter == SERVO_FRAME_SLOTS {
            self.counter = 0;
        }
        levels
    }
}

impl<const CHANNELS: usize> Default for ServoMux<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-phase soft PWM for the motor enable lines.
///
/// Alternates an active phase and a rest phase with asymmetric
/// durations; the caller re-arms its compare register by the returned
/// tick count after applying the level.
#[derive(Clone, Debug, Default)]
pub struct EnablePulser {
    active: bool,
}

impl EnablePulser {
    /// Creates a pulser starting in the rest phase.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: false }
    }

    /// Toggles phase; returns the new level and the tick count until
    /// the next toggle.
    pub fn step(&mut self) -> (bool, u16) {
        self.active = !self.active;
        if self.active {
            (true, ENABLE_HIGH_TICKS)
        } else {
            (false, ENABLE_LOW_TICKS)
        }
    }

    /// Level currently applied to the enable lines.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SERVO_WIDE_SLOTS;

    #[test]
    fn channel_high_for_exactly_configured_slots() {
        let mut mux = ServoMux::<2>::new();
        mux.set_width(0, SERVO_WIDE_SLOTS).expect("width fits frame");
        mux.set_width(1, SERVO_NARROW_SLOTS)
            .expect("width fits frame");

        for frame in 0..3 {
            let mut highs = [0_u32; 2];
            for slot in 0..SERVO_FRAME_SLOTS {
                let levels = mux.step();
                for (channel, level) in levels.iter().enumerate() {
                    if *level {
                        highs[channel] += 1;
                    }
                    // High slots are the leading ones of the frame.
                    assert_eq!(*level, slot < mux.width(channel), "frame {frame} slot {slot}");
                }
            }
            assert_eq!(highs[0], u32::from(SERVO_WIDE_SLOTS));
            assert_eq!(highs[1], u32::from(SERVO_NARROW_SLOTS));
        }
    }

    #[test]
    fn every_width_up_to_frame_holds_exactly() {
        for width in 0..=SERVO_FRAME_SLOTS {
            let mut mux = ServoMux::<1>::new();
            mux.set_width(0, width).expect("width fits frame");
            let mut highs = 0_u32;
            for _ in 0..SERVO_FRAME_SLOTS {
                if mux.step()[0] {
                    highs += 1;
                }
            }
            assert_eq!(highs, u32::from(width), "width {width}");
        }
    }

    #[test]
    fn full_width_channel_never_drops() {
        let mut mux = ServoMux::<1>::new();
        mux.set_width(0, SERVO_FRAME_SLOTS).expect("width fits frame");
        for _ in 0..u32::from(SERVO_FRAME_SLOTS) * 2 {
            assert!(mux.step()[0]);
        }
    }

    #[test]
    fn oversized_width_is_rejected() {
        let mut mux = ServoMux::<1>::new();
        assert_eq!(
            mux.set_width(0, SERVO_FRAME_SLOTS + 1),
            Err(PwmConfigError::WidthExceedsFrame)
        );
        assert_eq!(mux.width(0), SERVO_NARROW_SLOTS);
    }

    #[test]
    fn width_change_applies_from_next_slot() {
        let mut mux = ServoMux::<1>::new();
        mux.set_width(0, 0).expect("zero width fits");
        assert!(!mux.step()[0]);
        mux.set_width(0, SERVO_FRAME_SLOTS).expect("width fits frame");
        assert!(mux.step()[0]);
    }

    #[test]
    fn pulser_alternates_asymmetric_phases() {
        let mut pulser = EnablePulser::new();
        assert!(!pulser.is_active());

        let (level, hold) = pulser.step();
        assert!(level);
        assert_eq!(hold, ENABLE_HIGH_TICKS);
        assert!(pulser.is_active());

        let (level, hold) = pulser.step();
        assert!(!level);
        assert_eq!(hold, ENABLE_LOW_TICKS);
    }
}
