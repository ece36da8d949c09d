//! Motion command lines toward the base board.
//!
//! The selected motion leaves the board as a 3-bit code; the base board
//! decodes unknown codes as stop, so a glitched line degrades safely.

use sentry_core::pursuit::Motion;

/// Levels for the three command lines, lowest bit first.
#[must_use]
pub const fn line_levels(motion: Motion) -> [bool; 3] {
    let code = motion.as_code();
    [code & 1 != 0, code & 2 != 0, code & 4 != 0]
}

#[cfg(target_os = "none")]
pub use hardware::MotionPort;

#[cfg(target_os = "none")]
mod hardware {
    use embassy_stm32::gpio::Output;

    use super::line_levels;
    use sentry_core::pursuit::Motion;

    /// Output pins carrying the motion code.
    pub struct MotionPort<'d> {
        lines: [Output<'d>; 3],
    }

    impl<'d> MotionPort<'d> {
        pub fn new(lines: [Output<'d>; 3]) -> Self {
            Self { lines }
        }

        /// Drives the code for the given motion onto the lines.
        pub fn apply(&mut self, motion: Motion) {
            for (line, level) in self.lines.iter_mut().zip(line_levels(motion)) {
                if level {
                    line.set_high();
                } else {
                    line.set_low();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_encode_the_wire_code() {
        for code in 0..5_u8 {
            let motion = Motion::from_code(code).expect("code in range");
            let levels = line_levels(motion);
            let reassembled = u8::from(levels[0]) | u8::from(levels[1]) << 1 | u8::from(levels[2]) << 2;
            assert_eq!(reassembled, code);
        }
    }

    #[test]
    fn stop_parks_every_line_low() {
        assert_eq!(line_levels(Motion::Stop), [false, false, false]);
    }
}
