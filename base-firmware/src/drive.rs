//! Motor output mapping for the drive board.
//!
//! The differential drive takes a direction level per wheel side plus a
//! shared pair of enable lines that the soft-PWM pulser toggles. The
//! mapping from a motion command to wheel levels is pure so it tests on
//! the host; only the pin writes are target-gated.

use sentry_core::pursuit::Motion;

/// Direction levels for the two wheel channels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct WheelDrive {
    pub left_forward: bool,
    pub left_reverse: bool,
    pub right_forward: bool,
    pub right_reverse: bool,
}

/// Maps a motion command onto the wheel direction lines.
#[must_use]
pub const fn wheel_drive(motion: Motion) -> WheelDrive {
    match motion {
        Motion::Stop => WheelDrive {
            left_forward: false,
            left_reverse: false,
            right_forward: false,
            right_reverse: false,
        },
        Motion::Forward => WheelDrive {
            left_forward: true,
            left_reverse: false,
            right_forward: true,
            right_reverse: false,
        },
        Motion::Reverse => WheelDrive {
            left_forward: false,
            left_reverse: true,
            right_forward: false,
            right_reverse: true,
        },
        Motion::TurnLeft => WheelDrive {
            left_forward: false,
            left_reverse: true,
            right_forward: true,
            right_reverse: false,
        },
        Motion::TurnRight => WheelDrive {
            left_forward: true,
            left_reverse: false,
            right_forward: false,
            right_reverse: true,
        },
    }
}

/// Decodes the top board's motion command lines; an unknown code reads
/// as the safe stop.
#[must_use]
pub fn motion_from_lines(levels: [bool; 3]) -> Motion {
    let code = levels
        .iter()
        .enumerate()
        .fold(0_u8, |code, (bit, level)| code | u8::from(*level) << bit);
    Motion::from_code(code).unwrap_or(Motion::Stop)
}

#[cfg(target_os = "none")]
pub use hardware::MotorDriver;

#[cfg(target_os = "none")]
mod hardware {
    use embassy_stm32::gpio::Output;

    use super::{WheelDrive, wheel_drive};
    use sentry_core::pursuit::Motion;

    /// Direction outputs feeding the H-bridges.
    pub struct MotorDriver<'d> {
        left_forward: Output<'d>,
        left_reverse: Output<'d>,
        right_forward: Output<'d>,
        right_reverse: Output<'d>,
    }

    impl<'d> MotorDriver<'d> {
        pub fn new(
            left_forward: Output<'d>,
            left_reverse: Output<'d>,
            right_forward: Output<'d>,
            right_reverse: Output<'d>,
        ) -> Self {
            Self {
                left_forward,
                left_reverse,
                right_forward,
                right_reverse,
            }
        }

        /// Applies a motion command to the direction lines.
        pub fn apply(&mut self, motion: Motion) {
            let WheelDrive {
                left_forward,
                left_reverse,
                right_forward,
                right_reverse,
            } = wheel_drive(motion);
            set(&mut self.left_forward, left_forward);
            set(&mut self.left_reverse, left_reverse);
            set(&mut self.right_forward, right_forward);
            set(&mut self.right_reverse, right_reverse);
        }
    }

    fn set(pin: &mut Output<'_>, level: bool) {
        if level {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_releases_every_direction_line() {
        assert_eq!(wheel_drive(Motion::Stop), WheelDrive::default());
    }

    #[test]
    fn turns_counter_rotate_the_wheels() {
        let left = wheel_drive(Motion::TurnLeft);
        assert!(left.left_reverse && left.right_forward);
        assert!(!left.left_forward && !left.right_reverse);

        let right = wheel_drive(Motion::TurnRight);
        assert!(right.left_forward && right.right_reverse);
        assert!(!right.left_reverse && !right.right_forward);
    }

    #[test]
    fn no_mapping_drives_a_side_both_ways() {
        for motion in [
            Motion::Stop,
            Motion::Forward,
            Motion::Reverse,
            Motion::TurnLeft,
            Motion::TurnRight,
        ] {
            let drive = wheel_drive(motion);
            assert!(!(drive.left_forward && drive.left_reverse), "{motion:?}");
            assert!(!(drive.right_forward && drive.right_reverse), "{motion:?}");
        }
    }

    #[test]
    fn line_decoding_round_trips_every_motion() {
        for code in 0..5_u8 {
            let motion = Motion::from_code(code).expect("code in range");
            let levels = [code & 1 != 0, code & 2 != 0, code & 4 != 0];
            assert_eq!(motion_from_lines(levels), motion);
        }
    }

    #[test]
    fn unknown_line_code_reads_as_stop() {
        assert_eq!(motion_from_lines([true, false, true]), Motion::Stop);
        assert_eq!(motion_from_lines([true, true, true]), Motion::Stop);
    }
}
