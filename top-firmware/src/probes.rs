//! Hardware probe driver for the ultrasonic transducers.
//!
//! Trigger lines are plain outputs; echo observation is advertised
//! through the shared status word so the echo-capture task knows which
//! line's transitions to publish.

use embassy_stm32::gpio::Output;

use crate::status;
use sentry_core::ranging::{ProbeDriver, Sensor};

/// Trigger outputs plus the pending-pulse handshake with the ranging
/// task's short-interval timer.
pub struct HardwareProbeDriver<'d> {
    triggers: [Output<'d>; Sensor::COUNT],
    pulse_pending: bool,
}

impl<'d> HardwareProbeDriver<'d> {
    pub fn new(triggers: [Output<'d>; Sensor::COUNT]) -> Self {
        Self {
            triggers,
            pulse_pending: false,
        }
    }

    /// `true` while a trigger pulse awaits its width timer.
    pub fn pulse_pending(&self) -> bool {
        self.pulse_pending
    }
}

impl<'d> ProbeDriver for HardwareProbeDriver<'d> {
    fn begin_pulse(&mut self, sensor: Sensor) {
        self.triggers[sensor.as_index()].set_high();
        self.pulse_pending = true;
    }

    fn end_pulse(&mut self, sensor: Sensor) {
        self.triggers[sensor.as_index()].set_low();
        self.pulse_pending = false;
    }

    fn listen(&mut self, sensor: Sensor) {
        status::record_listening(Some(sensor));
    }

    fn unlisten(&mut self, _: Sensor) {
        status::record_listening(None);
    }
}
