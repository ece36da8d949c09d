//! Ultrasonic round-robin ranging.
//!
//! Three sensors share one timing budget. Each pass drives the active
//! sensor's trigger line high for a short pulse measured by the
//! fast-interval timer, flips the line over to listening, and measures
//! the echo as the width between the returned rising and falling edges.
//! A sensor is never re-triggered until its cycle resolves, which keeps
//! the transducers from hearing each other. A sensor that stays silent
//! past the echo window is abandoned and the round-robin moves on.

use crate::config::{COLLISION_THRESHOLD, ECHO_TIMEOUT};
use crate::time::{EdgeEvent, Tick};

/// One of the three ranging transducers, in round-robin order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sensor {
    Left,
    Center,
    Right,
}

impl Sensor {
    /// Number of transducers fitted.
    pub const COUNT: usize = 3;

    /// Deterministic index for status words and telemetry codes.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            Sensor::Left => 0,
            Sensor::Center => 1,
            Sensor::Right => 2,
        }
    }

    /// Attempts to reconstruct a sensor from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Sensor::Left),
            1 => Some(Sensor::Center),
            2 => Some(Sensor::Right),
            _ => None,
        }
    }

    /// Successor in the round-robin.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Sensor::Left => Sensor::Center,
            Sensor::Center => Sensor::Right,
            Sensor::Right => Sensor::Left,
        }
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Sensor::Left
    }
}

/// Sub-state of the active probe.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ProbePhase {
    /// Trigger pulse being emitted.
    #[default]
    ProbeOut,
    /// Listening for the echo pair.
    ProbeIn,
}

/// Per-probe bookkeeping, reset whenever the round-robin advances.
#[derive(Copy, Clone, Debug, Default)]
struct ProbeCycle {
    phase: ProbePhase,
    probe_sent: bool,
    probe_finished: bool,
    feedback_received: bool,
    rise_seen: bool,
    echo_rise_at: Tick,
    echo_fall_at: Tick,
}

/// Hardware actions the controller requests while cycling a sensor.
pub trait ProbeDriver {
    /// Drives the sensor's trigger line high and arms the pulse timer.
    fn begin_pulse(&mut self, sensor: Sensor);

    /// Drops the trigger line at the end of the pulse window.
    fn end_pulse(&mut self, sensor: Sensor);

    /// Flips the sensor's line to input and enables edge notifications.
    fn listen(&mut self, sensor: Sensor);

    /// Stops edge notifications for the sensor.
    fn unlisten(&mut self, sensor: Sensor);
}

/// Probe driver that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopProbeDriver;

impl ProbeDriver for NoopProbeDriver {
    fn begin_pulse(&mut self, _: Sensor) {}

    fn end_pulse(&mut self, _: Sensor) {}

    fn listen(&mut self, _: Sensor) {}

    fn unlisten(&mut self, _: Sensor) {}
}

/// Obstacle classified from an echo return.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Obstacle {
    /// Sensor that saw the return.
    pub sensor: Sensor,
    /// Measured echo width, in ticks.
    pub echo_ticks: i16,
}

/// Round-robin ranging state machine.
///
/// [`RangingController::poll`] runs from the main loop;
/// [`RangingController::on_pulse_timer`] and
/// [`RangingController::on_echo_edge`] run in interrupt context.
#[derive(Debug)]
pub struct RangingController {
    active: Sensor,
    cycle: ProbeCycle,
    listen_started_at: Tick,
}

impl RangingController {
    /// Creates a controller ready to probe the left sensor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: Sensor::Left,
            cycle: ProbeCycle {
                phase: ProbePhase::ProbeOut,
                probe_sent: false,
                probe_finished: false,
                feedback_received: false,
                rise_seen: false,
                echo_rise_at: Tick::ZERO,
                echo_fall_at: Tick::ZERO,
            },
            listen_started_at: Tick::ZERO,
        }
    }

    /// Sensor currently holding the timing budget.
    #[must_use]
    pub const fn active(&self) -> Sensor {
        self.active
    }

    /// Sub-state of the active probe.
    #[must_use]
    pub const fn phase(&self) -> ProbePhase {
        self.cycle.phase
    }

    /// Pulse-timer expiry: the trigger pulse width has elapsed.
    /// Interrupt context.
    pub fn on_pulse_timer(&mut self) {
        self.cycle.probe_finished = true;
    }

    /// Echo edge capture. Interrupt context.
    ///
    /// The rising edge opens the measurement; the falling edge closes
    /// it and marks the feedback complete. A falling edge with no
    /// preceding rise is ignored.
    pub fn on_echo_edge(&mut self, event: EdgeEvent) {
        if event.level {
            self.cycle.echo_rise_at = event.at;
            self.cycle.rise_seen = true;
        } else if self.cycle.rise_seen {
            self.cycle.echo_fall_at = event.at;
            self.cycle.feedback_received = true;
        }
    }

    /// Advances the cycle one step. Main-loop context.
    ///
    /// Returns the obstacle when the active sensor's echo width crosses
    /// the collision threshold; the round-robin has already moved on by
    /// the time the obstacle is reported.
    pub fn poll<D: ProbeDriver>(&mut self, now: Tick, driver: &mut D) -> Option<Obstacle> {
        match self.cycle.phase {
            ProbePhase::ProbeOut => {
                if !self.cycle.probe_sent {
                    driver.begin_pulse(self.active);
                    self.cycle.probe_sent = true;
                } else if self.cycle.probe_finished {
                    driver.end_pulse(self.active);
                    driver.listen(self.active);
                    self.cycle.phase = ProbePhase::ProbeIn;
                    self.listen_started_at = now;
                }
                None
            }
            ProbePhase::ProbeIn => {
                if self.cycle.feedback_received {
                    driver.unlisten(self.active);
                    let sensor = self.active;
                    let echo_ticks = self.cycle.echo_fall_at.delta(self.cycle.echo_rise_at);
                    self.advance();
                    if i32::from(echo_ticks) > i32::from(COLLISION_THRESHOLD) {
                        return Some(Obstacle { sensor, echo_ticks });
                    }
                    None
                } else if now.exceeds(self.listen_started_at, ECHO_TIMEOUT) {
                    // Silent sensor: abandon the probe, no obstacle.
                    driver.unlisten(self.active);
                    self.advance();
                    None
                } else {
                    None
                }
            }
        }
    }

    fn advance(&mut self) {
        self.active = self.active.next();
        self.cycle = ProbeCycle::default();
    }
}

impl Default for RangingController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use heapless::Vec;

    /// Driver that records every requested action in order.
    #[derive(Default)]
    struct RecordingDriver {
        log: Vec<(&'static str, Sensor), 16>,
    }

    impl ProbeDriver for RecordingDriver {
        fn begin_pulse(&mut self, sensor: Sensor) {
            self.log.push(("begin", sensor)).expect("log capacity");
        }

        fn end_pulse(&mut self, sensor: Sensor) {
            self.log.push(("end", sensor)).expect("log capacity");
        }

        fn listen(&mut self, sensor: Sensor) {
            self.log.push(("listen", sensor)).expect("log capacity");
        }

        fn unlisten(&mut self, sensor: Sensor) {
            self.log.push(("unlisten", sensor)).expect("log capacity");
        }
    }

    fn run_echo(
        controller: &mut RangingController,
        driver: &mut RecordingDriver,
        now: Tick,
        echo_ticks: u16,
    ) -> Option<Obstacle> {
        assert_eq!(controller.poll(now, driver), None); // begin pulse
        controller.on_pulse_timer();
        assert_eq!(controller.poll(now, driver), None); // end pulse, listen
        let rise = now.advance(50);
        controller.on_echo_edge(EdgeEvent::new(rise, true));
        controller.on_echo_edge(EdgeEvent::new(rise.advance(echo_ticks), false));
        controller.poll(rise.advance(echo_ticks), driver)
    }

    #[test]
    fn short_echo_is_clear_and_advances() {
        let mut controller = RangingController::new();
        let mut driver = RecordingDriver::default();

        let result = run_echo(&mut controller, &mut driver, Tick::new(100), 50);
        assert_eq!(result, None);
        assert_eq!(controller.active(), Sensor::Center);
        assert_eq!(
            driver.log.as_slice(),
            [
                ("begin", Sensor::Left),
                ("end", Sensor::Left),
                ("listen", Sensor::Left),
                ("unlisten", Sensor::Left),
            ]
            .as_slice()
        );
    }

    #[test]
    fn wide_echo_reports_obstacle_with_sensor() {
        let mut controller = RangingController::new();
        let mut driver = RecordingDriver::default();

        let result = run_echo(
            &mut controller,
            &mut driver,
            Tick::new(100),
            COLLISION_THRESHOLD + 20,
        );
        let obstacle = result.expect("echo width crosses threshold");
        assert_eq!(obstacle.sensor, Sensor::Left);
        assert_eq!(
            obstacle.echo_ticks,
            i16::try_from(COLLISION_THRESHOLD + 20).expect("fits i16")
        );
        assert_eq!(controller.active(), Sensor::Center);
    }

    #[test]
    fn round_robin_covers_all_sensors() {
        let mut controller = RangingController::new();
        let mut driver = RecordingDriver::default();
        let mut now = Tick::new(0);

        for expected in [Sensor::Left, Sensor::Center, Sensor::Right, Sensor::Left] {
            assert_eq!(controller.active(), expected);
            assert_eq!(run_echo(&mut controller, &mut driver, now, 40), None);
            now = now.advance(2_000);
        }
    }

    #[test]
    fn sensor_not_retriggered_until_cycle_resolves() {
        let mut controller = RangingController::new();
        let mut driver = RecordingDriver::default();
        let now = Tick::new(0);

        assert_eq!(controller.poll(now, &mut driver), None);
        // Pulse timer has not fired; further polls must not touch the
        // hardware again.
        assert_eq!(controller.poll(now, &mut driver), None);
        assert_eq!(controller.poll(now, &mut driver), None);
        assert_eq!(driver.log.as_slice(), [("begin", Sensor::Left)].as_slice());
        assert_eq!(controller.active(), Sensor::Left);
    }

    #[test]
    fn silent_sensor_times_out_without_obstacle() {
        let mut controller = RangingController::new();
        let mut driver = RecordingDriver::default();
        let now = Tick::new(500);

        assert_eq!(controller.poll(now, &mut driver), None);
        controller.on_pulse_timer();
        assert_eq!(controller.poll(now, &mut driver), None);
        assert_eq!(controller.phase(), ProbePhase::ProbeIn);

        // Inside the window the probe keeps waiting.
        let waiting = now.advance(ECHO_TIMEOUT);
        assert_eq!(controller.poll(waiting, &mut driver), None);
        assert_eq!(controller.active(), Sensor::Left);

        let expired = now.advance(ECHO_TIMEOUT + 1);
        assert_eq!(controller.poll(expired, &mut driver), None);
        assert_eq!(controller.active(), Sensor::Center);
        assert_eq!(controller.phase(), ProbePhase::ProbeOut);
    }

    #[test]
    fn stray_falling_edge_does_not_complete_feedback() {
        let mut controller = RangingController::new();
        let mut driver = RecordingDriver::default();
        let now = Tick::new(0);

        assert_eq!(controller.poll(now, &mut driver), None);
        controller.on_pulse_timer();
        assert_eq!(controller.poll(now, &mut driver), None);

        controller.on_echo_edge(EdgeEvent::new(now.advance(10), false));
        assert_eq!(controller.poll(now.advance(20), &mut driver), None);
        assert_eq!(controller.phase(), ProbePhase::ProbeIn);
    }
}
