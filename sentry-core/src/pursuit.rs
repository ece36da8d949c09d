//! Autonomous target search and obstacle evasion.
//!
//! With no target in view the turret sweeps: a 90-degree turn in the
//! last search direction, escalating to alternating 180-degree turns
//! the opposite way. Sweep durations are open-loop tick counts on the
//! shared 250 ms phase timer, so the machine makes progress even with
//! every sensor dark. A centered target engages forward pursuit; an
//! obstacle report preempts the sweep with a two-phase evasion that
//! saves the interrupted state and restores it when its own counter
//! expires. Nothing else can end an evasion once it starts.

use crate::config::{
    ENGAGED_HOLD_TICKS, EVADE_CENTER_TURN_TICKS, EVADE_CLEAR_TICKS, EVADE_TURN_TICKS,
    SWEEP_90_TICKS, SWEEP_180_TICKS,
};
use crate::ranging::Sensor;

/// Drive command presented to the motor outputs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Motion {
    #[default]
    Stop,
    Forward,
    Reverse,
    TurnLeft,
    TurnRight,
}

impl Motion {
    /// Wire code driven onto the motor command lines.
    #[must_use]
    pub const fn as_code(self) -> u8 {
        match self {
            Motion::Stop => 0,
            Motion::Forward => 1,
            Motion::Reverse => 2,
            Motion::TurnLeft => 3,
            Motion::TurnRight => 4,
        }
    }

    /// Attempts to reconstruct a motion from its wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Motion::Stop),
            1 => Some(Motion::Forward),
            2 => Some(Motion::Reverse),
            3 => Some(Motion::TurnLeft),
            4 => Some(Motion::TurnRight),
            _ => None,
        }
    }
}

/// One open-loop search turn.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sweep {
    Left90,
    Right90,
    Left180,
    Right180,
}

impl Sweep {
    const fn motion(self) -> Motion {
        match self {
            Sweep::Left90 | Sweep::Left180 => Motion::TurnLeft,
            Sweep::Right90 | Sweep::Right180 => Motion::TurnRight,
        }
    }

    const fn duration(self) -> u8 {
        match self {
            Sweep::Left90 | Sweep::Right90 => SWEEP_90_TICKS,
            Sweep::Left180 | Sweep::Right180 => SWEEP_180_TICKS,
        }
    }

    /// Sweep following a completed one: a 90 escalates to a 180 the
    /// opposite way, 180s then alternate.
    const fn next(self) -> Sweep {
        match self {
            Sweep::Left90 | Sweep::Left180 => Sweep::Right180,
            Sweep::Right90 | Sweep::Right180 => Sweep::Left180,
        }
    }
}

/// Evasion sub-phase.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EvadePhase {
    /// Turning away from the detecting sensor.
    Turning,
    /// Pushing forward past the obstacle.
    Clearing,
}

/// Live pursuit state; exactly one variant holds at any instant.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PursuitState {
    /// Idle between sweeps.
    #[default]
    Standby,
    /// Open-loop search turn in progress.
    Search(Sweep),
    /// Obstacle evasion in progress; exits only via its counter.
    Evade { sensor: Sensor, phase: EvadePhase },
    /// Target centered; pushing forward.
    Engaged,
}

/// Target detector levels sampled each polling pass.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TargetSnapshot {
    pub left: bool,
    pub center: bool,
    pub right: bool,
}

/// Last commanded search direction, seeding the next sweep.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
enum Side {
    #[default]
    Left,
    Right,
}

/// Search/evasion state machine.
///
/// [`PursuitFsm::poll`] runs in the main loop and returns the motion to
/// drive; [`PursuitFsm::on_slow_tick`] runs from the 250 ms
/// compare-match and advances every timed phase.
#[derive(Debug, Default)]
pub struct PursuitFsm {
    state: PursuitState,
    saved: PursuitState,
    counter: u8,
    evade_counter: u8,
    last_direction: Side,
}

impl PursuitFsm {
    /// Creates a machine in standby, biased to sweep left first.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PursuitState::Standby,
            saved: PursuitState::Standby,
            counter: 0,
            evade_counter: 0,
            last_direction: Side::Left,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PursuitState {
        self.state
    }

    /// `true` while the target sits centered in front.
    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        matches!(self.state, PursuitState::Engaged)
    }

    /// `true` while any timed phase needs the slow timer armed.
    #[must_use]
    pub const fn wants_slow_tick(&self) -> bool {
        !matches!(self.state, PursuitState::Standby)
    }

    /// Forces the machine idle; used when the operator takes over.
    pub fn reset(&mut self) {
        self.state = PursuitState::Standby;
        self.saved = PursuitState::Standby;
        self.counter = 0;
        self.evade_counter = 0;
    }

    /// Starts an evasive maneuver away from the detecting sensor.
    ///
    /// Returns `false` when an evasion is already running; the new
    /// report is dropped in that case, never queued.
    pub fn begin_evasion(&mut self, sensor: Sensor) -> bool {
        if matches!(self.state, PursuitState::Evade { .. }) {
            return false;
        }
        self.saved = self.state;
        self.state = PursuitState::Evade {
            sensor,
            phase: EvadePhase::Turning,
        };
        // The interrupted phase keeps its own counter so a resumed
        // sweep finishes its remaining arc, not a fresh one.
        self.evade_counter = 0;
        true
    }

    /// Evaluates the detectors and returns the motion to drive.
    /// Main-loop context.
    pub fn poll(&mut self, targets: TargetSnapshot) -> Motion {
        // An active evasion overrides search and target handling alike.
        if let PursuitState::Evade { sensor, phase } = self.state {
            return match phase {
                EvadePhase::Turning => evade_turn_motion(sensor),
                EvadePhase::Clearing => Motion::Forward,
            };
        }

        if targets.center {
            if !matches!(self.state, PursuitState::Engaged) {
                self.state = PursuitState::Engaged;
            }
            self.counter = 0;
            return Motion::Forward;
        }

        if matches!(self.state, PursuitState::Engaged) {
            // Keep pushing through the hold window after losing the
            // target; the slow tick walks the state back to standby.
            return Motion::Forward;
        }

        if targets.left {
            self.state = PursuitState::Standby;
            self.counter = 0;
            self.last_direction = Side::Left;
            return Motion::TurnRight;
        }
        if targets.right {
            self.state = PursuitState::Standby;
            self.counter = 0;
            self.last_direction = Side::Right;
            return Motion::TurnLeft;
        }

        match self.state {
            PursuitState::Standby => {
                let sweep = match self.last_direction {
                    Side::Left => Sweep::Left90,
                    Side::Right => Sweep::Right90,
                };
                self.state = PursuitState::Search(sweep);
                self.counter = 0;
                sweep.motion()
            }
            PursuitState::Search(sweep) => sweep.motion(),
            // Evade and Engaged both returned above.
            PursuitState::Evade { .. } | PursuitState::Engaged => Motion::Stop,
        }
    }

    /// Advances the live timed phase. Slow compare-match context.
    pub fn on_slow_tick(&mut self) {
        match self.state {
            PursuitState::Standby => {}
            PursuitState::Search(sweep) => {
                if self.phase_elapsed(sweep.duration()) {
                    self.state = PursuitState::Search(sweep.next());
                }
            }
            PursuitState::Engaged => {
                if self.phase_elapsed(ENGAGED_HOLD_TICKS) {
                    self.state = PursuitState::Standby;
                }
            }
            PursuitState::Evade { sensor, phase } => match phase {
                EvadePhase::Turning => {
                    if self.evade_phase_elapsed(evade_turn_ticks(sensor)) {
                        self.state = PursuitState::Evade {
                            sensor,
                            phase: EvadePhase::Clearing,
                        };
                    }
                }
                EvadePhase::Clearing => {
                    if self.evade_phase_elapsed(EVADE_CLEAR_TICKS) {
                        self.state = self.saved;
                        self.saved = PursuitState::Standby;
                    }
                }
            },
        }
    }

    fn phase_elapsed(&mut self, limit: u8) -> bool {
        self.counter += 1;
        if self.counter >= limit {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    fn evade_phase_elapsed(&mut self, limit: u8) -> bool {
        self.evade_counter += 1;
        if self.evade_counter >= limit {
            self.evade_counter = 0;
            true
        } else {
            false
        }
    }
}

/// Turn direction that moves the chassis away from a detecting sensor.
const fn evade_turn_motion(sensor: Sensor) -> Motion {
    match sensor {
        Sensor::Left => Motion::TurnRight,
        Sensor::Center | Sensor::Right => Motion::TurnLeft,
    }
}

/// Turning-phase duration; the head-on case turns farther.
const fn evade_turn_ticks(sensor: Sensor) -> u8 {
    match sensor {
        Sensor::Center => EVADE_CENTER_TURN_TICKS,
        Sensor::Left | Sensor::Right => EVADE_TURN_TICKS,
    }
}
