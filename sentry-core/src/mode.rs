//! Manual/auto coordination and the derived system mode.
//!
//! The auto flag has two input paths: the top board wires a physical
//! selector and supplies its level; the base board has no selector, so
//! the `Zero` radio command doubles as a toggle, edge-triggered so a
//! held button flips the mode exactly once. Everything downstream
//! (system mode, status color, drive source) derives purely from the
//! flag and the target-centered input.

use crate::decoder::Command;
use crate::pursuit::Motion;

/// Top-level operating mode; derived, never independently mutated.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SystemMode {
    /// Sensor warm-up before the first mode evaluation.
    #[default]
    Init,
    Manual,
    Searching,
    Engaged,
}

impl SystemMode {
    /// Deterministic index for status words and telemetry codes.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            SystemMode::Init => 0,
            SystemMode::Manual => 1,
            SystemMode::Searching => 2,
            SystemMode::Engaged => 3,
        }
    }

    /// Attempts to reconstruct a mode from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SystemMode::Init),
            1 => Some(SystemMode::Manual),
            2 => Some(SystemMode::Searching),
            3 => Some(SystemMode::Engaged),
            _ => None,
        }
    }
}

/// Status indicator levels, a pure function of the system mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusColor {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl StatusColor {
    /// Maps a mode to its indicator color: amber while initializing,
    /// green in manual, cyan while searching, red when engaged.
    #[must_use]
    pub const fn for_mode(mode: SystemMode) -> Self {
        match mode {
            SystemMode::Init => Self {
                red: true,
                green: true,
                blue: false,
            },
            SystemMode::Manual => Self {
                red: false,
                green: true,
                blue: false,
            },
            SystemMode::Searching => Self {
                red: false,
                green: true,
                blue: true,
            },
            SystemMode::Engaged => Self {
                red: true,
                green: false,
                blue: false,
            },
        }
    }
}

/// Manual drive mapping; `Zero` and `Ok` double as stop commands.
#[must_use]
pub const fn manual_motion(command: Command) -> Motion {
    match command {
        Command::Up => Motion::Forward,
        Command::Down => Motion::Reverse,
        Command::Left => Motion::TurnLeft,
        Command::Right => Motion::TurnRight,
        Command::Stop | Command::Ok | Command::Zero => Motion::Stop,
    }
}

/// Tracks the auto flag and derives the system mode.
#[derive(Debug, Default)]
pub struct ModeCoordinator {
    auto: bool,
    last_command_zero: bool,
}

impl ModeCoordinator {
    /// Creates a coordinator starting in manual.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            auto: false,
            last_command_zero: false,
        }
    }

    /// `true` while autonomous behavior owns the motors.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.auto
    }

    /// Applies the physical selector level (top board wiring).
    pub fn observe_selector(&mut self, auto: bool) {
        self.auto = auto;
    }

    /// Applies one decoded command frame (base board wiring).
    ///
    /// Only the rising edge of `Zero` toggles: current frame `Zero`,
    /// previous frame anything else. Holding the button across repeated
    /// frames therefore flips the mode once per press.
    pub fn observe_command(&mut self, command: Command) {
        let zero = matches!(command, Command::Zero);
        if zero && !self.last_command_zero {
            self.auto = !self.auto;
        }
        self.last_command_zero = zero;
    }

    /// Derives the operating mode from the live flags.
    #[must_use]
    pub const fn system_mode(&self, target_centered: bool) -> SystemMode {
        if !self.auto {
            SystemMode::Manual
        } else if target_centered {
            SystemMode::Engaged
        } else {
            SystemMode::Searching
        }
    }
}
