//! Telemetry event catalog shared by firmware and host targets.
//!
//! Strongly typed event kinds serialize to compact numeric codes for
//! transport over diagnostics channels; a bounded history buffer lets a
//! target surface its recent activity without allocation.

use core::fmt;

use heapless::HistoryBuf;

use crate::decoder::Command;
use crate::mode::SystemMode;
use crate::ranging::Sensor;
use crate::time::Tick;

/// Events retained by a [`TelemetryRecorder`].
pub const EVENT_HISTORY_DEPTH: usize = 16;

/// Discriminated telemetry events emitted by the control loops.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventKind {
    FrameReady,
    DecoderVoidReset,
    CommandDecoded(Command),
    ObstacleDetected(Sensor),
    EchoTimeout(Sensor),
    EvasionStarted(Sensor),
    EvasionCompleted,
    TriggerPulled,
    TriggerCooldown,
    ModeChanged(SystemMode),
    Custom(u16),
}

impl EventKind {
    const FRAME_READY_CODE: u16 = 0x0000;
    const VOID_RESET_CODE: u16 = 0x0001;
    const EVASION_DONE_CODE: u16 = 0x0002;
    const TRIGGER_PULLED_CODE: u16 = 0x0003;
    const TRIGGER_COOLDOWN_CODE: u16 = 0x0004;
    const COMMAND_BASE: u16 = 0x0010;
    const OBSTACLE_BASE: u16 = 0x0020;
    const ECHO_TIMEOUT_BASE: u16 = 0x0024;
    const EVASION_BASE: u16 = 0x0028;
    const MODE_BASE: u16 = 0x0030;

    /// Encodes the event into a compact transport discriminant.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn to_raw(self) -> u16 {
        match self {
            EventKind::FrameReady => Self::FRAME_READY_CODE,
            EventKind::DecoderVoidReset => Self::VOID_RESET_CODE,
            EventKind::EvasionCompleted => Self::EVASION_DONE_CODE,
            EventKind::TriggerPulled => Self::TRIGGER_PULLED_CODE,
            EventKind::TriggerCooldown => Self::TRIGGER_COOLDOWN_CODE,
            EventKind::CommandDecoded(command) => Self::COMMAND_BASE + command.as_index() as u16,
            EventKind::ObstacleDetected(sensor) => Self::OBSTACLE_BASE + sensor.as_index() as u16,
            EventKind::EchoTimeout(sensor) => Self::ECHO_TIMEOUT_BASE + sensor.as_index() as u16,
            EventKind::EvasionStarted(sensor) => Self::EVASION_BASE + sensor.as_index() as u16,
            EventKind::ModeChanged(mode) => Self::MODE_BASE + mode.as_index() as u16,
            EventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`EventKind::Custom`].
    #[must_use]
    pub fn from_raw(code: u16) -> Self {
        match code {
            Self::FRAME_READY_CODE => EventKind::FrameReady,
            Self::VOID_RESET_CODE => EventKind::DecoderVoidReset,
            Self::EVASION_DONE_CODE => EventKind::EvasionCompleted,
            Self::TRIGGER_PULLED_CODE => EventKind::TriggerPulled,
            Self::TRIGGER_COOLDOWN_CODE => EventKind::TriggerCooldown,
            _ => Self::from_indexed_raw(code).unwrap_or(EventKind::Custom(code)),
        }
    }

    fn from_indexed_raw(code: u16) -> Option<Self> {
        let index = |base: u16| usize::from(code - base);
        match code {
            c if (Self::COMMAND_BASE..Self::COMMAND_BASE + 7).contains(&c) => {
                Command::from_index(index(Self::COMMAND_BASE)).map(EventKind::CommandDecoded)
            }
            c if (Self::OBSTACLE_BASE..Self::OBSTACLE_BASE + 3).contains(&c) => {
                Sensor::from_index(index(Self::OBSTACLE_BASE)).map(EventKind::ObstacleDetected)
            }
            c if (Self::ECHO_TIMEOUT_BASE..Self::ECHO_TIMEOUT_BASE + 3).contains(&c) => {
                Sensor::from_index(index(Self::ECHO_TIMEOUT_BASE)).map(EventKind::EchoTimeout)
            }
            c if (Self::EVASION_BASE..Self::EVASION_BASE + 3).contains(&c) => {
                Sensor::from_index(index(Self::EVASION_BASE)).map(EventKind::EvasionStarted)
            }
            c if (Self::MODE_BASE..Self::MODE_BASE + 4).contains(&c) => {
                SystemMode::from_index(index(Self::MODE_BASE)).map(EventKind::ModeChanged)
            }
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::FrameReady => f.write_str("frame-ready"),
            EventKind::DecoderVoidReset => f.write_str("decoder-void-reset"),
            EventKind::CommandDecoded(command) => write!(f, "command {command:?}"),
            EventKind::ObstacleDetected(sensor) => write!(f, "obstacle {sensor:?}"),
            EventKind::EchoTimeout(sensor) => write!(f, "echo-timeout {sensor:?}"),
            EventKind::EvasionStarted(sensor) => write!(f, "evasion-started {sensor:?}"),
            EventKind::EvasionCompleted => f.write_str("evasion-completed"),
            EventKind::TriggerPulled => f.write_str("trigger-pulled"),
            EventKind::TriggerCooldown => f.write_str("trigger-cooldown"),
            EventKind::ModeChanged(mode) => write!(f, "mode {mode:?}"),
            EventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

/// One recorded event with its capture instant.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub kind: EventKind,
    pub at: Tick,
}

/// Bounded ring of recent events, oldest first on iteration.
#[derive(Debug, Default)]
pub struct TelemetryRecorder {
    events: HistoryBuf<EventRecord, EVENT_HISTORY_DEPTH>,
}

impl TelemetryRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: HistoryBuf::new(),
        }
    }

    /// Records an event, evicting the oldest when full.
    pub fn record(&mut self, kind: EventKind, at: Tick) {
        self.events.write(EventRecord { kind, at });
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` when nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recently recorded event, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&EventRecord> {
        self.events.recent()
    }

    /// Iterates retained events oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.events.oldest_ordered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_codes_round_trip() {
        let events = [
            EventKind::FrameReady,
            EventKind::DecoderVoidReset,
            EventKind::CommandDecoded(Command::Right),
            EventKind::CommandDecoded(Command::Zero),
            EventKind::ObstacleDetected(Sensor::Center),
            EventKind::EchoTimeout(Sensor::Right),
            EventKind::EvasionStarted(Sensor::Left),
            EventKind::EvasionCompleted,
            EventKind::TriggerPulled,
            EventKind::TriggerCooldown,
            EventKind::ModeChanged(SystemMode::Engaged),
        ];
        for event in events {
            assert_eq!(EventKind::from_raw(event.to_raw()), event);
        }
    }

    #[test]
    fn unknown_code_falls_back_to_custom() {
        assert_eq!(EventKind::from_raw(0x4000), EventKind::Custom(0x4000));
    }

    #[test]
    fn recorder_retains_bounded_history() {
        let mut recorder = TelemetryRecorder::new();
        assert!(recorder.is_empty());

        for i in 0..EVENT_HISTORY_DEPTH + 4 {
            recorder.record(EventKind::Custom(u16::try_from(i).expect("small")), Tick::new(0));
        }
        assert_eq!(recorder.len(), EVENT_HISTORY_DEPTH);

        let first = recorder.iter().next().expect("history populated");
        assert_eq!(first.kind, EventKind::Custom(4));
        let last = recorder.latest().expect("history populated");
        assert_eq!(
            last.kind,
            EventKind::Custom(u16::try_from(EVENT_HISTORY_DEPTH + 3).expect("small"))
        );
    }
}
