//! Scripted control-loop sessions for protocol validation on the host.
//!
//! Each profile replays a canned scenario through the shared control
//! logic exactly as the firmware drives it: radio edges pass through
//! the packed edge latch into the decoder, echoes and slow ticks step
//! the autonomous machines, and the transcript captures every
//! externally visible change.

use sentry_core::config::{
    CONT_IDLE_THRESHOLD, DATA_ZERO_THRESHOLD, FRAME_BITS, PAYLOAD_FIRST_BIT,
    START_IDLE_THRESHOLD, START_LOW_THRESHOLD, VOID_THRESHOLD,
};
use sentry_core::decoder::{Command, RcDecoder};
use sentry_core::latch::EdgeLatch;
use sentry_core::mode::{ModeCoordinator, StatusColor, SystemMode};
use sentry_core::pursuit::{PursuitFsm, TargetSnapshot};
use sentry_core::ranging::{NoopProbeDriver, RangingController};
use sentry_core::telemetry::{EventKind, TelemetryRecorder};
use sentry_core::time::{EdgeEvent, Tick};
use sentry_core::trigger::{TriggerFsm, TriggerState, effective_pull};

/// Which canned scenario to replay.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    /// Radio decode session: frames, a held `Zero` press, radio loss.
    Decode,
    /// Autonomous patrol: sweep, obstacle evasion, engagement, trigger.
    Patrol,
}

impl TranscriptProfile {
    /// Parses a command-line tag.
    pub fn from_tag(tag: &str) -> Result<Self, String> {
        match tag.to_ascii_lowercase().as_str() {
            "decode" => Ok(TranscriptProfile::Decode),
            "patrol" => Ok(TranscriptProfile::Patrol),
            other => Err(format!("Unknown profile `{other}`")),
        }
    }
}

/// One scripted run producing a printable transcript.
pub struct Session {
    profile: TranscriptProfile,
}

impl Session {
    pub fn new(profile: TranscriptProfile) -> Self {
        Self { profile }
    }

    pub fn run(&mut self) -> Vec<String> {
        match self.profile {
            TranscriptProfile::Decode => decode_transcript(),
            TranscriptProfile::Patrol => patrol_transcript(),
        }
    }
}

/// Radio transmitter model publishing edges through the firmware's
/// latch path.
struct Radio {
    latch: EdgeLatch,
    now: Tick,
    level: bool,
}

impl Radio {
    fn new() -> Self {
        Self {
            latch: EdgeLatch::new(),
            now: Tick::new(2_000),
            level: true,
        }
    }

    fn edge_after(&mut self, ticks: u16, decoder: &mut RcDecoder) {
        self.now = self.now.advance(ticks);
        self.level = !self.level;
        self.latch.publish(EdgeEvent::new(self.now, self.level));
        // The capture side drains the latch immediately, as the edge
        // task does on hardware.
        if let Some(event) = self.latch.take() {
            decoder.on_edge(event);
        }
    }

    fn frame(&mut self, payload: u8, decoder: &mut RcDecoder) {
        self.edge_after(100, decoder);
        self.edge_after(START_LOW_THRESHOLD + 200, decoder);
        self.edge_after(START_IDLE_THRESHOLD + 200, decoder);
        for position in 0..FRAME_BITS {
            let value = position
                .checked_sub(PAYLOAD_FIRST_BIT)
                .is_some_and(|offset| offset < 8 && payload >> offset & 1 == 1);
            let low = if value {
                DATA_ZERO_THRESHOLD * 2
            } else {
                DATA_ZERO_THRESHOLD / 2
            };
            self.edge_after(low, decoder);
            if position < FRAME_BITS - 1 {
                self.edge_after(CONT_IDLE_THRESHOLD / 2, decoder);
            }
        }
    }
}

// Payload patterns per the command table, low bit first.
const ZERO_BITS: u8 = 0b010;
const UP_BITS: u8 = 0b110;

fn decode_transcript() -> Vec<String> {
    let mut lines = Vec::new();
    let mut decoder = RcDecoder::new();
    let mut mode = ModeCoordinator::new();
    let mut telemetry = TelemetryRecorder::new();
    let mut radio = Radio::new();

    lines.push("# decode session".to_string());

    let script: [(&str, u8); 4] = [
        ("zero pressed", ZERO_BITS),
        ("zero held", ZERO_BITS),
        ("up pressed", UP_BITS),
        ("up held", UP_BITS),
    ];

    for (label, payload) in script {
        radio.frame(payload, &mut decoder);
        let command = decoder.poll(radio.now);
        mode.observe_command(command);
        telemetry.record(EventKind::CommandDecoded(command), radio.now);
        lines.push(transcript_line(radio.now, label, command, &mode));
    }

    // Transmitter goes dark: the void watchdog must park everything.
    let silent = radio.now.advance(VOID_THRESHOLD + 1);
    let command = decoder.poll(silent);
    mode.observe_command(command);
    telemetry.record(EventKind::DecoderVoidReset, silent);
    lines.push(transcript_line(silent, "radio lost", command, &mode));
    assert_eq!(command, Command::Stop, "void reset must yield the safe stop");

    lines.push("# telemetry".to_string());
    for record in telemetry.iter() {
        lines.push(format!("  {:>6} {}", record.at.raw(), record.kind));
    }
    lines
}

fn transcript_line(at: Tick, label: &str, command: Command, mode: &ModeCoordinator) -> String {
    let flag = if mode.is_auto() { "auto" } else { "manual" };
    format!("{:>6} {label:<12} -> {command:?} [{flag}]", at.raw())
}

fn patrol_transcript() -> Vec<String> {
    let mut lines = Vec::new();
    let mut ranging = RangingController::new();
    let mut driver = NoopProbeDriver;
    let mut pursuit = PursuitFsm::new();
    let mut trigger = TriggerFsm::new();
    let mut mode = ModeCoordinator::new();
    let mut now = Tick::new(0);

    mode.observe_selector(true);
    lines.push("# patrol session".to_string());

    // Echo widths per probe, one entry per round-robin slot. The wide
    // center return halfway through forces an evasion.
    let echo_script: [u16; 9] = [60, 80, 70, 50, 400, 90, 40, 60, 80];
    let mut echoes = echo_script.iter();

    const NO_TARGETS: TargetSnapshot = TargetSnapshot {
        left: false,
        center: false,
        right: false,
    };

    for step in 0..24 {
        // One probe per step, while the sweep and trigger run beside it.
        if let Some(&echo) = echoes.next() {
            let _ = ranging.poll(now, &mut driver); // trigger pulse begins
            ranging.on_pulse_timer();
            let _ = ranging.poll(now, &mut driver); // pulse ends, listening
            let rise = now.advance(40);
            ranging.on_echo_edge(EdgeEvent::new(rise, true));
            ranging.on_echo_edge(EdgeEvent::new(rise.advance(echo), false));
            if let Some(obstacle) = ranging.poll(rise.advance(echo), &mut driver) {
                let accepted = pursuit.begin_evasion(obstacle.sensor);
                lines.push(format!(
                    "{step:>3} obstacle {:?} ({} ticks) {}",
                    obstacle.sensor,
                    obstacle.echo_ticks,
                    if accepted { "evading" } else { "dropped" }
                ));
            }
        }

        // Last quarter of the patrol: the target walks into view.
        let targets = if step >= 18 {
            TargetSnapshot {
                center: true,
                ..NO_TARGETS
            }
        } else {
            NO_TARGETS
        };

        let motion = pursuit.poll(targets);
        let system_mode = mode.system_mode(targets.center);
        trigger.poll(effective_pull(
            mode.is_auto(),
            system_mode == SystemMode::Engaged,
            false,
        ));
        pursuit.on_slow_tick();
        trigger.on_slow_tick();
        now = now.advance(2_000);

        lines.push(format!(
            "{step:>3} {:?} motion={motion:?} mode={system_mode:?} trigger={:?} {}",
            pursuit.state(),
            trigger.state(),
            color_tag(StatusColor::for_mode(system_mode)),
        ));
    }

    assert!(
        !matches!(trigger.state(), TriggerState::Standby),
        "engagement must have pulled the trigger"
    );
    lines
}

fn color_tag(color: StatusColor) -> &'static str {
    match (color.red, color.green, color.blue) {
        (true, true, false) => "amber",
        (false, true, false) => "green",
        (false, true, true) => "cyan",
        (true, false, false) => "red",
        _ => "off",
    }
}
