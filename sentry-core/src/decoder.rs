//! Pulse-position radio command decoder.
//!
//! Reconstructs the operator's 32-interval frame from raw edge
//! timestamps. A session opens with a long-low / long-idle start burst,
//! carries 32 falling-to-rising bit intervals of which a fixed window
//! is payload, then alternates continuation bursts that either extend
//! the session (frame kept) or open a new one (frame cleared). Timing
//! that misses its governing threshold is protocol noise and falls back
//! to [`DecoderState::Reset`] with no error reported; the polling loop
//! enforces the void timeout so the decoder recovers even when edge
//! interrupts stop arriving entirely.

use crate::config::{
    CONT_IDLE_THRESHOLD, DATA_ZERO_THRESHOLD, FRAME_BITS, PAYLOAD_BITS, PAYLOAD_FIRST_BIT,
    START_IDLE_THRESHOLD, START_LOW_THRESHOLD, VOID_THRESHOLD,
};
use crate::time::{EdgeEvent, Tick};

/// Decode progress through a radio session.
///
/// `*Fall` states are entered on a falling edge, `*Rise` states on a
/// rising edge; an edge that breaks the alternation is treated as noise.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DecoderState {
    /// No session; waiting for a start burst.
    #[default]
    Reset,
    /// Start burst low phase in progress.
    StartFall,
    /// Start burst validated; idle phase before the first data bit.
    StartRise,
    /// Data bit low phase in progress.
    RecvFall,
    /// Between data bits.
    RecvRise,
    /// Continuation burst low phase in progress.
    ContFall1,
    /// Continuation burst validated; classifying the following idle.
    ContRise1,
    /// Continuation terminator pulse in progress.
    ContFall2,
    /// Idle between bursts of a completed frame.
    ContRise2,
}

/// Payload window of the most recent frame.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RcFrame {
    bits: u8,
    ready: bool,
}

impl RcFrame {
    /// Payload bit by position within the retained window.
    #[must_use]
    pub const fn bit(&self, index: usize) -> bool {
        self.bits >> index & 1 == 1
    }

    /// `true` between frame completion and the next start-bit detection.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_bit(&mut self, index: usize, value: bool) {
        let mask = 1 << index;
        if value {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }

    fn clear(&mut self) {
        self.bits = 0;
        self.ready = false;
    }
}

/// Operator command decoded from the payload window.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Command {
    /// Safe default whenever no ready frame exists.
    #[default]
    Stop,
    Up,
    Down,
    Left,
    Right,
    Ok,
    Zero,
}

impl Command {
    /// Fixed lookup over the first three payload bits.
    #[must_use]
    pub const fn from_frame(frame: &RcFrame) -> Self {
        if !frame.is_ready() {
            return Command::Stop;
        }
        match (frame.bit(0), frame.bit(1), frame.bit(2)) {
            (true, true, _) => Command::Right,
            (true, false, _) => Command::Down,
            (false, true, true) => Command::Up,
            (false, true, false) => Command::Zero,
            (false, false, true) => Command::Left,
            (false, false, false) => Command::Ok,
        }
    }

    /// Deterministic index for status words and telemetry codes.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            Command::Stop => 0,
            Command::Up => 1,
            Command::Down => 2,
            Command::Left => 3,
            Command::Right => 4,
            Command::Ok => 5,
            Command::Zero => 6,
        }
    }

    /// Attempts to reconstruct a command from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Command::Stop),
            1 => Some(Command::Up),
            2 => Some(Command::Down),
            3 => Some(Command::Left),
            4 => Some(Command::Right),
            5 => Some(Command::Ok),
            6 => Some(Command::Zero),
            _ => None,
        }
    }
}

/// Edge-driven protocol state machine.
///
/// [`RcDecoder::on_edge`] runs in interrupt context;
/// [`RcDecoder::poll`] runs once per main-loop pass and owns the void
/// timeout plus the command lookup.
#[derive(Debug, Default)]
pub struct RcDecoder {
    state: DecoderState,
    frame: RcFrame,
    bit_index: usize,
    last_edge_at: Tick,
}

impl RcDecoder {
    /// Creates a decoder in the reset state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Reset,
            frame: RcFrame { bits: 0, ready: false },
            bit_index: 0,
            last_edge_at: Tick::ZERO,
        }
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    /// Most recent payload window.
    #[must_use]
    pub const fn frame(&self) -> &RcFrame {
        &self.frame
    }

    /// Counter reading of the last observed edge.
    #[must_use]
    pub const fn last_edge_at(&self) -> Tick {
        self.last_edge_at
    }

    /// Feeds one captured edge. Interrupt context.
    pub fn on_edge(&mut self, event: EdgeEvent) {
        let width = event.at.delta(self.last_edge_at);
        self.last_edge_at = event.at;
        self.state = self.step(event.level, i32::from(width));
    }

    /// Void check plus command lookup. Main-loop context.
    ///
    /// Silence beyond the void threshold unconditionally resets the
    /// decoder and clears the frame, independent of interrupt delivery.
    pub fn poll(&mut self, now: Tick) -> Command {
        if now.exceeds(self.last_edge_at, VOID_THRESHOLD) {
            self.state = DecoderState::Reset;
            self.frame.clear();
            self.bit_index = 0;
        }
        Command::from_frame(&self.frame)
    }

    fn step(&mut self, rising: bool, width: i32) -> DecoderState {
        use DecoderState as S;
        match (self.state, rising) {
            (S::Reset, false) => S::StartFall,
            (S::StartFall, true) if width > i32::from(START_LOW_THRESHOLD) => S::StartRise,
            (S::StartRise, false) if width > i32::from(START_IDLE_THRESHOLD) => {
                self.begin_frame();
                S::RecvFall
            }
            (S::RecvFall, true) => self.classify_bit(width),
            (S::RecvRise, false) => S::RecvFall,
            (S::ContRise2, false) => S::ContFall1,
            (S::ContFall1, true) if width > i32::from(START_LOW_THRESHOLD) => S::ContRise1,
            (S::ContRise1, false) if width > i32::from(START_IDLE_THRESHOLD) => {
                // A full start-grade idle inside the continuation window
                // opens a genuinely new session.
                self.begin_frame();
                S::RecvFall
            }
            (S::ContRise1, false) if width > i32::from(CONT_IDLE_THRESHOLD) => S::ContFall2,
            (S::ContFall2, true) => S::ContRise2,
            // Anything else is noise: too-short phases, a missed edge
            // breaking the level alternation, or an idle-line glitch.
            _ => S::Reset,
        }
    }

    fn begin_frame(&mut self) {
        self.frame.clear();
        self.bit_index = 0;
    }

    fn classify_bit(&mut self, low_width: i32) -> DecoderState {
        if (PAYLOAD_FIRST_BIT..PAYLOAD_FIRST_BIT + PAYLOAD_BITS).contains(&self.bit_index) {
            self.frame.set_bit(
                self.bit_index - PAYLOAD_FIRST_BIT,
                low_width > i32::from(DATA_ZERO_THRESHOLD),
            );
        }
        self.bit_index += 1;
        if self.bit_index == FRAME_BITS {
            self.frame.ready = true;
            DecoderState::ContRise2
        } else {
            DecoderState::RecvRise
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT_LOW: u16 = DATA_ZERO_THRESHOLD / 2;
    const LONG_LOW: u16 = DATA_ZERO_THRESHOLD * 2;
    const BIT_IDLE: u16 = CONT_IDLE_THRESHOLD / 2;

    struct Feed {
        decoder: RcDecoder,
        now: Tick,
        level: bool,
    }

    impl Feed {
        fn new() -> Self {
            Self {
                decoder: RcDecoder::new(),
                now: Tick::new(5_000),
                level: true,
            }
        }

        /// Holds the current level for `ticks`, then toggles.
        fn edge_after(&mut self, ticks: u16) {
            self.now = self.now.advance(ticks);
            self.level = !self.level;
            self.decoder.on_edge(EdgeEvent::new(self.now, self.level));
        }

        fn start_burst(&mut self) {
            self.edge_after(200); // idle ends, burst low begins
            self.edge_after(START_LOW_THRESHOLD + 100); // low phase
            self.edge_after(START_IDLE_THRESHOLD + 100); // idle, first bit low begins
        }

        /// Sends the low phase of one bit plus its trailing idle.
        fn bit(&mut self, value: bool) {
            let low = if value { LONG_LOW } else { SHORT_LOW };
            self.edge_after(low);
            self.edge_after(BIT_IDLE);
        }

        /// Sends a whole 32-interval frame carrying `payload` in the
        /// retained window, zero elsewhere.
        fn frame(&mut self, payload: [bool; 3]) {
            self.start_burst();
            for position in 0..FRAME_BITS {
                let value = match position.checked_sub(PAYLOAD_FIRST_BIT) {
                    Some(offset) if offset < payload.len() => payload[offset],
                    _ => false,
                };
                if position == FRAME_BITS - 1 {
                    // Final bit has no trailing in-frame idle.
                    let low = if value { LONG_LOW } else { SHORT_LOW };
                    self.edge_after(low);
                } else {
                    self.bit(value);
                }
            }
        }
    }

    #[test]
    fn canonical_frame_decodes_to_right() {
        let mut feed = Feed::new();
        feed.frame([true, true, false]);

        assert!(feed.decoder.frame().is_ready());
        assert_eq!(feed.decoder.state(), DecoderState::ContRise2);
        assert_eq!(feed.decoder.poll(feed.now), Command::Right);
    }

    #[test]
    fn payload_patterns_map_to_commands() {
        let table = [
            ([false, true, true], Command::Up),
            ([true, false, false], Command::Down),
            ([false, false, true], Command::Left),
            ([false, true, false], Command::Zero),
            ([false, false, false], Command::Ok),
        ];
        for (payload, expected) in table {
            let mut feed = Feed::new();
            feed.frame(payload);
            assert_eq!(feed.decoder.poll(feed.now), expected);
        }
    }

    #[test]
    fn aborted_start_never_asserts_ready() {
        let mut feed = Feed::new();
        feed.edge_after(200);
        feed.edge_after(START_LOW_THRESHOLD - 10); // low phase too short

        assert_eq!(feed.decoder.state(), DecoderState::Reset);
        assert!(!feed.decoder.frame().is_ready());
        assert_eq!(feed.decoder.poll(feed.now), Command::Stop);
    }

    #[test]
    fn short_start_idle_aborts_session() {
        let mut feed = Feed::new();
        feed.edge_after(200);
        feed.edge_after(START_LOW_THRESHOLD + 100);
        feed.edge_after(START_IDLE_THRESHOLD - 10);

        assert_eq!(feed.decoder.state(), DecoderState::Reset);
    }

    #[test]
    fn void_timeout_resets_partial_frame() {
        let mut feed = Feed::new();
        feed.start_burst();
        feed.bit(true);
        feed.bit(false);
        assert_ne!(feed.decoder.state(), DecoderState::Reset);

        let silent = feed.now.advance(VOID_THRESHOLD + 1);
        assert_eq!(feed.decoder.poll(silent), Command::Stop);
        assert_eq!(feed.decoder.state(), DecoderState::Reset);
        assert!(!feed.decoder.frame().is_ready());
    }

    #[test]
    fn void_timeout_clears_ready_frame() {
        let mut feed = Feed::new();
        feed.frame([true, true, false]);
        assert_eq!(feed.decoder.poll(feed.now), Command::Right);

        let silent = feed.now.advance(VOID_THRESHOLD + 1);
        assert_eq!(feed.decoder.poll(silent), Command::Stop);
        assert!(!feed.decoder.frame().is_ready());
    }

    #[test]
    fn continuation_burst_preserves_frame() {
        let mut feed = Feed::new();
        feed.frame([false, false, true]);
        assert_eq!(feed.decoder.poll(feed.now), Command::Left);

        // Continuation: long low, then an idle between the continuation
        // and start thresholds, then the short terminator pulse.
        feed.edge_after(2_000);
        feed.edge_after(START_LOW_THRESHOLD + 50);
        feed.edge_after(CONT_IDLE_THRESHOLD + 50);
        feed.edge_after(SHORT_LOW);

        assert_eq!(feed.decoder.state(), DecoderState::ContRise2);
        assert_eq!(feed.decoder.poll(feed.now), Command::Left);
        assert!(feed.decoder.frame().is_ready());
    }

    #[test]
    fn start_grade_idle_in_continuation_opens_new_session() {
        let mut feed = Feed::new();
        feed.frame([false, false, true]);

        feed.edge_after(2_000);
        feed.edge_after(START_LOW_THRESHOLD + 50);
        feed.edge_after(START_IDLE_THRESHOLD + 50);

        assert_eq!(feed.decoder.state(), DecoderState::RecvFall);
        assert!(!feed.decoder.frame().is_ready());
        assert_eq!(feed.decoder.poll(feed.now), Command::Stop);
    }

    #[test]
    fn too_short_continuation_idle_resets() {
        let mut feed = Feed::new();
        feed.frame([false, false, true]);

        feed.edge_after(2_000);
        feed.edge_after(START_LOW_THRESHOLD + 50);
        feed.edge_after(CONT_IDLE_THRESHOLD - 50);

        assert_eq!(feed.decoder.state(), DecoderState::Reset);
    }

    #[test]
    fn noise_keeps_last_ready_frame_until_void() {
        let mut feed = Feed::new();
        feed.frame([true, true, false]);

        // A runt burst in the continuation window aborts the session
        // but the decoded command keeps flowing until the void reset.
        feed.edge_after(2_000);
        feed.edge_after(100);

        assert_eq!(feed.decoder.state(), DecoderState::Reset);
        assert_eq!(feed.decoder.poll(feed.now), Command::Right);
    }

    #[test]
    fn command_index_round_trips() {
        for index in 0..7 {
            let command = Command::from_index(index).expect("index in range");
            assert_eq!(command.as_index(), index);
        }
        assert_eq!(Command::from_index(7), None);
    }
}
