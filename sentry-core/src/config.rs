//! Build-time calibration constants.
//!
//! Every threshold and duration in the control logic lives here as a
//! named constant so a hardware revision can be recalibrated in one
//! place. There is no runtime configuration surface. The hardware tick
//! period is fixed at 4 microseconds by the platform timer setup.

/// Tick period of the free-running counter, in microseconds.
pub const TICK_MICROS: u32 = 4;

// Radio protocol timing. A session opens with a long-low / long-idle
// start burst; bit values ride on the width of each low phase.

/// Minimum low-phase width of a start or continuation burst (6 ms).
pub const START_LOW_THRESHOLD: u16 = 1_500;
/// Minimum idle-high width that opens a new session (3.6 ms).
pub const START_IDLE_THRESHOLD: u16 = 900;
/// Minimum idle-high width that continues the current session (1.8 ms).
pub const CONT_IDLE_THRESHOLD: u16 = 450;
/// Low-phase width separating a zero bit from a one bit (1.2 ms).
pub const DATA_ZERO_THRESHOLD: u16 = 300;
/// Edge silence that force-resets the decoder (~111 ms).
pub const VOID_THRESHOLD: u16 = 27_800;

/// Encoded bit intervals per radio frame.
pub const FRAME_BITS: usize = 32;
/// First frame bit position retained as payload.
pub const PAYLOAD_FIRST_BIT: usize = 16;
/// Retained payload width; the command table reads the first three.
pub const PAYLOAD_BITS: usize = 8;

// Pulse scheduling. One compare-match channel is advanced by a fixed
// slot width each interrupt and fans out to every servo output.

/// Compare-register increment per scheduler slot (500 us).
pub const PWM_SLOT_TICKS: u16 = 125;
/// Slots per servo frame (20 ms).
pub const SERVO_FRAME_SLOTS: u8 = 40;
/// Actuator-at-rest pulse width, in slots (500 us).
pub const SERVO_NARROW_SLOTS: u8 = 1;
/// Actuator-engaged pulse width, in slots (2.5 ms).
pub const SERVO_WIDE_SLOTS: u8 = 5;

/// Motor-enable high phase (9 ms of a 10 ms soft-PWM period).
pub const ENABLE_HIGH_TICKS: u16 = 2_250;
/// Motor-enable low phase (1 ms).
pub const ENABLE_LOW_TICKS: u16 = 250;

// Ultrasonic ranging.

/// Trigger pulse width on the short-interval timer (~10 us).
pub const PROBE_PULSE_TICKS: u16 = 3;
/// Echo width above which the return is an obstacle (~30 cm).
pub const COLLISION_THRESHOLD: u16 = 174;
/// Echo window before a silent sensor is abandoned (30 ms).
pub const ECHO_TIMEOUT: u16 = 7_500;

// Slow timed phases, counted in 250 ms compare-match periods.

/// Compare-register increment of the slow phase timer (250 ms).
pub const SLOW_TICK_TICKS: u16 = 62_500;
/// Slow ticks per 90-degree search sweep.
pub const SWEEP_90_TICKS: u8 = 8;
/// Slow ticks per 180-degree search sweep.
pub const SWEEP_180_TICKS: u8 = 16;
/// Slow ticks a side-sensor evasion spends turning away.
pub const EVADE_TURN_TICKS: u8 = 4;
/// Slow ticks a center-sensor evasion spends turning away.
pub const EVADE_CENTER_TURN_TICKS: u8 = 8;
/// Slow ticks an evasion spends clearing forward before resuming.
pub const EVADE_CLEAR_TICKS: u8 = 4;
/// Slow ticks the engaged push persists after losing the target.
pub const ENGAGED_HOLD_TICKS: u8 = 2;
/// Slow ticks the trigger stays pulled (1.25 s).
pub const PULL_DELAY_TICKS: u8 = 5;
/// Slow ticks the trigger cools down before re-arming (2.5 s).
pub const COOLDOWN_DELAY_TICKS: u8 = 10;
