//! Embassy runtime wiring for the top board: ultrasonic round-robin,
//! echo edge capture, the search/trigger control loop, and the servo
//! pulse scheduler.

use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;

use crate::motion_port::MotionPort;
use crate::probes::HardwareProbeDriver;
use sentry_core::config::TICK_MICROS;
use sentry_core::latch::EdgeLatch;
use sentry_core::mode::{StatusColor, SystemMode};
use sentry_core::ranging::Obstacle;
use sentry_core::time::Tick;

mod control_task;
mod echo_task;
mod ranging_task;
mod servo_task;
mod warmup;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Depth of the obstacle queue between ranging and control.
pub(super) const OBSTACLE_QUEUE_DEPTH: usize = 4;

/// Echo edges published by the capture task, drained by the ranging
/// cycle. One packed atomic slot: the timestamp pair the classifier
/// needs can never tear.
pub(super) static ECHO_EDGES: EdgeLatch = EdgeLatch::new();

/// Obstacle reports flowing from the ranging cycle to the control loop.
pub(super) static OBSTACLES: Channel<ThreadModeRawMutex, Obstacle, OBSTACLE_QUEUE_DEPTH> =
    Channel::new();

/// Current reading of the shared tick counter.
#[allow(clippy::cast_possible_truncation)]
pub(super) fn now_tick() -> Tick {
    Tick::new((Instant::now().as_micros() / u64::from(TICK_MICROS)) as u16)
}

/// RGB status indicator outputs.
pub(super) struct StatusLamp<'d> {
    red: Output<'d>,
    green: Output<'d>,
    blue: Output<'d>,
}

impl<'d> StatusLamp<'d> {
    pub fn new(red: Output<'d>, green: Output<'d>, blue: Output<'d>) -> Self {
        Self { red, green, blue }
    }

    pub fn apply(&mut self, color: StatusColor) {
        set(&mut self.red, color.red);
        set(&mut self.green, color.green);
        set(&mut self.blue, color.blue);
    }
}

fn set(pin: &mut Output<'_>, level: bool) {
    if level {
        pin.set_high();
    } else {
        pin.set_low();
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA2,
        PA3,
        PA4,
        PA5,
        PA6,
        PA7,
        PA8,
        PB0,
        PB1,
        PB2,
        PB3,
        PB4,
        PB5,
        PB6,
        PB7,
        PB8,
        PB9,
        PC6,
        EXTI3,
        EXTI4,
        EXTI5,
        ..
    } = hal::init(config);

    let probe_driver = HardwareProbeDriver::new([
        Output::new(PA0, Level::Low, Speed::Low),
        Output::new(PA1, Level::Low, Speed::Low),
        Output::new(PA2, Level::Low, Speed::Low),
    ]);
    let echo_left = ExtiInput::new(PA3, EXTI3, Pull::Down);
    let echo_center = ExtiInput::new(PA4, EXTI4, Pull::Down);
    let echo_right = ExtiInput::new(PA5, EXTI5, Pull::Down);

    let target_detectors = [
        Input::new(PB0, Pull::Down),
        Input::new(PB1, Pull::Down),
        Input::new(PB2, Pull::Down),
    ];
    let mode_select = Input::new(PB3, Pull::Down);
    let manual_pull = Input::new(PB4, Pull::Down);
    let warmup_skip = Input::new(PA8, Pull::Up);

    let mut lamp = StatusLamp::new(
        Output::new(PB5, Level::Low, Speed::Low),
        Output::new(PB6, Level::Low, Speed::Low),
        Output::new(PB7, Level::Low, Speed::Low),
    );
    let motion_port = MotionPort::new([
        Output::new(PB8, Level::Low, Speed::Low),
        Output::new(PB9, Level::Low, Speed::Low),
        Output::new(PC6, Level::Low, Speed::Low),
    ]);
    let servo_primary = Output::new(PA6, Level::Low, Speed::Low);
    let servo_secondary = Output::new(PA7, Level::Low, Speed::Low);

    // Hold amber while the transducers warm up; the override input
    // skips the wait on the bench.
    lamp.apply(StatusColor::for_mode(SystemMode::Init));
    warmup::hold(&warmup_skip).await;

    spawner
        .spawn(echo_task::run(echo_left, echo_center, echo_right))
        .expect("failed to spawn echo capture task");
    spawner
        .spawn(ranging_task::run(probe_driver))
        .expect("failed to spawn ranging task");
    spawner
        .spawn(servo_task::run(servo_primary, servo_secondary))
        .expect("failed to spawn servo task");
    spawner
        .spawn(control_task::run(
            mode_select,
            manual_pull,
            target_detectors,
            lamp,
            motion_port,
        ))
        .expect("failed to spawn control task");

    core::future::pending::<()>().await;
}
