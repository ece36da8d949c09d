//! Embassy runtime wiring for the base board: radio edge capture, the
//! decode/drive polling loop, and the motor enable pulser.

use core::cell::RefCell;

use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_time::Instant;

use crate::drive::MotorDriver;
use sentry_core::config::TICK_MICROS;
use sentry_core::decoder::RcDecoder;
use sentry_core::time::Tick;

mod control_task;
mod edge_task;
mod enable_task;

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

/// Decoder shared between the edge-capture context and the polling
/// loop. The mutex is the critical-section wrapper the shared-state
/// contract calls for around multi-field decoder state.
pub(super) static DECODER: Mutex<ThreadModeRawMutex, RefCell<RcDecoder>> =
    Mutex::new(RefCell::new(RcDecoder::new()));

/// Current reading of the protocol tick counter.
#[allow(clippy::cast_possible_truncation)]
pub(super) fn now_tick() -> Tick {
    Tick::new((Instant::now().as_micros() / u64::from(TICK_MICROS)) as u16)
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA2,
        PA3,
        PB0,
        PB1,
        PB2,
        PB3,
        PB4,
        PB5,
        EXTI0,
        ..
    } = hal::init(config);

    let rc_input = ExtiInput::new(PA0, EXTI0, Pull::None);

    let motors = MotorDriver::new(
        Output::new(PB0, Level::Low, Speed::Low),
        Output::new(PB1, Level::Low, Speed::Low),
        Output::new(PB2, Level::Low, Speed::Low),
        Output::new(PB3, Level::Low, Speed::Low),
    );
    let enables = [
        Output::new(PB4, Level::Low, Speed::Low),
        Output::new(PB5, Level::Low, Speed::Low),
    ];
    let motion_lines = [
        Input::new(PA1, Pull::Down),
        Input::new(PA2, Pull::Down),
        Input::new(PA3, Pull::Down),
    ];

    spawner
        .spawn(edge_task::run(rc_input))
        .expect("failed to spawn radio edge task");
    spawner
        .spawn(control_task::run(motors, motion_lines))
        .expect("failed to spawn drive control task");
    spawner
        .spawn(enable_task::run(enables))
        .expect("failed to spawn motor enable task");

    core::future::pending::<()>().await;
}
