//! End-to-end mode arbitration: the `Zero` command toggles autonomy
//! exactly once per press, and once autonomous the radio no longer owns
//! the motors.

use sentry_core::decoder::Command;
use sentry_core::mode::{manual_motion, ModeCoordinator, SystemMode};
use sentry_core::pursuit::{Motion, PursuitFsm, TargetSnapshot};
use sentry_core::trigger::{effective_pull, TriggerFsm, TriggerState};

const NO_TARGETS: TargetSnapshot = TargetSnapshot {
    left: false,
    center: false,
    right: false,
};

/// One control-loop pass: command in, motor command out.
fn drive(mode: &mut ModeCoordinator, pursuit: &mut PursuitFsm, command: Command) -> Motion {
    mode.observe_command(command);
    if mode.is_auto() {
        pursuit.poll(NO_TARGETS)
    } else {
        pursuit.reset();
        manual_motion(command)
    }
}

#[test]
fn held_zero_hands_over_to_autonomy_once() {
    let mut mode = ModeCoordinator::new();
    let mut pursuit = PursuitFsm::new();

    // Two frames of a held Zero press: a single toggle into auto, so
    // the motors follow the search FSM, not the stop alias.
    let motion = drive(&mut mode, &mut pursuit, Command::Zero);
    assert!(mode.is_auto());
    assert_eq!(motion, Motion::TurnLeft);

    let motion = drive(&mut mode, &mut pursuit, Command::Zero);
    assert!(mode.is_auto(), "held press must not toggle back");
    assert_eq!(motion, Motion::TurnLeft);

    // Up is ignored under autonomy: the sweep keeps the motors.
    let motion = drive(&mut mode, &mut pursuit, Command::Up);
    assert_eq!(motion, Motion::TurnLeft);
    let motion = drive(&mut mode, &mut pursuit, Command::Up);
    assert_eq!(motion, Motion::TurnLeft);

    // Radio silence decodes as Stop; autonomy still owns the motors.
    let motion = drive(&mut mode, &mut pursuit, Command::Stop);
    assert_eq!(motion, Motion::TurnLeft);
}

#[test]
fn release_and_second_press_returns_to_manual() {
    let mut mode = ModeCoordinator::new();
    let mut pursuit = PursuitFsm::new();

    drive(&mut mode, &mut pursuit, Command::Zero);
    drive(&mut mode, &mut pursuit, Command::Up);
    assert!(mode.is_auto());

    let motion = drive(&mut mode, &mut pursuit, Command::Zero);
    assert!(!mode.is_auto());
    // Zero doubles as a stop command in manual mode.
    assert_eq!(motion, Motion::Stop);

    let motion = drive(&mut mode, &mut pursuit, Command::Up);
    assert_eq!(motion, Motion::Forward);
    let motion = drive(&mut mode, &mut pursuit, Command::Down);
    assert_eq!(motion, Motion::Reverse);
}

#[test]
fn manual_takeover_forces_search_idle() {
    let mut mode = ModeCoordinator::new();
    let mut pursuit = PursuitFsm::new();

    drive(&mut mode, &mut pursuit, Command::Zero);
    assert!(pursuit.wants_slow_tick(), "sweep running under auto");

    drive(&mut mode, &mut pursuit, Command::Stop);
    drive(&mut mode, &mut pursuit, Command::Zero);
    assert!(!mode.is_auto());
    assert!(!pursuit.wants_slow_tick(), "manual mode parks the search");
}

#[test]
fn trigger_pull_source_follows_mode() {
    let mut mode = ModeCoordinator::new();
    let mut trigger = TriggerFsm::new();

    // Manual: only the operator's momentary input fires.
    let engaged = mode.system_mode(true) == SystemMode::Engaged;
    assert!(!engaged);
    trigger.poll(effective_pull(mode.is_auto(), engaged, false));
    assert_eq!(trigger.state(), TriggerState::Standby);
    trigger.poll(effective_pull(mode.is_auto(), engaged, true));
    assert_eq!(trigger.state(), TriggerState::Pulled);

    // Auto: the manual input is inert; engagement fires instead.
    let mut trigger = TriggerFsm::new();
    mode.observe_selector(true);
    let engaged = mode.system_mode(true) == SystemMode::Engaged;
    assert!(engaged);
    trigger.poll(effective_pull(mode.is_auto(), false, true));
    assert_eq!(trigger.state(), TriggerState::Standby);
    trigger.poll(effective_pull(mode.is_auto(), engaged, false));
    assert_eq!(trigger.state(), TriggerState::Pulled);
}
