//! End-to-end door scenarios driven through `DoorService::tick`.

use doorctl::app::commands::DoorCommand;
use doorctl::app::service::DoorService;
use doorctl::config::{DoorConfig, PublishPolicy};
use doorctl::drivers::motor::MotorDirection;
use doorctl::fsm::StateId;
use doorctl::fsm::context::InputLevels;

use crate::mock_hw::{MockDoor, RecordingTelemetry, tick_n, tick_until};

fn on_transition() -> DoorConfig {
    DoorConfig {
        publish_policy: PublishPolicy::OnTransition,
        ..DoorConfig::default()
    }
}

fn settled_closed(config: DoorConfig) -> (DoorService, MockDoor, RecordingTelemetry) {
    let mut hw = MockDoor::closed();
    let mut tx = RecordingTelemetry::new();
    let mut svc = DoorService::new(config, hw.raw).unwrap();
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Closed, 5);
    (svc, hw, tx)
}

// ── Power-up position resolution ─────────────────────────────

#[test]
fn boot_resolves_each_limit_combination() {
    let cases = [
        ((false, true), StateId::Closed),
        ((true, false), StateId::Open),
        ((true, true), StateId::Error),
    ];
    for ((lsa, lsc), expected) in cases {
        let mut raw = InputLevels::idle();
        raw.open_limit = lsa;
        raw.close_limit = lsc;
        let mut hw = MockDoor::with_inputs(raw);
        let mut tx = RecordingTelemetry::new();
        let mut svc = DoorService::new(DoorConfig::default(), raw).unwrap();

        svc.tick(&mut hw, &mut tx);
        assert_eq!(svc.controller_state().pending, expected);
        svc.tick(&mut hw, &mut tx);
        assert_eq!(svc.current_state(), expected, "lsa={lsa} lsc={lsc}");
    }
}

#[test]
fn boot_between_limits_reports_stopped() {
    let mut hw = MockDoor::with_inputs(InputLevels::idle());
    let mut tx = RecordingTelemetry::new();
    let mut svc = DoorService::new(DoorConfig::default(), hw.raw).unwrap();
    tick_n(&mut svc, &mut hw, &mut tx, 2);
    assert_eq!(svc.current_state(), StateId::Stopped);
    assert_eq!(hw.motor(), MotorDirection::Stop);
}

// ── Full cycle ───────────────────────────────────────────────

#[test]
fn full_open_close_cycle_publishes_once_per_transition() {
    let (mut svc, mut hw, mut tx) = settled_closed(on_transition());
    tx.records.clear();

    // Press and hold the open button until the motion starts.
    hw.raw.open_button = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Opening, 10);
    assert_eq!(hw.motor(), MotorDirection::Open);

    // Release; leaf leaves the close limit and travels.
    hw.raw.open_button = true;
    hw.raw.close_limit = false;
    tick_n(&mut svc, &mut hw, &mut tx, 20);
    assert_eq!(svc.current_state(), StateId::Opening);

    hw.raw.open_limit = true;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Open, 10);
    assert_eq!(hw.motor(), MotorDirection::Stop);
    assert!(hw.lamp(), "lamp is solid while open");

    let dwell = tick_until(&mut svc, &mut hw, &mut tx, StateId::Closing, 200);
    assert!(dwell > svc.config().auto_close_ticks);
    assert_eq!(hw.motor(), MotorDirection::Close);

    hw.raw.open_limit = false;
    hw.raw.close_limit = true;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Closed, 10);
    assert_eq!(hw.motor(), MotorDirection::Stop);

    assert_eq!(
        tx.state_publishes(),
        vec!["OPENING", "OPEN", "CLOSING", "CLOSED"]
    );
    let heartbeats = (svc.tick_count() / 10) as usize;
    assert_eq!(tx.count("periodic"), heartbeats);
    assert_eq!(tx.records.len(), 4 + heartbeats);
}

#[test]
fn dwell_counter_restarts_on_each_open_entry() {
    let mut raw = InputLevels::idle();
    raw.open_limit = true;
    let mut hw = MockDoor::with_inputs(raw);
    let mut tx = RecordingTelemetry::new();
    let mut config = on_transition();
    config.auto_close_ticks = 5;
    let mut svc = DoorService::new(config, raw).unwrap();

    tick_until(&mut svc, &mut hw, &mut tx, StateId::Open, 3);
    let first = tick_until(&mut svc, &mut hw, &mut tx, StateId::Closing, 20);

    // Reverse before the leaf leaves the open limit.
    svc.handle_command(DoorCommand::Open, &mut hw, &mut tx);
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Open, 3);
    let second = tick_until(&mut svc, &mut hw, &mut tx, StateId::Closing, 20);
    assert_eq!(first, second);
}

// ── Faults and timeouts ──────────────────────────────────────

#[test]
fn stalled_opening_times_out_into_error() {
    let (mut svc, mut hw, mut tx) = settled_closed(on_transition());
    svc.handle_command(DoorCommand::SetRunTimer(1_000), &mut hw, &mut tx);

    hw.raw.open_button = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Opening, 10);
    hw.raw.open_button = true;

    // Motor stalled: the leaf never leaves the close limit.
    let ticks = tick_until(&mut svc, &mut hw, &mut tx, StateId::Error, 30);
    assert!(ticks > 10);
    assert_eq!(hw.motor(), MotorDirection::Stop);
    assert!(!hw.lamp());
    assert_eq!(tx.state_publishes().last(), Some(&"ERROR"));

    // Latched while a limit is still asserted.
    hw.calls.clear();
    tick_n(&mut svc, &mut hw, &mut tx, 8);
    assert_eq!(svc.current_state(), StateId::Error);
    let buzz = hw.buzzer_history();
    assert!(buzz.contains(&true) && buzz.contains(&false));

    // Both limits clear: leave through STOPPED.
    hw.raw.close_limit = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Stopped, 10);
    assert_eq!(hw.buzzer_history().last(), Some(&false));
}

#[test]
fn fault_while_closing_stops_until_cleared() {
    let mut raw = InputLevels::idle();
    raw.open_limit = true;
    let mut hw = MockDoor::with_inputs(raw);
    let mut tx = RecordingTelemetry::new();
    let mut svc = DoorService::new(DoorConfig::default(), raw).unwrap();
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Open, 3);

    hw.raw.step_button = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Closing, 10);
    hw.raw.step_button = true;
    hw.raw.open_limit = false;
    tick_n(&mut svc, &mut hw, &mut tx, 5);
    assert_eq!(svc.current_state(), StateId::Closing);

    hw.raw.fault = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Stopped, 10);
    assert_eq!(hw.motor(), MotorDirection::Stop);
    tick_n(&mut svc, &mut hw, &mut tx, 10);
    assert_eq!(svc.current_state(), StateId::Stopped);

    hw.raw.fault = true;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Initial, 10);
}

#[test]
fn closing_limit_wins_over_simultaneous_fault() {
    let mut raw = InputLevels::idle();
    raw.open_limit = true;
    let mut hw = MockDoor::with_inputs(raw);
    let mut tx = RecordingTelemetry::new();
    let mut svc = DoorService::new(DoorConfig::default(), raw).unwrap();
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Open, 3);
    hw.raw.step_button = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Closing, 10);
    hw.raw.step_button = true;
    hw.raw.open_limit = false;
    tick_n(&mut svc, &mut hw, &mut tx, 5);

    hw.raw.close_limit = true;
    hw.raw.fault = false;
    tick_n(&mut svc, &mut hw, &mut tx, 6);
    assert_eq!(svc.current_state(), StateId::Closed);
}

// ── Indicators ───────────────────────────────────────────────

#[test]
fn lamp_blinks_while_opening() {
    let (mut svc, mut hw, mut tx) = settled_closed(DoorConfig::default());
    hw.raw.open_button = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Opening, 10);
    hw.raw.open_button = true;
    hw.raw.close_limit = false;

    let mut levels = Vec::new();
    for _ in 0..20 {
        svc.tick(&mut hw, &mut tx);
        levels.push(svc.outputs().lamp);
    }
    let on = levels.iter().filter(|l| **l).count();
    assert_eq!(on, 10, "50 % duty over two full periods");
}

// ── Telemetry loss ───────────────────────────────────────────

#[test]
fn controller_keeps_driving_without_telemetry() {
    let mut hw = MockDoor::closed();
    let mut tx = RecordingTelemetry {
        offline: true,
        ..RecordingTelemetry::default()
    };
    let mut svc = DoorService::new(DoorConfig::default(), hw.raw).unwrap();
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Closed, 5);

    hw.raw.open_button = false;
    tick_until(&mut svc, &mut hw, &mut tx, StateId::Opening, 10);
    assert_eq!(hw.motor(), MotorDirection::Open);
    assert!(tx.records.is_empty());

    // Nothing was buffered while offline.
    tx.offline = false;
    svc.tick(&mut hw, &mut tx);
    assert_eq!(tx.records.len(), 1);
}
