//! Remote commands: topic decoding → inbox → `DoorService::drain_commands`.

use doorctl::app::commands::{COMMAND_QUEUE_DEPTH, CommandInbox, DoorCommand};
use doorctl::app::service::DoorService;
use doorctl::codec::Topics;
use doorctl::config::{DoorConfig, PublishPolicy};
use doorctl::drivers::motor::MotorDirection;
use doorctl::error::CommandError;
use doorctl::fsm::StateId;
use doorctl::fsm::context::InputLevels;

use crate::mock_hw::{MockDoor, RecordingTelemetry, tick_n, tick_until};

struct Rig {
    topics: Topics,
    inbox: CommandInbox,
    svc: DoorService,
    hw: MockDoor,
    tx: RecordingTelemetry,
}

impl Rig {
    fn new(raw: InputLevels) -> Self {
        let config = DoorConfig {
            publish_policy: PublishPolicy::OnTransition,
            ..DoorConfig::default()
        };
        Self {
            topics: Topics::new(&config.base_topic).unwrap(),
            inbox: CommandInbox::new(),
            svc: DoorService::new(config, raw).unwrap(),
            hw: MockDoor::with_inputs(raw),
            tx: RecordingTelemetry::new(),
        }
    }

    fn closed() -> Self {
        let mut rig = Self::new(MockDoor::closed().raw);
        rig.settle(StateId::Closed);
        rig
    }

    fn settle(&mut self, target: StateId) {
        tick_until(&mut self.svc, &mut self.hw, &mut self.tx, target, 10);
    }

    /// Decode a broker message and queue it, as the receiver thread does.
    fn deliver(&mut self, suffix: &str, payload: &str) -> Result<(), CommandError> {
        let topic = format!("{}/cmd/{}", self.topics.base(), suffix);
        let cmd = self.topics.decode(&topic, payload.as_bytes())?;
        self.inbox.try_send(cmd).unwrap();
        Ok(())
    }

    /// One scheduler period: drain, then tick.
    fn period(&mut self) -> usize {
        let n = self
            .svc
            .drain_commands(&self.inbox, &mut self.hw, &mut self.tx);
        self.svc.tick(&mut self.hw, &mut self.tx);
        n
    }
}

// ── Configuration commands ───────────────────────────────────

#[test]
fn run_timer_payload_sets_watchdog_ticks() {
    let mut rig = Rig::closed();
    rig.deliver("set/RunTimer", "5000").unwrap();
    assert_eq!(rig.period(), 1);
    assert_eq!(rig.svc.config().movement_timeout_ticks, 50);
    assert_eq!(rig.tx.last().unwrap().reason, "set_RunTimer");
}

#[test]
fn timer_ca_payload_with_whitespace_is_accepted() {
    let mut rig = Rig::closed();
    rig.deliver("set/TimerCA", " 2500\n").unwrap();
    rig.period();
    assert_eq!(rig.svc.config().auto_close_ticks, 25);
}

#[test]
fn out_of_range_timer_is_dropped_before_queueing() {
    let mut rig = Rig::closed();
    let before = rig.svc.config().clone();
    rig.tx.records.clear();

    assert_eq!(
        rig.deliver("set/RunTimer", "70000"),
        Err(CommandError::OutOfRange(70_000))
    );
    assert_eq!(
        rig.deliver("set/TimerCA", ""),
        Err(CommandError::MissingPayload)
    );
    assert_eq!(
        rig.deliver("set/TimerCA", "12abc"),
        Err(CommandError::InvalidPayload)
    );
    assert_eq!(rig.period(), 0);
    assert_eq!(rig.svc.config(), &before);
    assert!(rig.tx.records.is_empty());
}

#[test]
fn unknown_suffix_changes_nothing() {
    let mut rig = Rig::closed();
    rig.tx.records.clear();
    for suffix in ["jump", "openx", "open/now", "set/Other"] {
        assert_eq!(
            rig.deliver(suffix, ""),
            Err(CommandError::UnknownCommand),
            "{suffix}"
        );
    }
    rig.period();
    assert_eq!(rig.svc.current_state(), StateId::Closed);
    assert!(rig.tx.records.is_empty());
}

#[test]
fn foreign_namespace_is_rejected() {
    let rig = Rig::closed();
    assert_eq!(
        rig.topics.decode("esp32/garage/cmd/open", b""),
        Err(CommandError::OutsideNamespace)
    );
}

// ── Motion commands ──────────────────────────────────────────

#[test]
fn open_command_starts_motion_on_next_tick() {
    let mut rig = Rig::closed();
    rig.deliver("open", "ignored").unwrap();
    rig.period();
    assert_eq!(rig.svc.current_state(), StateId::Opening);
    assert_eq!(rig.hw.motor(), MotorDirection::Open);
    assert_eq!(
        rig.tx.state_publishes().last(),
        Some(&"OPENING"),
        "transition record follows the ack"
    );
    assert!(rig.tx.reasons().contains(&"mqtt_cmd_open"));
}

#[test]
fn stop_cuts_motor_before_the_next_step() {
    let mut rig = Rig::closed();
    rig.deliver("open", "").unwrap();
    rig.period();
    rig.hw.raw.close_limit = false;
    tick_n(&mut rig.svc, &mut rig.hw, &mut rig.tx, 3);
    assert_eq!(rig.hw.motor(), MotorDirection::Open);

    rig.deliver("stop", "").unwrap();
    rig.svc
        .drain_commands(&rig.inbox, &mut rig.hw, &mut rig.tx);
    assert_eq!(rig.hw.motor(), MotorDirection::Stop);
    assert!(!rig.svc.outputs().motor_open);
    assert_eq!(rig.tx.last().unwrap().reason, "mqtt_cmd_stop");

    rig.svc.tick(&mut rig.hw, &mut rig.tx);
    assert_eq!(rig.svc.current_state(), StateId::Stopped);
    assert_eq!(rig.hw.motor(), MotorDirection::Stop);
}

#[test]
fn reset_overrides_error_latch() {
    let mut raw = InputLevels::idle();
    raw.open_limit = true;
    raw.close_limit = true;
    let mut rig = Rig::new(raw);
    rig.settle(StateId::Error);

    // Close limit clears but the open limit holds the latch.
    rig.hw.raw.close_limit = false;
    tick_n(&mut rig.svc, &mut rig.hw, &mut rig.tx, 8);
    assert_eq!(rig.svc.current_state(), StateId::Error);

    rig.deliver("reset", "").unwrap();
    rig.period();
    assert_eq!(rig.svc.current_state(), StateId::Initial);
    rig.period();
    assert_eq!(rig.svc.current_state(), StateId::Open);
    assert!(rig.tx.reasons().contains(&"mqtt_cmd_reset"));
}

#[test]
fn motion_commands_cannot_leave_error() {
    let mut raw = InputLevels::idle();
    raw.open_limit = true;
    raw.close_limit = true;
    let mut rig = Rig::new(raw);
    rig.settle(StateId::Error);
    rig.tx.records.clear();

    for suffix in ["close", "open"] {
        rig.deliver(suffix, "").unwrap();
        rig.period();
        assert_eq!(rig.svc.current_state(), StateId::Error, "{suffix}");
        assert_eq!(rig.hw.motor(), MotorDirection::Stop);
    }
    tick_n(&mut rig.svc, &mut rig.hw, &mut rig.tx, 5);
    assert_eq!(rig.svc.current_state(), StateId::Error);
    assert!(!rig.tx.reasons().contains(&"mqtt_cmd_close"));
    assert!(!rig.tx.reasons().contains(&"mqtt_cmd_open"));
}

#[test]
fn lamp_on_does_not_leak_into_the_idle_position() {
    let mut rig = Rig::closed();
    rig.deliver("lamp_on", "").unwrap();
    rig.period();
    assert!(!rig.hw.lamp(), "CLOSED rewrites the lamp on its next step");

    rig.hw.raw.close_limit = false;
    tick_n(&mut rig.svc, &mut rig.hw, &mut rig.tx, 5);
    rig.deliver("reset", "").unwrap();
    for _ in 0..50 {
        rig.period();
        assert!(!rig.svc.outputs().lamp, "{:?}", rig.svc.current_state());
    }
    assert!(matches!(
        rig.svc.current_state(),
        StateId::Stopped | StateId::Initial
    ));
}

// ── Lamp and status ──────────────────────────────────────────

#[test]
fn lamp_commands_write_the_lamp_and_acknowledge() {
    let mut rig = Rig::closed();
    rig.deliver("lamp_on", "").unwrap();
    rig.svc
        .drain_commands(&rig.inbox, &mut rig.hw, &mut rig.tx);
    assert!(rig.hw.lamp());
    assert!(rig.tx.last().unwrap().outputs.lamp);
    assert_eq!(rig.tx.last().unwrap().reason, "mqtt_cmd_lamp_on");

    rig.deliver("lamp_off", "").unwrap();
    rig.svc
        .drain_commands(&rig.inbox, &mut rig.hw, &mut rig.tx);
    assert!(!rig.hw.lamp());
}

#[test]
fn status_and_announce_only_publish() {
    let mut rig = Rig::closed();
    rig.tx.records.clear();
    rig.deliver("status", "").unwrap();
    rig.inbox.try_send(DoorCommand::Announce).unwrap();
    rig.period();

    assert_eq!(rig.tx.reasons(), vec!["mqtt_cmd_status", "connected"]);
    let last = rig.tx.last().unwrap();
    assert_eq!(last.state, StateId::Closed);
    assert!(last.inputs.close_limit);
}

// ── Inbox ────────────────────────────────────────────────────

#[test]
fn full_inbox_refuses_further_commands() {
    let mut rig = Rig::closed();
    for _ in 0..COMMAND_QUEUE_DEPTH {
        rig.inbox.try_send(DoorCommand::Status).unwrap();
    }
    assert!(rig.inbox.try_send(DoorCommand::Open).is_err());

    assert_eq!(rig.period(), COMMAND_QUEUE_DEPTH);
    assert_eq!(rig.svc.current_state(), StateId::Closed);
    assert_eq!(rig.tx.count("mqtt_cmd_status"), COMMAND_QUEUE_DEPTH);
}
