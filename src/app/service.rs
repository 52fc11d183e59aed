//! Door service — the hexagonal core.
//!
//! [`DoorService`] owns the FSM, the input bank, and the controller
//! context.  It exposes a hardware-agnostic API; all I/O flows through
//! port traits injected at call sites, so the whole controller runs
//! against mock adapters in tests.
//!
//! ```text
//!  InputSource ──▶ ┌────────────────────────┐ ──▶ Telemetry
//!                  │       DoorService       │
//! ActuatorSink ◀── │  Debounce · FSM · Lamp  │ ◀── CommandInbox
//!                  └────────────────────────┘
//! ```
//!
//! Each [`tick`](DoorService::tick) runs, strictly in order:
//!
//! 1. advance the elapsed-time, watchdog and dwell counters;
//! 2. sample and debounce the six inputs;
//! 3. run one FSM step and drive the motor;
//! 4. recompute lamp and buzzer from elapsed time;
//! 5. publish the state record (per policy) and the heartbeat.

use log::{debug, info, warn};

use crate::config::{DoorConfig, PublishPolicy};
use crate::drivers::debounce::InputBank;
use crate::drivers::indicator;
use crate::drivers::motor::MotorDirection;
use crate::error::ConfigError;
use crate::fsm::context::{DoorContext, InputLevels};
use crate::fsm::states::build_state_table;
use crate::fsm::{ControllerState, Fsm, StateId};

use super::commands::{CommandInbox, DoorCommand};
use super::events::{OutputLevels, StatusSnapshot};
use super::ports::{ActuatorSink, InputSource, Telemetry};

// ───────────────────────────────────────────────────────────────
// DoorService
// ───────────────────────────────────────────────────────────────

pub struct DoorService {
    fsm: Fsm,
    ctx: DoorContext,
    inputs: InputBank,
    /// Levels last written to the outputs.
    outputs: OutputLevels,
    /// Milliseconds since the last heartbeat publish.
    heartbeat_ms: u32,
    tick_count: u64,
    /// False after a publish failed, until one succeeds again.
    link_up: bool,
}

impl DoorService {
    /// Build the controller in INITIAL.  `initial_raw` seeds the debounced
    /// levels straight from the pins.
    pub fn new(config: DoorConfig, initial_raw: InputLevels) -> Result<Self, ConfigError> {
        config.validate()?;
        let inputs = InputBank::new(config.debounce_threshold, initial_raw);
        let ctx = DoorContext::new(config, inputs.levels());
        info!(
            "DoorService ready: tick={}ms watchdog={} ticks auto-close={} ticks",
            ctx.config.tick_ms, ctx.config.movement_timeout_ticks, ctx.config.auto_close_ticks
        );
        Ok(Self {
            fsm: Fsm::new(build_state_table()),
            ctx,
            inputs,
            outputs: OutputLevels::default(),
            heartbeat_ms: 0,
            tick_count: 0,
            link_up: true,
        })
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// `hw` satisfies **both** [`InputSource`] and [`ActuatorSink`] — this
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl InputSource + ActuatorSink),
        telemetry: &mut impl Telemetry,
    ) {
        self.tick_count += 1;
        let tick_ms = self.ctx.config.tick_ms;

        // 1. Counters, gated by the state that ran last tick
        self.ctx.state.advance(tick_ms);

        // 2. Inputs
        self.inputs.update(hw.sample());
        self.ctx.inputs = self.inputs.levels();

        // 3. One FSM step, then the motor
        self.fsm.step(&mut self.ctx);
        self.apply_motor(hw);

        // 4. Indicators
        self.apply_indicators(hw);

        // 5. Telemetry
        let publish_state = match self.ctx.config.publish_policy {
            PublishPolicy::EveryTick => true,
            PublishPolicy::OnTransition => self.ctx.just_entered(),
        };
        if publish_state {
            self.publish(self.ctx.state.current.name(), telemetry);
        }

        self.heartbeat_ms = self.heartbeat_ms.saturating_add(tick_ms);
        if self.heartbeat_ms >= self.ctx.config.heartbeat_ms {
            self.heartbeat_ms = 0;
            self.publish("periodic", telemetry);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute one remote command and publish its acknowledgement record.
    ///
    /// State changes only set the pending state; the next tick performs
    /// the transition.  `Open` and `Close` are dropped while ERROR is
    /// latched.  `Reset` is an operator override: it bypasses the ERROR
    /// latch but clears no physical fault.
    pub fn handle_command(
        &mut self,
        cmd: DoorCommand,
        hw: &mut impl ActuatorSink,
        telemetry: &mut impl Telemetry,
    ) {
        match cmd {
            DoorCommand::Open | DoorCommand::Close if self.error_latched() => {
                debug!("{:?} dropped: ERROR latched until both limits clear", cmd);
                return;
            }
            DoorCommand::Open => self.ctx.state.request(StateId::Opening),
            DoorCommand::Close => self.ctx.state.request(StateId::Closing),
            DoorCommand::Stop => {
                self.ctx.state.request(StateId::Stopped);
                self.ctx.commands.motor = MotorDirection::Stop;
                self.apply_motor(hw);
            }
            DoorCommand::Reset => {
                info!("Operator reset from {}", self.ctx.state.current.name());
                self.ctx.state.request(StateId::Initial);
            }
            DoorCommand::LampOn | DoorCommand::LampOff => {
                let on = cmd == DoorCommand::LampOn;
                hw.set_lamp(on);
                self.outputs.lamp = on;
            }
            DoorCommand::Status | DoorCommand::Announce => {}
            DoorCommand::SetRunTimer(ms) => {
                match self.ctx.config.set_movement_timeout_ms(i64::from(ms)) {
                    Ok(ticks) => info!("Movement timeout set to {} ms ({} ticks)", ms, ticks),
                    Err(e) => {
                        debug!("set/RunTimer dropped: {}", e);
                        return;
                    }
                }
            }
            DoorCommand::SetTimerCA(ms) => match self.ctx.config.set_auto_close_ms(i64::from(ms)) {
                Ok(ticks) => info!("Auto-close set to {} ms ({} ticks)", ms, ticks),
                Err(e) => {
                    debug!("set/TimerCA dropped: {}", e);
                    return;
                }
            },
        }
        info!("Command {:?} applied", cmd);
        self.publish(cmd.reason(), telemetry);
    }

    /// Apply every queued command.  Called from the tick context only.
    pub fn drain_commands(
        &mut self,
        inbox: &CommandInbox,
        hw: &mut impl ActuatorSink,
        telemetry: &mut impl Telemetry,
    ) -> usize {
        let mut applied = 0;
        while let Ok(cmd) = inbox.try_receive() {
            self.handle_command(cmd, hw, telemetry);
            applied += 1;
        }
        applied
    }

    // ── Queries ───────────────────────────────────────────────

    /// Project the controller into a status record.
    pub fn snapshot(&self, reason: &'static str) -> StatusSnapshot {
        StatusSnapshot {
            state: self.ctx.state.current,
            inputs: self.ctx.inputs,
            outputs: self.outputs,
            reason,
            elapsed_ms: self.ctx.state.elapsed_ms,
        }
    }

    pub fn current_state(&self) -> StateId {
        self.ctx.state.current
    }

    pub fn controller_state(&self) -> &ControllerState {
        &self.ctx.state
    }

    pub fn config(&self) -> &DoorConfig {
        &self.ctx.config
    }

    pub fn outputs(&self) -> OutputLevels {
        self.outputs
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// ERROR is current, or the step that just ran chose it.
    fn error_latched(&self) -> bool {
        self.ctx.state.current == StateId::Error || self.ctx.state.pending == StateId::Error
    }

    fn apply_motor(&mut self, hw: &mut impl ActuatorSink) {
        let direction = self.ctx.commands.motor;
        hw.drive_motor(direction);
        let lines = direction.lines();
        self.outputs.motor_open = lines.open;
        self.outputs.motor_close = lines.close;
    }

    fn apply_indicators(&mut self, hw: &mut impl ActuatorSink) {
        let state = self.ctx.state.current;
        let t = self.ctx.state.elapsed_ms;

        let lamp = match indicator::lamp_pattern(state) {
            Some(pattern) => pattern.level(t),
            None => self.outputs.lamp,
        };
        let buzzer = indicator::buzzer_pattern(state).level(t);

        hw.set_lamp(lamp);
        hw.set_buzzer(buzzer);
        self.outputs.lamp = lamp;
        self.outputs.buzzer = buzzer;
    }

    fn publish(&mut self, reason: &'static str, telemetry: &mut impl Telemetry) {
        let snapshot = self.snapshot(reason);
        match telemetry.publish(&snapshot) {
            Ok(()) => {
                if !self.link_up {
                    info!("Telemetry restored");
                    self.link_up = true;
                }
            }
            Err(e) => {
                if self.link_up {
                    warn!("Telemetry unavailable: {}", e);
                    self.link_up = false;
                }
            }
        }
    }
}
