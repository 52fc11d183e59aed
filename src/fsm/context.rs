//! Shared mutable context threaded through every FSM handler.
//!
//! `DoorContext` is the single struct that state handlers read from and
//! write to: the debounced input levels, the motor command, the live
//! configuration, and the [`ControllerState`] with its counters.

use crate::config::DoorConfig;
use crate::drivers::debounce::InputId;
use crate::drivers::motor::MotorDirection;

use super::{ControllerState, StateId};

// ---------------------------------------------------------------------------
// Input levels (read-only to state handlers; written by the input bank)
// ---------------------------------------------------------------------------

/// Electrical level of each input (`true` = pin reads high).
///
/// The same shape carries raw samples from an [`InputSource`] and the
/// debounced levels handed to the FSM.
///
/// | Field          | Meaning when LOW           | Meaning when HIGH     |
/// |----------------|----------------------------|-----------------------|
/// | `open_limit`   | not at open end            | fully open reached    |
/// | `close_limit`  | not at closed end          | fully closed reached  |
/// | `open_button`  | pressed                    | idle                  |
/// | `close_button` | pressed                    | idle                  |
/// | `step_button`  | pressed                    | idle                  |
/// | `fault`        | thermal/e-stop fault       | healthy               |
///
/// [`InputSource`]: crate::app::ports::InputSource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputLevels {
    pub open_limit: bool,
    pub close_limit: bool,
    pub open_button: bool,
    pub close_button: bool,
    pub step_button: bool,
    pub fault: bool,
}

impl InputLevels {
    /// Buttons released, no fault, leaf between the limits.
    pub fn idle() -> Self {
        Self {
            open_limit: false,
            close_limit: false,
            open_button: true,
            close_button: true,
            step_button: true,
            fault: true,
        }
    }

    pub fn get(&self, id: InputId) -> bool {
        match id {
            InputId::OpenLimit => self.open_limit,
            InputId::CloseLimit => self.close_limit,
            InputId::OpenButton => self.open_button,
            InputId::CloseButton => self.close_button,
            InputId::StepButton => self.step_button,
            InputId::Fault => self.fault,
        }
    }

    pub fn set(&mut self, id: InputId, level: bool) {
        match id {
            InputId::OpenLimit => self.open_limit = level,
            InputId::CloseLimit => self.close_limit = level,
            InputId::OpenButton => self.open_button = level,
            InputId::CloseButton => self.close_button = level,
            InputId::StepButton => self.step_button = level,
            InputId::Fault => self.fault = level,
        }
    }

    pub fn open_limit_reached(&self) -> bool {
        self.open_limit
    }

    pub fn close_limit_reached(&self) -> bool {
        self.close_limit
    }

    pub fn open_pressed(&self) -> bool {
        !self.open_button
    }

    pub fn close_pressed(&self) -> bool {
        !self.close_button
    }

    pub fn step_pressed(&self) -> bool {
        !self.step_button
    }

    pub fn fault_active(&self) -> bool {
        !self.fault
    }
}

/// One flag per operator button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub open: bool,
    pub close: bool,
    pub step: bool,
}

impl Buttons {
    fn pressed(i: &InputLevels) -> Self {
        Self {
            open: i.open_pressed(),
            close: i.close_pressed(),
            step: i.step_pressed(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorCommands {
    pub motor: MotorDirection,
}

// ---------------------------------------------------------------------------
// DoorContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
#[derive(Debug, Clone)]
pub struct DoorContext {
    /// State tags and tick counters.
    pub state: ControllerState,
    /// Debounced levels.  Updated before each FSM step.
    pub inputs: InputLevels,
    pub commands: ActuatorCommands,
    pub config: DoorConfig,
    /// Buttons still held since the current motion started.
    pub held: Buttons,
}

impl DoorContext {
    pub fn new(config: DoorConfig, inputs: InputLevels) -> Self {
        Self {
            state: ControllerState::new(StateId::Initial),
            inputs,
            commands: ActuatorCommands::default(),
            config,
            held: Buttons::default(),
        }
    }

    /// Buttons pressed since the motion began.
    ///
    /// A button already held on the step that entered OPENING/CLOSING
    /// (typically the one that started the motion) is masked until its
    /// debounced level reads released.
    pub fn fresh_presses(&mut self) -> Buttons {
        let now = Buttons::pressed(&self.inputs);
        if self.just_entered() {
            self.held = now;
        } else {
            self.held.open &= now.open;
            self.held.close &= now.close;
            self.held.step &= now.step;
        }
        Buttons {
            open: now.open && !self.held.open,
            close: now.close && !self.held.close,
            step: now.step && !self.held.step,
        }
    }

    /// True on the step in which the current state was entered.
    pub fn just_entered(&self) -> bool {
        self.state.current != self.state.previous
    }

    /// Movement watchdog has run past the configured timeout.
    pub fn movement_timed_out(&self) -> bool {
        self.state.watchdog_ticks > self.config.movement_timeout_ticks
    }

    /// Door has dwelt open past the configured auto-close time.
    pub fn dwell_elapsed(&self) -> bool {
        self.state.dwell_ticks > self.config.auto_close_ticks
    }
}
