//! Concrete state handler functions and table builder.
//!
//! Each state is one plain `fn` pointer: it commands the motor, then
//! walks its guards in priority order and returns the first match.  The
//! order of the `if` chains below is the safety priority; do not reorder.
//!
//! While moving, the button guards act on fresh presses only (see
//! [`DoorContext::fresh_presses`]).  The fault input is level-sensitive.
//!
//! ```text
//!                  ┌──[both limits]──▶ ERROR ──[both clear]──┐
//!                  │                                         ▼
//!  INITIAL ──[lsc]──▶ CLOSED ──[open|step]──▶ OPENING ──[lsa]──▶ OPEN
//!    ▲  │                ▲                   │  ▲                │
//!    │  └──[lsa]──▶ OPEN │                [step]│[step]    [dwell|step]
//!    │                   │                   ▼  │                ▼
//!    │                   └───────[lsc]────── CLOSING ◀───────────┘
//!    │
//!    └──[fault clear]── STOPPED ◀──[button|fault while moving]
//! ```
//!
//! Lamp and buzzer are not driven here; they are derived from the state
//! and elapsed time by the service after each step.

use super::context::DoorContext;
use super::{StateDescriptor, StateId};
use crate::drivers::motor::MotorDirection;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Initial,
            run: initial,
        },
        StateDescriptor {
            id: StateId::Closing,
            run: closing,
        },
        StateDescriptor {
            id: StateId::Opening,
            run: opening,
        },
        StateDescriptor {
            id: StateId::Closed,
            run: closed,
        },
        StateDescriptor {
            id: StateId::Open,
            run: open,
        },
        StateDescriptor {
            id: StateId::Error,
            run: error,
        },
        StateDescriptor {
            id: StateId::Stopped,
            run: stopped,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  INITIAL — resolve position from the limit switches
// ═══════════════════════════════════════════════════════════════════════════

fn initial(ctx: &mut DoorContext) -> StateId {
    ctx.commands.motor = MotorDirection::Stop;

    let lsa = ctx.inputs.open_limit_reached();
    let lsc = ctx.inputs.close_limit_reached();

    match (lsc, lsa) {
        (true, true) => StateId::Error,
        (true, false) => StateId::Closed,
        (false, true) => StateId::Open,
        (false, false) => StateId::Stopped,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLOSING
// ═══════════════════════════════════════════════════════════════════════════

fn closing(ctx: &mut DoorContext) -> StateId {
    if ctx.just_entered() {
        ctx.state.watchdog_ticks = 0;
    }
    ctx.commands.motor = MotorDirection::Close;

    let pressed = ctx.fresh_presses();
    let i = ctx.inputs;
    if i.close_limit_reached() {
        return StateId::Closed;
    }
    if pressed.close || pressed.open || i.fault_active() {
        info!("CLOSING: interrupted by operator input or fault");
        return StateId::Stopped;
    }
    if pressed.step {
        return StateId::Opening;
    }
    if ctx.movement_timed_out() {
        warn!(
            "CLOSING: close limit not reached after {} ticks",
            ctx.state.watchdog_ticks
        );
        return StateId::Error;
    }
    StateId::Closing
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPENING
// ═══════════════════════════════════════════════════════════════════════════

fn opening(ctx: &mut DoorContext) -> StateId {
    if ctx.just_entered() {
        ctx.state.watchdog_ticks = 0;
    }
    ctx.commands.motor = MotorDirection::Open;

    let pressed = ctx.fresh_presses();
    let i = ctx.inputs;
    if i.open_limit_reached() {
        return StateId::Open;
    }
    if pressed.open || pressed.close || i.fault_active() {
        info!("OPENING: interrupted by operator input or fault");
        return StateId::Stopped;
    }
    if pressed.step {
        return StateId::Closing;
    }
    if ctx.movement_timed_out() {
        warn!(
            "OPENING: open limit not reached after {} ticks",
            ctx.state.watchdog_ticks
        );
        return StateId::Error;
    }
    StateId::Opening
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLOSED / OPEN — resting at an end of travel
// ═══════════════════════════════════════════════════════════════════════════

fn closed(ctx: &mut DoorContext) -> StateId {
    ctx.commands.motor = MotorDirection::Stop;

    if ctx.inputs.open_pressed() || ctx.inputs.step_pressed() {
        return StateId::Opening;
    }
    StateId::Closed
}

fn open(ctx: &mut DoorContext) -> StateId {
    if ctx.just_entered() {
        ctx.state.dwell_ticks = 0;
    }
    ctx.commands.motor = MotorDirection::Stop;

    if ctx.dwell_elapsed() || ctx.inputs.step_pressed() {
        return StateId::Closing;
    }
    StateId::Open
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR — latched until both limit switches read clear
// ═══════════════════════════════════════════════════════════════════════════

fn error(ctx: &mut DoorContext) -> StateId {
    if ctx.just_entered() {
        warn!(
            "ERROR: entered from {} (lsa={}, lsc={})",
            ctx.state.previous.name(),
            ctx.inputs.open_limit as u8,
            ctx.inputs.close_limit as u8
        );
    }
    ctx.commands.motor = MotorDirection::Stop;

    if !ctx.inputs.open_limit_reached() && !ctx.inputs.close_limit_reached() {
        return StateId::Stopped;
    }
    StateId::Error
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPED — waits for the fault loop to read healthy
// ═══════════════════════════════════════════════════════════════════════════

fn stopped(ctx: &mut DoorContext) -> StateId {
    ctx.commands.motor = MotorDirection::Stop;

    if !ctx.inputs.fault_active() {
        return StateId::Initial;
    }
    StateId::Stopped
}
