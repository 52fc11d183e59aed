//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern, one row per state:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  StateTable                          │
//! │  ┌──────────┬─────────────────────┐  │
//! │  │ StateId  │ run                 │  │
//! │  ├──────────┼─────────────────────┤  │
//! │  │ Initial  │ fn(ctx) -> StateId  │  │
//! │  │ Closing  │ fn(ctx) -> StateId  │  │
//! │  │ Opening  │ fn(ctx) -> StateId  │  │
//! │  │ Closed   │ fn(ctx) -> StateId  │  │
//! │  │ Open     │ fn(ctx) -> StateId  │  │
//! │  │ Error    │ fn(ctx) -> StateId  │  │
//! │  │ Stopped  │ fn(ctx) -> StateId  │  │
//! │  └──────────┴─────────────────────┘  │
//! └──────────────────────────────────────┘
//! ```
//!
//! Each step the engine makes the *pending* state current and runs its
//! handler, which returns the state to run on the following step.  A
//! guard that fires on tick N is therefore only acted upon at tick N+1.
//! This one-tick lag is inherited from the deployed controller and is
//! kept on purpose: collapsing `pending` into `current` would change which
//! inputs each guard sees.

pub mod context;
pub mod states;

use context::DoorContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all controller states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Initial = 0,
    Closing = 1,
    Opening = 2,
    Closed = 3,
    Open = 4,
    Error = 5,
    Stopped = 6,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 7;

    pub const ALL: [StateId; StateId::COUNT] = [
        StateId::Initial,
        StateId::Closing,
        StateId::Opening,
        StateId::Closed,
        StateId::Open,
        StateId::Error,
        StateId::Stopped,
    ];

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Error` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match StateId::ALL.get(idx) {
            Some(id) => *id,
            None => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Error
            }
        }
    }

    /// Upper-case name used on the wire and as the publish reason.
    pub fn name(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Closing => "CLOSING",
            Self::Opening => "OPENING",
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::Error => "ERROR",
            Self::Stopped => "STOPPED",
        }
    }

    /// States in which the motor is energised.
    pub fn is_moving(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

// ---------------------------------------------------------------------------
// Controller state
// ---------------------------------------------------------------------------

/// State tags and tick counters, owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// State whose handler ran on the latest step.
    pub current: StateId,
    /// `current` as of the step before.
    pub previous: StateId,
    /// State the next step will run.
    pub pending: StateId,
    /// Milliseconds since start-up.
    pub elapsed_ms: u64,
    /// Ticks spent moving since the last OPENING/CLOSING entry.
    pub watchdog_ticks: u32,
    /// Ticks spent in OPEN since it was entered.
    pub dwell_ticks: u32,
}

impl ControllerState {
    pub fn new(initial: StateId) -> Self {
        Self {
            current: initial,
            previous: initial,
            pending: initial,
            elapsed_ms: 0,
            watchdog_ticks: 0,
            dwell_ticks: 0,
        }
    }

    /// Advance global time and the one counter the current state gates.
    pub fn advance(&mut self, tick_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.wrapping_add(u64::from(tick_ms));
        match self.current {
            StateId::Opening | StateId::Closing => {
                self.watchdog_ticks = self.watchdog_ticks.saturating_add(1);
            }
            StateId::Open => {
                self.dwell_ticks = self.dwell_ticks.saturating_add(1);
            }
            _ => {}
        }
    }

    /// Overwrite the pending state (remote commands).
    pub fn request(&mut self, target: StateId) {
        self.pending = target;
    }
}

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Per-step handler.  Applies the state's outputs and returns the state
/// to run next (itself when no guard matched).
pub type StateFn = fn(&mut DoorContext) -> StateId;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub run: StateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.  Holds only the table; all mutable
/// state lives in the [`DoorContext`] threaded through [`Fsm::step`].
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT]) -> Self {
        debug_assert!(
            table
                .iter()
                .enumerate()
                .all(|(i, row)| row.id as usize == i),
            "state table out of order"
        );
        Self { table }
    }

    /// Run exactly one state handler.
    ///
    /// 1. `previous <- current`, `current <- pending`.
    /// 2. Call the handler for `current`.
    /// 3. Store its verdict in `pending` for the next step.
    pub fn step(&self, ctx: &mut DoorContext) {
        let target = ctx.state.pending;
        ctx.state.previous = ctx.state.current;
        ctx.state.current = target;

        if ctx.just_entered() {
            info!(
                "FSM transition: {} -> {}",
                ctx.state.previous.name(),
                target.name()
            );
        }

        ctx.state.pending = (self.table[target as usize].run)(ctx);
    }
}
