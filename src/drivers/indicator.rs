//! Lamp and buzzer blink patterns.
//!
//! Patterns are pure functions of the controller's elapsed time; the
//! outputs themselves hold no phase.
//!
//! | State    | Lamp                      | Buzzer                  |
//! |----------|---------------------------|-------------------------|
//! | OPENING  | 1000 ms period, 50 % duty | off                     |
//! | CLOSING  | 500 ms period, 50 % duty  | off                     |
//! | OPEN     | solid                     | off                     |
//! | ERROR    | off                       | 400 ms period, 50 %     |
//! | STOPPED  | unchanged                 | off                     |
//! | others   | off                       | off                     |

use crate::fsm::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPattern {
    Off,
    Solid,
    /// High for the first `on_ms` of every `period_ms`.
    Blink { period_ms: u32, on_ms: u32 },
    /// Low for the first `off_ms` of every `period_ms`, then high.
    BlinkLate { period_ms: u32, off_ms: u32 },
}

impl BlinkPattern {
    /// Output level at `elapsed_ms`.
    pub fn level(self, elapsed_ms: u64) -> bool {
        match self {
            Self::Off => false,
            Self::Solid => true,
            Self::Blink { period_ms, on_ms } => {
                period_ms > 0 && elapsed_ms % u64::from(period_ms) < u64::from(on_ms)
            }
            Self::BlinkLate { period_ms, off_ms } => {
                period_ms > 0 && elapsed_ms % u64::from(period_ms) >= u64::from(off_ms)
            }
        }
    }
}

/// Lamp pattern for `state`.  `None` leaves the lamp at its last level.
pub fn lamp_pattern(state: StateId) -> Option<BlinkPattern> {
    match state {
        StateId::Opening => Some(BlinkPattern::Blink {
            period_ms: 1000,
            on_ms: 500,
        }),
        StateId::Closing => Some(BlinkPattern::Blink {
            period_ms: 500,
            on_ms: 250,
        }),
        StateId::Open => Some(BlinkPattern::Solid),
        StateId::Stopped => None,
        StateId::Initial | StateId::Closed | StateId::Error => Some(BlinkPattern::Off),
    }
}

pub fn buzzer_pattern(state: StateId) -> BlinkPattern {
    match state {
        StateId::Error => BlinkPattern::BlinkLate {
            period_ms: 400,
            off_ms: 200,
        },
        _ => BlinkPattern::Off,
    }
}
