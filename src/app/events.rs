//! Outbound status records.
//!
//! The [`DoorService`](super::service::DoorService) builds a fresh
//! [`StatusSnapshot`] for every publish and hands it to the
//! [`Telemetry`](super::ports::Telemetry) port.  Adapters decide how to
//! render it (JSON on the broker, a log line on the console).

use crate::fsm::StateId;
use crate::fsm::context::InputLevels;

/// Levels last written to the four outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputLevels {
    pub motor_open: bool,
    pub motor_close: bool,
    pub lamp: bool,
    pub buzzer: bool,
}

/// Read-only projection of the controller at publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: StateId,
    /// Debounced input levels.
    pub inputs: InputLevels,
    pub outputs: OutputLevels,
    /// What triggered the publish: a state name, `periodic`, or a command tag.
    pub reason: &'static str,
    pub elapsed_ms: u64,
}
