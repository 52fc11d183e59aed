//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DoorService (domain)
//! ```
//!
//! Driven adapters (GPIO, MQTT, log) implement these traits.  The
//! [`DoorService`](super::service::DoorService) consumes them via
//! generics, so the controller never touches hardware directly and runs
//! entirely in memory under test.

use crate::drivers::motor::MotorDirection;
use crate::error::CommsError;
use crate::fsm::context::InputLevels;

use super::events::StatusSnapshot;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw, undebounced reads of the six door inputs.
pub trait InputSource {
    /// Sample every input once.  Infallible: an adapter that cannot read
    /// a line reports its last known level.
    fn sample(&mut self) -> InputLevels;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the four outputs.
pub trait ActuatorSink {
    /// Drive both bridge lines as one operation.  Implementations must
    /// never leave both lines asserted, even transiently.
    fn drive_motor(&mut self, direction: MotorDirection);

    fn set_lamp(&mut self, on: bool);

    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → broker / log)
// ───────────────────────────────────────────────────────────────

/// Best-effort status publisher.  A failed publish is reported and
/// forgotten; nothing is queued for retry.
pub trait Telemetry {
    fn publish(&mut self, status: &StatusSnapshot) -> Result<(), CommsError>;
}
