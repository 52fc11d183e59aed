//! Unified error types for the door controller firmware.
//!
//! Nothing in here is fatal to the control loop.  Configuration and command
//! errors are reported to the caller and dropped; telemetry errors are logged
//! and the tick carries on driving the hardware.  Every variant is `Copy` so
//! errors can be passed around the tick path without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible library operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A configuration value was rejected.
    Config(ConfigError),
    /// An inbound remote command could not be decoded.
    Command(CommandError),
    /// The telemetry channel refused a record.
    Comms(CommsError),
    /// A digital I/O line could not be read or written.
    Gpio(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Gpio(line) => write!(f, "gpio: {line}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A config field failed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The `&'static str` names the field and the violated bound.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Command decode errors
// ---------------------------------------------------------------------------

/// Why an inbound topic/payload pair did not become a command.
///
/// The service never surfaces these to the operator; they exist so the
/// adapter can log at the right level and tests can tell the cases apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Topic does not live under `<base>/cmd/`.
    OutsideNamespace,
    /// Topic suffix is not one of the recognised commands.
    UnknownCommand,
    /// A `set/...` command arrived with an empty payload.
    MissingPayload,
    /// Payload is not an ASCII decimal integer.
    InvalidPayload,
    /// Payload parsed but falls outside `0 < ms < 60000`.
    OutOfRange(i64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideNamespace => write!(f, "topic outside command namespace"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingPayload => write!(f, "missing payload"),
            Self::InvalidPayload => write!(f, "payload is not a decimal integer"),
            Self::OutOfRange(v) => write!(f, "value {v} out of range"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// No broker session is established.
    NotConnected,
    /// The client refused to enqueue the message.
    PublishFailed,
    /// The status record could not be serialised.
    Encode,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "MQTT not connected"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::Encode => write!(f, "status encode failed"),
        }
    }
}

impl std::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
