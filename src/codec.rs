//! Status record encoding and command decoding.
//!
//! Stateless: every function transforms its arguments and returns.
//!
//! ## Topics
//!
//! | Direction | Topic                    | Payload                          |
//! |-----------|--------------------------|----------------------------------|
//! | publish   | `<base>/state`           | JSON status record               |
//! | subscribe | `<base>/cmd/#`           | empty, or decimal ms for `set/…` |
//!
//! ## Status record
//!
//! ```json
//! {"state":"OPENING","lsa":0,"lsc":0,"keya":1,"keyc":1,"pp":1,"ftc":1,
//!  "lamp":1,"ma":1,"mc":0,"reason":"OPENING"}
//! ```

use core::fmt::Write as _;

use serde::Serialize;

use crate::app::commands::DoorCommand;
use crate::app::events::StatusSnapshot;
use crate::config;
use crate::error::{CommandError, CommsError, ConfigError};

/// Longest topic the controller builds or accepts as a base.
pub const TOPIC_CAPACITY: usize = 64;

pub type Topic = heapless::String<TOPIC_CAPACITY>;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Topic names derived once from the configured base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: Topic,
    state: Topic,
    command_filter: Topic,
}

impl Topics {
    pub fn new(base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base: join(base, "")?,
            state: join(base, "/state")?,
            command_filter: join(base, "/cmd/#")?,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<base>/state`
    pub fn state(&self) -> &str {
        &self.state
    }

    /// `<base>/cmd/#`
    pub fn command_filter(&self) -> &str {
        &self.command_filter
    }

    /// Decode a message received on any topic.
    pub fn decode(&self, topic: &str, payload: &[u8]) -> Result<DoorCommand, CommandError> {
        decode_command(&self.base, topic, payload)
    }
}

fn join(base: &str, suffix: &str) -> Result<Topic, ConfigError> {
    let mut topic = Topic::new();
    write!(topic, "{base}{suffix}")
        .map_err(|_| ConfigError::ValidationFailed("base_topic too long"))?;
    Ok(topic)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Wire shape of one status publish.  Field order is the wire order.
#[derive(Debug, Serialize)]
struct StatusRecord<'a> {
    state: &'a str,
    lsa: u8,
    lsc: u8,
    keya: u8,
    keyc: u8,
    pp: u8,
    ftc: u8,
    lamp: u8,
    ma: u8,
    mc: u8,
    reason: &'a str,
}

impl<'a> From<&'a StatusSnapshot> for StatusRecord<'a> {
    fn from(s: &'a StatusSnapshot) -> Self {
        Self {
            state: s.state.name(),
            lsa: u8::from(s.inputs.open_limit),
            lsc: u8::from(s.inputs.close_limit),
            keya: u8::from(s.inputs.open_button),
            keyc: u8::from(s.inputs.close_button),
            pp: u8::from(s.inputs.step_button),
            ftc: u8::from(s.inputs.fault),
            lamp: u8::from(s.outputs.lamp),
            ma: u8::from(s.outputs.motor_open),
            mc: u8::from(s.outputs.motor_close),
            reason: s.reason,
        }
    }
}

/// Render a snapshot as the JSON status record.
pub fn encode_status(snapshot: &StatusSnapshot) -> Result<String, CommsError> {
    serde_json::to_string(&StatusRecord::from(snapshot)).map_err(|_| CommsError::Encode)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Map a topic beneath `<base>/cmd/` (and its payload) to a command.
///
/// The suffix must match exactly; `cmd/openx` or `cmd/open/now` are
/// unknown commands.  Only the two `set/…` commands read the payload.
pub fn decode_command(base: &str, topic: &str, payload: &[u8]) -> Result<DoorCommand, CommandError> {
    let suffix = topic
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix("/cmd/"))
        .ok_or(CommandError::OutsideNamespace)?;

    match suffix {
        "open" => Ok(DoorCommand::Open),
        "close" => Ok(DoorCommand::Close),
        "stop" => Ok(DoorCommand::Stop),
        "reset" => Ok(DoorCommand::Reset),
        "lamp_on" => Ok(DoorCommand::LampOn),
        "lamp_off" => Ok(DoorCommand::LampOff),
        "status" => Ok(DoorCommand::Status),
        "set/RunTimer" => parse_timeout_ms(payload).map(DoorCommand::SetRunTimer),
        "set/TimerCA" => parse_timeout_ms(payload).map(DoorCommand::SetTimerCA),
        _ => Err(CommandError::UnknownCommand),
    }
}

/// ASCII decimal milliseconds, surrounding whitespace allowed.
fn parse_timeout_ms(payload: &[u8]) -> Result<u32, CommandError> {
    let text = core::str::from_utf8(payload)
        .map_err(|_| CommandError::InvalidPayload)?
        .trim();
    if text.is_empty() {
        return Err(CommandError::MissingPayload);
    }
    let value: i64 = text.parse().map_err(|_| CommandError::InvalidPayload)?;
    config::validate_timeout_ms(value).map_err(|_| CommandError::OutOfRange(value))
}
