//! Inbound commands to the door service.
//!
//! Commands are produced by the codec from broker messages (or by the
//! MQTT adapter itself for [`DoorCommand::Announce`]) on the network
//! context, and executed by [`DoorService`](super::service::DoorService)
//! on the tick context.  The two contexts meet only at [`CommandInbox`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Depth of the command inbox.  Commands beyond this between two ticks
/// are dropped by the sender.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

/// Single-consumer queue between the network and tick contexts.
pub type CommandInbox = Channel<CriticalSectionRawMutex, DoorCommand, COMMAND_QUEUE_DEPTH>;

/// Actions the outside world can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    /// `cmd/open` — schedule OPENING.
    Open,
    /// `cmd/close` — schedule CLOSING.
    Close,
    /// `cmd/stop` — schedule STOPPED and cut the motor now.
    Stop,
    /// `cmd/reset` — schedule INITIAL from any state.
    ///
    /// Operator override: it skips the ERROR latch's limit-switch check and
    /// lets INITIAL re-derive the position.  It does not clear a physical
    /// fault.
    Reset,
    LampOn,
    LampOff,
    /// `cmd/status` — publish a record, change nothing.
    Status,
    /// `cmd/set/RunTimer` — movement watchdog in milliseconds (already range-checked).
    SetRunTimer(u32),
    /// `cmd/set/TimerCA` — auto-close dwell in milliseconds (already range-checked).
    SetTimerCA(u32),
    /// Broker session established; publish a `connected` record.
    Announce,
}

impl DoorCommand {
    /// Publish reason recorded after this command runs.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Open => "mqtt_cmd_open",
            Self::Close => "mqtt_cmd_close",
            Self::Stop => "mqtt_cmd_stop",
            Self::Reset => "mqtt_cmd_reset",
            Self::LampOn => "mqtt_cmd_lamp_on",
            Self::LampOff => "mqtt_cmd_lamp_off",
            Self::Status => "mqtt_cmd_status",
            Self::SetRunTimer(_) => "set_RunTimer",
            Self::SetTimerCA(_) => "set_TimerCA",
            Self::Announce => "connected",
        }
    }
}
