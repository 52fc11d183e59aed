//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                 | Connects to              |
//! |------------|----------------------------|--------------------------|
//! | `gpio`     | InputSource, ActuatorSink  | embedded-hal digital pins|
//! | `log_sink` | Telemetry                  | Serial log output        |
//! | `mqtt`     | Telemetry, CommandInbox tx | ESP-IDF MQTT client      |
//! | `wifi`     | —                          | ESP-IDF WiFi STA         |

pub mod gpio;
pub mod log_sink;
#[cfg(feature = "espidf")]
pub mod mqtt;
#[cfg(feature = "espidf")]
pub mod wifi;
