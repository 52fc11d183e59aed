//! Controller configuration parameters
//!
//! All tunable parameters for the door controller.  Nothing here is
//! persisted across power cycles; the two timeouts can be changed at
//! runtime through the `set/RunTimer` and `set/TimerCA` remote commands.
//!
//! Timeouts are stored in ticks.  The 18 s movement watchdog and 10 s
//! auto-close defaults are policy values, not derived from the mechanism.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Remote timeout values must fall strictly inside this range (milliseconds).
pub const TIMEOUT_MS_MIN_EXCLUSIVE: i64 = 0;
pub const TIMEOUT_MS_MAX_EXCLUSIVE: i64 = 60_000;

/// When the per-state status record is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishPolicy {
    /// Every state-function invocation, i.e. once per tick.
    EveryTick,
    /// Only on ticks where a new state was entered.
    OnTransition,
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorConfig {
    // --- Timing ---
    /// Tick period (milliseconds)
    pub tick_ms: u32,
    /// Heartbeat publish interval (milliseconds)
    pub heartbeat_ms: u32,

    // --- Watchdogs ---
    /// Ticks the motor may run before the movement watchdog trips
    pub movement_timeout_ticks: u32,
    /// Ticks the door stays open before closing on its own
    pub auto_close_ticks: u32,

    // --- Inputs ---
    /// Consecutive identical samples required to accept a level change
    pub debounce_threshold: u8,

    // --- Telemetry ---
    pub publish_policy: PublishPolicy,
    /// Base topic; status goes to `<base>/state`, commands arrive on `<base>/cmd/#`
    pub base_topic: String,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_ms: 100,
            heartbeat_ms: 1000,

            // Watchdogs
            movement_timeout_ticks: 180, // ~18 s at 100 ms
            auto_close_ticks: 100,       // ~10 s at 100 ms

            // Inputs
            debounce_threshold: 3,

            // Telemetry
            publish_policy: PublishPolicy::EveryTick,
            base_topic: String::from("esp32/door"),
        }
    }
}

impl DoorConfig {
    /// Reject configurations the controller cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_ms must be > 0"));
        }
        if self.heartbeat_ms < self.tick_ms {
            return Err(ConfigError::ValidationFailed(
                "heartbeat_ms must be >= tick_ms",
            ));
        }
        if self.movement_timeout_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "movement_timeout_ticks must be > 0",
            ));
        }
        if self.auto_close_ticks == 0 {
            return Err(ConfigError::ValidationFailed("auto_close_ticks must be > 0"));
        }
        if self.debounce_threshold == 0 {
            return Err(ConfigError::ValidationFailed(
                "debounce_threshold must be > 0",
            ));
        }
        if self.base_topic.is_empty() || self.base_topic.ends_with('/') {
            return Err(ConfigError::ValidationFailed(
                "base_topic must be non-empty without a trailing '/'",
            ));
        }
        Ok(())
    }

    /// Convert a validated millisecond timeout to ticks (at least one).
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        (ms / self.tick_ms).max(1)
    }

    /// Apply a `set/RunTimer` value.  Returns the new tick count.
    pub fn set_movement_timeout_ms(&mut self, ms: i64) -> Result<u32, ConfigError> {
        let ms = validate_timeout_ms(ms)?;
        self.movement_timeout_ticks = self.ms_to_ticks(ms);
        Ok(self.movement_timeout_ticks)
    }

    /// Apply a `set/TimerCA` value.  Returns the new tick count.
    pub fn set_auto_close_ms(&mut self, ms: i64) -> Result<u32, ConfigError> {
        let ms = validate_timeout_ms(ms)?;
        self.auto_close_ticks = self.ms_to_ticks(ms);
        Ok(self.auto_close_ticks)
    }
}

/// Accept only `0 < ms < 60000`.
pub fn validate_timeout_ms(ms: i64) -> Result<u32, ConfigError> {
    if ms > TIMEOUT_MS_MIN_EXCLUSIVE && ms < TIMEOUT_MS_MAX_EXCLUSIVE {
        Ok(ms as u32)
    } else {
        Err(ConfigError::ValidationFailed(
            "timeout must be within 0 < ms < 60000",
        ))
    }
}

/// Broker and station settings used only by the firmware binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub broker_uri: String,
    pub client_id: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::from(option_env!("DOOR_WIFI_SSID").unwrap_or("")),
            wifi_password: String::from(option_env!("DOOR_WIFI_PASS").unwrap_or("")),
            broker_uri: String::from("mqtt://broker.hivemq.com"),
            client_id: String::from("esp32_door_fsm_01"),
        }
    }
}
