//! Log-based telemetry adapter.
//!
//! Implements [`Telemetry`] by writing each status record to the logger
//! (UART / USB-CDC in production).  Used when no broker is reachable and
//! on the bench.

use log::info;

use crate::app::events::StatusSnapshot;
use crate::app::ports::Telemetry;
use crate::codec;
use crate::error::CommsError;

/// Adapter that logs every status record to the serial console.
#[derive(Debug, Default)]
pub struct LogTelemetry {
    published: u64,
}

impl LogTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}

impl Telemetry for LogTelemetry {
    fn publish(&mut self, status: &StatusSnapshot) -> Result<(), CommsError> {
        let json = codec::encode_status(status)?;
        info!("STATUS | {}", json);
        self.published += 1;
        Ok(())
    }
}
