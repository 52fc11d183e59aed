//! Fixed-rate tick pacing.
//!
//! The scheduler owns no domain logic; it only decides *when* the door
//! service ticks.  Deadlines advance by exactly one period per tick, so
//! the average rate does not drift with tick duration.  If the loop falls
//! behind by whole periods those periods are skipped, not replayed: the
//! controller counts time in ticks and a burst of catch-up ticks would
//! debounce inputs that were only sampled once.
//!
//! ```text
//!   ┌──────────┐   wait   ┌─────────────────┐   tick   ┌─────────────┐
//!   │ deadline │ ───────▶ │ drain commands  │ ───────▶ │ DoorService │
//!   └──────────┘          └─────────────────┘          └─────────────┘
//!        ▲                                                    │
//!        └──────────────── deadline += period ◀───────────────┘
//! ```

use std::time::{Duration, Instant};

use log::warn;

use crate::app::commands::CommandInbox;
use crate::app::ports::{ActuatorSink, InputSource, Telemetry};
use crate::app::service::DoorService;

/// Outcome of [`TickScheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Deadline not reached; sleep this long.
    Wait(Duration),
    /// Tick now.  `missed` whole periods were skipped.
    Fire { missed: u32 },
}

pub struct TickScheduler {
    period: Duration,
    next: Instant,
    overruns: u64,
}

impl TickScheduler {
    /// First tick is due one period after `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
            overruns: 0,
        }
    }

    /// Decide what to do at `now`.  Advances the deadline on `Fire`.
    pub fn poll(&mut self, now: Instant) -> TickDecision {
        if now < self.next {
            return TickDecision::Wait(self.next - now);
        }

        let late = now - self.next;
        let period_ns = self.period.as_nanos().max(1);
        let missed = (late.as_nanos() / period_ns) as u32;

        self.next += self.period * (missed + 1);
        if missed > 0 {
            self.overruns += u64::from(missed);
        }
        TickDecision::Fire { missed }
    }

    /// Block until the next tick is due.
    pub fn wait_next(&mut self) {
        loop {
            match self.poll(Instant::now()) {
                TickDecision::Wait(d) => std::thread::sleep(d),
                TickDecision::Fire { missed } => {
                    if missed > 0 {
                        warn!("Tick overrun: skipped {} period(s)", missed);
                    }
                    return;
                }
            }
        }
    }

    /// Total periods skipped since start.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Firmware main loop: wait, apply queued commands, tick.  Never returns.
    pub fn run<H, T>(
        &mut self,
        service: &mut DoorService,
        hw: &mut H,
        telemetry: &mut T,
        inbox: &CommandInbox,
    ) -> !
    where
        H: InputSource + ActuatorSink,
        T: Telemetry,
    {
        loop {
            self.wait_next();
            service.drain_commands(inbox, hw, telemetry);
            service.tick(hw, telemetry);
        }
    }
}
