//! Counter-based input debouncing for the six door inputs.
//!
//! ## Algorithm
//!
//! Each [`DebouncedSignal`] remembers a *candidate* level and how many
//! consecutive samples have matched it.  A sample that differs from the
//! candidate becomes the new candidate and restarts the count at zero; a
//! matching sample counts up (saturating at the threshold).  The stable
//! level is committed when the count reaches the threshold.
//!
//! A flip is therefore observed `threshold` ticks after the first sample
//! of the new level (300 ms with the default threshold of 3 at 100 ms).
//! Any bounce that does not hold for that long never reaches the FSM.
//!
//! ```text
//!  raw      1 1 0 1 0 0 0 0 0 0
//!  count    3 3 0 0 0 1 2 3 3 3
//!  stable   1 1 1 1 1 1 1 0 0 0
//! ```

use crate::fsm::context::InputLevels;

/// Logical identity of each monitored input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputId {
    OpenLimit,
    CloseLimit,
    OpenButton,
    CloseButton,
    StepButton,
    Fault,
}

impl InputId {
    pub const ALL: [InputId; 6] = [
        InputId::OpenLimit,
        InputId::CloseLimit,
        InputId::OpenButton,
        InputId::CloseButton,
        InputId::StepButton,
        InputId::Fault,
    ];

    /// Short tag used in the status record.
    pub fn tag(self) -> &'static str {
        match self {
            Self::OpenLimit => "lsa",
            Self::CloseLimit => "lsc",
            Self::OpenButton => "keya",
            Self::CloseButton => "keyc",
            Self::StepButton => "pp",
            Self::Fault => "ftc",
        }
    }
}

/// One debounced digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncedSignal {
    id: InputId,
    threshold: u8,
    level: bool,
    candidate: bool,
    count: u8,
}

impl DebouncedSignal {
    /// Seed the signal with a level read straight from the pin.
    pub fn new(id: InputId, threshold: u8, initial: bool) -> Self {
        Self {
            id,
            threshold,
            level: initial,
            candidate: initial,
            count: 0,
        }
    }

    /// Feed one raw sample.
    pub fn update(&mut self, raw: bool) {
        if raw == self.candidate {
            if self.count < self.threshold {
                self.count += 1;
            }
            if self.count == self.threshold {
                self.level = self.candidate;
            }
        } else {
            self.count = 0;
            self.candidate = raw;
        }
    }

    /// Current stable level (`true` = pin reads high).
    pub fn level(&self) -> bool {
        self.level
    }

    pub fn id(&self) -> InputId {
        self.id
    }
}

/// The six door inputs, debounced together once per tick.
#[derive(Debug, Clone)]
pub struct InputBank {
    signals: [DebouncedSignal; 6],
}

impl InputBank {
    /// Build the bank from a direct hardware sample (bypasses debounce).
    pub fn new(threshold: u8, initial: InputLevels) -> Self {
        let signals =
            InputId::ALL.map(|id| DebouncedSignal::new(id, threshold, initial.get(id)));
        Self { signals }
    }

    /// Advance every signal with this tick's raw sample.
    pub fn update(&mut self, raw: InputLevels) {
        for signal in &mut self.signals {
            signal.update(raw.get(signal.id()));
        }
    }

    /// Stable levels of all six inputs.
    pub fn levels(&self) -> InputLevels {
        let mut levels = InputLevels::default();
        for signal in &self.signals {
            levels.set(signal.id(), signal.level());
        }
        levels
    }
}
