//! Bidirectional door motor driver (two-input H-bridge).
//!
//! `IN1` drives the leaf towards open, `IN2` towards closed.  Both high
//! shorts the bridge, so the two lines are only ever written together
//! through [`MotorDriver::drive`], which deasserts before it asserts.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  Which direction is safe is decided by
//! the state machine; the driver only guarantees line exclusivity.

use embedded_hal::digital::OutputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorDirection {
    #[default]
    Stop,
    Open,
    Close,
}

/// Bridge line levels for a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorLines {
    pub open: bool,
    pub close: bool,
}

impl MotorDirection {
    pub fn lines(self) -> MotorLines {
        match self {
            Self::Stop => MotorLines {
                open: false,
                close: false,
            },
            Self::Open => MotorLines {
                open: true,
                close: false,
            },
            Self::Close => MotorLines {
                open: false,
                close: true,
            },
        }
    }
}

/// Owns both bridge inputs.
pub struct MotorDriver<P> {
    open: P,
    close: P,
    direction: MotorDirection,
}

impl<P: OutputPin> MotorDriver<P> {
    /// Takes both pins and forces the bridge off.
    pub fn new(open: P, close: P) -> Result<Self, P::Error> {
        let mut driver = Self {
            open,
            close,
            direction: MotorDirection::Stop,
        };
        driver.open.set_low()?;
        driver.close.set_low()?;
        Ok(driver)
    }

    /// Apply `direction`.  The line being released is driven low first; if
    /// that write fails the other line is left untouched.
    pub fn drive(&mut self, direction: MotorDirection) -> Result<(), P::Error> {
        let lines = direction.lines();
        // Release before engage.
        if !lines.open {
            self.open.set_low()?;
        }
        if !lines.close {
            self.close.set_low()?;
        }
        if lines.open {
            self.open.set_high()?;
        }
        if lines.close {
            self.close.set_high()?;
        }
        self.direction = direction;
        Ok(())
    }

    /// Last direction successfully applied.
    pub fn direction(&self) -> MotorDirection {
        self.direction
    }
}
