//! GPIO adapter — bridges real pins to the domain port traits.
//!
//! Generic over `embedded-hal` 1.0 digital pins, so the same adapter drives
//! ESP-IDF `PinDriver`s on target and plain fakes on the host.  This is the
//! only module that touches the ten door lines.
//!
//! Pin failures never reach the controller: a failed read reports the
//! last good level, a failed write is logged and the tick carries on.

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::app::ports::{ActuatorSink, InputSource};
use crate::drivers::debounce::InputId;
use crate::drivers::motor::{MotorDirection, MotorDriver};
use crate::error::Error;
use crate::fsm::context::InputLevels;

/// Concrete adapter over six input pins and four output pins.
pub struct GpioDoorHardware<IN, OUT> {
    /// Ordered as [`InputId::ALL`].
    inputs: [IN; 6],
    motor: MotorDriver<OUT>,
    lamp: OUT,
    buzzer: OUT,
    last: InputLevels,
}

impl<IN: InputPin, OUT: OutputPin> GpioDoorHardware<IN, OUT> {
    /// Take ownership of the lines and drive every output low.
    ///
    /// `inputs` must be ordered open-limit, close-limit, open-button,
    /// close-button, step-button, fault.
    pub fn new(
        inputs: [IN; 6],
        motor_open: OUT,
        motor_close: OUT,
        mut lamp: OUT,
        mut buzzer: OUT,
    ) -> Result<Self, Error> {
        let motor =
            MotorDriver::new(motor_open, motor_close).map_err(|_| Error::Gpio("motor"))?;
        lamp.set_low().map_err(|_| Error::Gpio("lamp"))?;
        buzzer.set_low().map_err(|_| Error::Gpio("buzzer"))?;

        Ok(Self {
            inputs,
            motor,
            lamp,
            buzzer,
            last: InputLevels::idle(),
        })
    }
}

// ── InputSource implementation ────────────────────────────────

impl<IN: InputPin, OUT: OutputPin> InputSource for GpioDoorHardware<IN, OUT> {
    fn sample(&mut self) -> InputLevels {
        for (pin, id) in self.inputs.iter_mut().zip(InputId::ALL) {
            match pin.is_high() {
                Ok(level) => self.last.set(id, level),
                Err(e) => debug!("read {} failed: {:?}", id.tag(), e),
            }
        }
        self.last
    }
}

// ── ActuatorSink implementation ───────────────────────────────

impl<IN: InputPin, OUT: OutputPin> ActuatorSink for GpioDoorHardware<IN, OUT> {
    fn drive_motor(&mut self, direction: MotorDirection) {
        if let Err(e) = self.motor.drive(direction) {
            warn!("motor {:?} failed: {:?}", direction, e);
        }
    }

    fn set_lamp(&mut self, on: bool) {
        if let Err(e) = self.lamp.set_state(on.into()) {
            warn!("lamp write failed: {:?}", e);
        }
    }

    fn set_buzzer(&mut self, on: bool) {
        if let Err(e) = self.buzzer.set_state(on.into()) {
            warn!("buzzer write failed: {:?}", e);
        }
    }
}
