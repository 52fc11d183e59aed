//! Door controller firmware — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioDoorHardware        MqttTelemetry / LogTelemetry          │
//! │  (InputSource+Actuator)  (Telemetry, CommandInbox producer)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              DoorService (pure logic)                  │    │
//! │  │  Debounce · FSM · Lamp/Buzzer · Telemetry triggers     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  TickScheduler (100 ms fixed rate, drains CommandInbox)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::{AnyIOPin, Input, Output, PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use doorctl::adapters::gpio::GpioDoorHardware;
use doorctl::adapters::log_sink::LogTelemetry;
use doorctl::adapters::mqtt::MqttTelemetry;
use doorctl::adapters::wifi;
use doorctl::app::commands::CommandInbox;
use doorctl::app::events::StatusSnapshot;
use doorctl::app::ports::{InputSource, Telemetry};
use doorctl::app::service::DoorService;
use doorctl::codec::Topics;
use doorctl::config::{DoorConfig, NetworkConfig};
use doorctl::error::CommsError;
use doorctl::pins;
use doorctl::scheduler::TickScheduler;

/// Commands from the MQTT receiver thread to the tick loop.
static INBOX: CommandInbox = CommandInbox::new();

type InPin = PinDriver<'static, AnyIOPin, Input>;
type OutPin = PinDriver<'static, AnyIOPin, Output>;

// ── Telemetry selection ───────────────────────────────────────

/// Broker when the client could be created, serial log otherwise.
enum Uplink {
    Mqtt(MqttTelemetry),
    Log(LogTelemetry),
}

impl Telemetry for Uplink {
    fn publish(&mut self, status: &StatusSnapshot) -> Result<(), CommsError> {
        match self {
            Self::Mqtt(m) => m.publish(status),
            Self::Log(l) => l.publish(status),
        }
    }
}

// ── Pins ──────────────────────────────────────────────────────

fn input(gpio: i32) -> Result<InPin> {
    // SAFETY: every number comes from `pins`, which assigns each GPIO once,
    // and `Peripherals::take` has already claimed the pin singletons.
    let mut pin = PinDriver::input(unsafe { AnyIOPin::new(gpio) })?;
    pin.set_pull(Pull::Up)?;
    Ok(pin)
}

fn output(gpio: i32) -> Result<OutPin> {
    // SAFETY: see `input`.
    Ok(PinDriver::output(unsafe { AnyIOPin::new(gpio) })?)
}

fn build_hardware() -> Result<GpioDoorHardware<InPin, OutPin>> {
    let inputs = [
        input(pins::OPEN_LIMIT_GPIO)?,
        input(pins::CLOSE_LIMIT_GPIO)?,
        input(pins::OPEN_BUTTON_GPIO)?,
        input(pins::CLOSE_BUTTON_GPIO)?,
        input(pins::STEP_BUTTON_GPIO)?,
        input(pins::FAULT_GPIO)?,
    ];
    let hw = GpioDoorHardware::new(
        inputs,
        output(pins::MOTOR_OPEN_GPIO)?,
        output(pins::MOTOR_CLOSE_GPIO)?,
        output(pins::LAMP_GPIO)?,
        output(pins::BUZZER_GPIO)?,
    )?;
    Ok(hw)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  doorctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Configuration ──────────────────────────────────────
    let config = DoorConfig::default();
    let network = NetworkConfig::default();
    let topics = Topics::new(&config.base_topic)?;
    let tick = Duration::from_millis(u64::from(config.tick_ms));

    // ── 3. Hardware, outputs low before anything else ─────────
    let mut hw = build_hardware()?;
    let initial = hw.sample();
    info!(
        "Inputs at boot: lsa={} lsc={} ftc={}",
        initial.open_limit as u8, initial.close_limit as u8, initial.fault as u8
    );
    let mut service = DoorService::new(config, initial)?;

    // ── 4. Network (best effort) ──────────────────────────────
    let _wifi = match wifi::connect(peripherals.modem, sys_loop, nvs, &network) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("WiFi unavailable ({:#}); running offline", e);
            None
        }
    };

    let mut uplink = match MqttTelemetry::start(&network, topics, &INBOX) {
        Ok(m) => Uplink::Mqtt(m),
        Err(e) => {
            warn!("MQTT client failed ({:#}); status goes to the log only", e);
            Uplink::Log(LogTelemetry::new())
        }
    };

    // ── 5. Tick loop ──────────────────────────────────────────
    info!("Entering tick loop ({} ms)", tick.as_millis());
    let mut scheduler = TickScheduler::new(tick, Instant::now());
    scheduler.run(&mut service, &mut hw, &mut uplink, &INBOX)
}
