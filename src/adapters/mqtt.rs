//! MQTT adapter (ESP-IDF only).
//!
//! Implements [`Telemetry`] on top of `EspMqttClient` and turns inbound
//! command messages into [`DoorCommand`]s on the [`CommandInbox`].
//!
//! ```text
//!  broker ──▶ mqtt-rx thread ──decode──▶ CommandInbox ──▶ tick loop
//!  tick loop ──▶ MqttTelemetry::publish ──enqueue (QoS 1)──▶ broker
//! ```
//!
//! The receiver thread never touches controller state.  Publishing only
//! enqueues into the client's outbox, so a dead link costs the tick
//! nothing beyond the failed enqueue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
#[cfg(esp_idf_mqtt_protocol_5)]
use esp_idf_svc::mqtt::client::MqttProtocolVersion;
use log::{debug, info, warn};

use crate::app::commands::{CommandInbox, DoorCommand};
use crate::app::events::StatusSnapshot;
use crate::app::ports::Telemetry;
use crate::codec::{self, Topics};
use crate::config::NetworkConfig;
use crate::error::CommsError;

const RX_STACK_SIZE: usize = 8 * 1024;
const RX_ERROR_BACKOFF: Duration = Duration::from_secs(2);

type SharedClient = Arc<Mutex<EspMqttClient<'static>>>;

pub struct MqttTelemetry {
    client: SharedClient,
    connected: Arc<AtomicBool>,
    topics: Topics,
}

impl MqttTelemetry {
    /// Create the client and start the receiver thread.  The broker
    /// session itself is established (and re-established) by ESP-IDF.
    pub fn start(
        network: &NetworkConfig,
        topics: Topics,
        inbox: &'static CommandInbox,
    ) -> anyhow::Result<Self> {
        let conf = MqttClientConfiguration {
            client_id: Some(network.client_id.as_str()),
            // MQTT 5 needs CONFIG_MQTT_PROTOCOL_5 (sdkconfig.defaults).
            #[cfg(esp_idf_mqtt_protocol_5)]
            protocol_version: Some(MqttProtocolVersion::V5),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(network.broker_uri.as_str(), &conf)?;
        let client = Arc::new(Mutex::new(client));
        let connected = Arc::new(AtomicBool::new(false));

        spawn_receiver(conn, client.clone(), connected.clone(), topics.clone(), inbox)?;
        info!("MQTT client started for {}", network.broker_uri);

        Ok(Self {
            client,
            connected,
            topics,
        })
    }
}

impl Telemetry for MqttTelemetry {
    fn publish(&mut self, status: &StatusSnapshot) -> Result<(), CommsError> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(CommsError::NotConnected);
        }
        let payload = codec::encode_status(status)?;
        let mut client = self.client.lock().map_err(|_| CommsError::PublishFailed)?;
        client
            .enqueue(
                self.topics.state(),
                QoS::AtLeastOnce,
                false,
                payload.as_bytes(),
            )
            .map_err(|_| CommsError::PublishFailed)?;
        Ok(())
    }
}

// ── Receiver thread ───────────────────────────────────────────

/// What the receiver does once the event has been released back to ESP-IDF.
enum RxAction {
    Session,
    Lost,
    Command(DoorCommand),
    Nothing,
}

fn spawn_receiver(
    mut conn: EspMqttConnection,
    client: SharedClient,
    connected: Arc<AtomicBool>,
    topics: Topics,
    inbox: &'static CommandInbox,
) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("mqtt-rx".into())
        .stack_size(RX_STACK_SIZE)
        .spawn(move || {
            loop {
                // The event borrows the connection; classify it and let it
                // drop before calling back into the client.
                let action = match conn.next() {
                    Ok(event) => classify(&topics, event.payload()),
                    Err(e) => {
                        warn!("MQTT receive error: {:?}", e);
                        connected.store(false, Ordering::Relaxed);
                        thread::sleep(RX_ERROR_BACKOFF);
                        RxAction::Nothing
                    }
                };

                match action {
                    RxAction::Session => {
                        connected.store(true, Ordering::Relaxed);
                        info!("MQTT connected");
                        subscribe(&client, &topics);
                        forward(inbox, DoorCommand::Announce);
                    }
                    RxAction::Lost => {
                        connected.store(false, Ordering::Relaxed);
                        warn!("MQTT disconnected");
                    }
                    RxAction::Command(cmd) => forward(inbox, cmd),
                    RxAction::Nothing => {}
                }
            }
        })?;
    Ok(())
}

fn classify(topics: &Topics, payload: EventPayload<'_, esp_idf_svc::sys::EspError>) -> RxAction {
    match payload {
        EventPayload::Connected(_) => RxAction::Session,
        EventPayload::Disconnected => RxAction::Lost,
        EventPayload::Received {
            topic: Some(topic),
            data,
            details: Details::Complete,
            ..
        } => match topics.decode(topic, data) {
            Ok(cmd) => RxAction::Command(cmd),
            Err(e) => {
                debug!("ignoring {}: {}", topic, e);
                RxAction::Nothing
            }
        },
        _ => RxAction::Nothing,
    }
}

fn subscribe(client: &SharedClient, topics: &Topics) {
    let Ok(mut client) = client.lock() else {
        warn!("MQTT client lock poisoned; not subscribing");
        return;
    };
    match client.subscribe(topics.command_filter(), QoS::AtLeastOnce) {
        Ok(_) => info!("Subscribed to {}", topics.command_filter()),
        Err(e) => warn!("Subscribe to {} failed: {:?}", topics.command_filter(), e),
    }
}

fn forward(inbox: &CommandInbox, cmd: DoorCommand) {
    if inbox.try_send(cmd).is_err() {
        warn!("Command inbox full, dropping {:?}", cmd);
    }
}
