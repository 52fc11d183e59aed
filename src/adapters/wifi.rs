//! WiFi station bring-up (ESP-IDF only).
//!
//! Connects once at boot with a bounded number of attempts.  Whatever
//! happens here, the caller keeps running the door loop: the controller
//! needs no network to drive the hardware safely.

use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{debug, info, warn};

use crate::config::NetworkConfig;

const CONNECT_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Start the station and try to join `network.wifi_ssid`.
///
/// Returns the driver even when every attempt failed, so it stays alive
/// and the MQTT client can come up if the AP reappears.
pub fn connect(
    modem: Modem,
    sys_loop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    network: &NetworkConfig,
) -> anyhow::Result<EspWifi<'static>> {
    if network.wifi_ssid.is_empty() {
        return Err(anyhow!("DOOR_WIFI_SSID was empty at build time"));
    }

    let mut esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs))?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sys_loop)?;

    let auth_method = if network.wifi_password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPAWPA2Personal
    };

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: network
            .wifi_ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi ssid too long"))?,
        password: network
            .wifi_password
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("WiFi started, joining `{}`", network.wifi_ssid);

    for attempt in 1..=CONNECT_ATTEMPTS {
        match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
            Ok(()) => {
                info!("WiFi up on attempt {}", attempt);
                break;
            }
            Err(e) => {
                warn!("WiFi attempt {}/{} failed: {:?}", attempt, CONNECT_ATTEMPTS, e);
                if attempt < CONNECT_ATTEMPTS {
                    if let Err(e) = wifi.disconnect() {
                        debug!("WiFi disconnect before retry failed: {:?}", e);
                    }
                    thread::sleep(RETRY_DELAY);
                }
            }
        }
    }

    drop(wifi);
    Ok(esp_wifi)
}
