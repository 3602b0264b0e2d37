// Air-Sentinel - Wi-Fi Link
//
// Station mode for normal operation (scan, optional connect, SNTP, HTTPS)
// and access-point mode for the setup portal. Switching to the access point
// is one-way: the portal always ends in a reboot.

use anyhow::{anyhow, bail, Result};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};
use log::info;

use crate::config::*;
use crate::drivers::{Network, ScanEntry};
use crate::esp::http_client;

pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
    sntp: Option<EspSntp<'static>>,
}

impl WifiLink {
    /// Bring the radio up in station mode without associating.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
        wifi.start()?;
        info!("Wi-Fi started in station mode");
        Ok(Self { wifi, sntp: None })
    }

    /// One association attempt. Failure leaves the device offline; every
    /// network task then skips until the next reboot.
    pub fn connect(&mut self, ssid: &str, password: &str) -> Result<()> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: ssid
                    .try_into()
                    .map_err(|_| anyhow!("SSID longer than 32 bytes"))?,
                password: password
                    .try_into()
                    .map_err(|_| anyhow!("password longer than 64 bytes"))?,
                auth_method,
                ..Default::default()
            }))?;

        info!("Wi-Fi connecting to '{}'...", ssid);
        self.wifi.connect()?;
        self.wifi.wait_netif_up()?;
        info!("Wi-Fi connected, IP {:?}", self.ip_address());
        Ok(())
    }

    /// Reconfigure as the setup access point (192.168.4.1).
    pub fn start_access_point(&mut self) -> Result<()> {
        let _ = self.wifi.disconnect();
        let _ = self.wifi.stop();
        self.sntp = None;

        self.wifi
            .set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
                ssid: AP_SSID
                    .try_into()
                    .map_err(|_| anyhow!("AP SSID too long"))?,
                password: AP_PASSWORD
                    .try_into()
                    .map_err(|_| anyhow!("AP password too long"))?,
                auth_method: AuthMethod::WPA2Personal,
                channel: 1,
                ..Default::default()
            }))?;
        self.wifi.start()?;
        self.wifi.wait_netif_up()?;
        info!("Access point '{}' up (password '{}')", AP_SSID, AP_PASSWORD);
        Ok(())
    }
}

impl Network for WifiLink {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn rssi(&self) -> Option<i8> {
        if !self.is_connected() {
            return None;
        }
        let mut ap_info: esp_idf_sys::wifi_ap_record_t = unsafe { core::mem::zeroed() };
        let rc = unsafe { esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (rc == esp_idf_sys::ESP_OK).then_some(ap_info.rssi)
    }

    fn ip_address(&self) -> Option<String> {
        if !self.is_connected() {
            return None;
        }
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip.to_string())
    }

    fn scan(&mut self) -> Result<Vec<ScanEntry>> {
        let aps = self.wifi.scan()?;
        Ok(aps
            .iter()
            .map(|ap| ScanEntry {
                ssid: ap.ssid.to_string(),
                rssi: ap.signal_strength,
            })
            .collect())
    }

    /// Start SNTP on first use and report whether it has synced. Never waits:
    /// a pending sync is an error so the caller retries on a later tick.
    fn sync_time(&mut self) -> Result<()> {
        if self.sntp.is_none() {
            self.sntp = Some(EspSntp::new_default()?);
            info!("SNTP started");
        }
        match self.sntp.as_ref().map(|sntp| sntp.get_sync_status()) {
            Some(SyncStatus::Completed) => Ok(()),
            _ => bail!("SNTP sync pending"),
        }
    }

    fn http_get(&mut self, url: &str) -> Result<String> {
        http_client::https_get(url)
    }
}
