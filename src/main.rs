// Air-Sentinel - Firmware Entry Point
//
// Boot sequence:
//   1. Mount SPIFFS and load settings (defaults written on first boot).
//   2. Bring up the OLED, dust probe, indicator lines and buttons.
//   3. Start Wi-Fi in station mode, scan, connect if an SSID is stored.
//   4. Run the 20 Hz control loop forever.
//
// The loop leaves only through the setup portal, which always reboots.

#[cfg(target_os = "espidf")]
use std::{net::TcpListener, thread, time::Duration};

#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    delay::{Ets, FreeRtos},
    gpio::{AnyOutputPin, Output, OutputPin, PinDriver, Pull},
    i2c::{I2cConfig, I2cDriver},
    prelude::*,
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};

#[cfg(target_os = "espidf")]
use airsentinel::{
    config::*,
    drivers::{dust::DustProbe, indicators::IndicatorBank},
    esp::{adc::OneshotAdc, clock::SystemClock, now_ms, oled::Ssd1306, storage, wifi::WifiLink},
    events::Phase,
    monitor::{Devices, Monitor},
    store::{ConfigStore, FsStorage},
    tasks::portal::PortalExit,
};

#[cfg(target_os = "espidf")]
type OutPin = PinDriver<'static, AnyOutputPin, Output>;

/// Every board handle the monitor borrows each tick.
#[cfg(target_os = "espidf")]
struct Board {
    probe: DustProbe<OutPin, OneshotAdc, Ets>,
    indicators: IndicatorBank<OutPin, CATEGORY_COUNT>,
    panel: Ssd1306,
    link: WifiLink,
    clock: SystemClock,
}

#[cfg(target_os = "espidf")]
impl Board {
    fn devices(&mut self) -> Devices<'_> {
        Devices {
            probe: &mut self.probe,
            indicators: &mut self.indicators,
            panel: &mut self.panel,
            network: &mut self.link,
            clock: &self.clock,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Air-Sentinel firmware starting");

    // ---- Persistence ------------------------------------------------------
    if let Err(e) = storage::mount_spiffs() {
        log::error!("SPIFFS mount failed, settings will not persist: {:#}", e);
    }
    let store = ConfigStore::load(FsStorage::new(STORAGE_ROOT));

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(peripherals.i2c0, pins.gpio6, pins.gpio7, &i2c_config)?;
    let mut panel = Ssd1306::new(i2c);
    if let Err(e) = panel.init() {
        log::error!("OLED init failed: {:#}", e);
    }

    let mut button = PinDriver::input(pins.gpio3)?;
    button.set_pull(Pull::Up)?;
    let mut recovery = PinDriver::input(pins.gpio9)?;
    recovery.set_pull(Pull::Up)?;

    let dust_led = PinDriver::output(pins.gpio10.downgrade_output())?;
    let dust_adc = OneshotAdc::new(esp_idf_sys::adc_channel_t_ADC_CHANNEL_2)?;
    let probe = DustProbe::new(dust_led, dust_adc, Ets);

    let indicators = IndicatorBank::new([
        PinDriver::output(pins.gpio0.downgrade_output())?,
        PinDriver::output(pins.gpio1.downgrade_output())?,
        PinDriver::output(pins.gpio4.downgrade_output())?,
        PinDriver::output(pins.gpio5.downgrade_output())?,
        PinDriver::output(pins.gpio20.downgrade_output())?,
        PinDriver::output(pins.gpio21.downgrade_output())?,
    ]);

    // ---- Network ----------------------------------------------------------
    let link = WifiLink::new(peripherals.modem, sysloop, nvs)?;

    let mut board = Board {
        probe,
        indicators,
        panel,
        link,
        clock: SystemClock,
    };
    let mut monitor = Monitor::new(store, now_ms());
    monitor.scan_networks(&mut board.link);

    let (ssid, password) = {
        let s = monitor.settings();
        (s.ssid.clone(), s.password.clone())
    };
    if !ssid.is_empty() {
        if let Err(e) = board.link.connect(&ssid, &password) {
            log::warn!("Wi-Fi connect failed, running offline: {:#}", e);
        }
    }

    log::info!("Boot complete, entering control loop");

    // ---- Control loop -----------------------------------------------------
    let tick = Duration::from_millis(TICK_INTERVAL_MS);
    loop {
        let pressed = button.is_low();
        match monitor.tick(now_ms(), pressed, &mut board.devices()) {
            Phase::Normal => {}
            Phase::Calibrating => {
                monitor.calibrate(&mut board.devices(), &mut FreeRtos, &now_ms);
            }
            Phase::PortalActive => {
                if let Err(e) = board.link.start_access_point() {
                    log::error!("Access point failed: {:#}", e);
                    restart();
                }
                let listener = match TcpListener::bind(("0.0.0.0", PORTAL_PORT)) {
                    Ok(listener) => listener,
                    Err(e) => {
                        log::error!("Portal bind failed: {}", e);
                        restart();
                    }
                };
                let exit = monitor.run_portal(&listener, &mut board.devices(), &mut || {
                    recovery.is_low()
                });
                if exit == PortalExit::Saved {
                    thread::sleep(Duration::from_secs(1));
                }
                restart();
            }
        }
        thread::sleep(tick);
    }
}

#[cfg(target_os = "espidf")]
fn restart() -> ! {
    log::info!("Rebooting");
    unsafe {
        esp_idf_sys::esp_restart();
    }
    #[allow(unreachable_code)]
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("airsentinel: firmware binary, build for the ESP-IDF target (riscv32imc-esp-espidf)");
}
