// Air-Sentinel - Monitor (single owner of all runtime state)
//
// One `tick` per control-loop iteration:
//
//   1. button  -> gesture (holds hand control back to the caller as a Phase)
//   2. probe   -> rolling window -> smoothed concentration
//   3. background tasks (time sync, weather, telemetry gate)
//   4. category -> indicator lines
//   5. telemetry record on stdout when due
//   6. auto-cycle, then compose and present the frame
//
// Calibration and the setup portal are blocking phases. `tick` only reports
// that one was requested; the caller then runs `calibrate` or `run_portal`
// with the same devices.

use std::net::TcpListener;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::aqi;
use crate::clock::WallClock;
use crate::config::*;
use crate::drivers::{Frame, Indicators, Network, Panel, Probe, ScanEntry};
use crate::events::{GestureEvent, Message, Phase, WeatherReport};
use crate::input::GestureMachine;
use crate::store::{ConfigStore, Settings, SettingsUpdate, Storage};
use crate::tasks::background::{Background, Telemetry};
use crate::tasks::calibration::{self, CalibrationRig};
use crate::tasks::portal::{self, PortalExit, PortalRig};
use crate::tasks::sensor::{self, DustWindow};
use crate::tasks::ui::{self, Screen, View, ViewScheduler};

/// Board handles borrowed for one tick.
pub struct Devices<'a> {
    pub probe: &'a mut dyn Probe,
    pub indicators: &'a mut dyn Indicators,
    pub panel: &'a mut dyn Panel,
    pub network: &'a mut dyn Network,
    pub clock: &'a dyn WallClock,
}

pub struct Monitor<S: Storage> {
    store: ConfigStore<S>,
    window: DustWindow,
    dust: f32,
    /// Starts from the stored flag. A short tap clears it in RAM only.
    auto_cycle: bool,
    gestures: GestureMachine,
    views: ViewScheduler,
    background: Background,
    weather: WeatherReport,
    message: Option<Message>,
    networks: Vec<ScanEntry>,
    last_telemetry: Option<Telemetry>,
    frame: Frame,
}

impl<S: Storage> Monitor<S> {
    pub fn new(store: ConfigStore<S>, now: u32) -> Self {
        let auto_cycle = store.settings().auto_cycle;
        Self {
            store,
            window: DustWindow::new(),
            dust: 0.0,
            auto_cycle,
            gestures: GestureMachine::new(),
            views: ViewScheduler::new(now),
            background: Background::new(),
            weather: WeatherReport::default(),
            message: None,
            networks: Vec::new(),
            last_telemetry: None,
            frame: Frame::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn dust(&self) -> f32 {
        self.dust
    }

    pub fn auto_cycle(&self) -> bool {
        self.auto_cycle
    }

    pub fn view(&self) -> View {
        self.views.current()
    }

    pub fn weather(&self) -> &WeatherReport {
        &self.weather
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn networks(&self) -> &[ScanEntry] {
        &self.networks
    }

    pub fn last_telemetry(&self) -> Option<&Telemetry> {
        self.last_telemetry.as_ref()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Refresh the nearby-networks list, strongest first. A failed scan
    /// keeps the previous list.
    pub fn scan_networks(&mut self, network: &mut dyn Network) {
        match network.scan() {
            Ok(mut found) => {
                found.sort_by(|a, b| b.rssi.cmp(&a.rssi));
                info!("Wi-Fi scan: {} networks", found.len());
                self.networks = found;
            }
            Err(e) => warn!("Wi-Fi scan failed: {:#}", e),
        }
    }

    pub fn tick(&mut self, now: u32, pressed: bool, dev: &mut Devices<'_>) -> Phase {
        // 1. Gestures
        match self.gestures.update(pressed, now) {
            GestureEvent::PortalHold => {
                info!("Portal hold released");
                return Phase::PortalActive;
            }
            GestureEvent::CalibrationHold => {
                info!("Calibration hold released");
                return Phase::Calibrating;
            }
            GestureEvent::DoubleTap => self.toggle_auto_cycle(now, dev.clock),
            GestureEvent::ShortTap => {
                self.auto_cycle = false;
                self.views.manual_advance(now);
                info!("View -> {:?}", self.views.current());
            }
            GestureEvent::None => {}
        }

        // 2. Sample
        self.dust = sensor::sample(dev.probe, &mut self.window, self.store.settings().offset);

        // 3. Background work
        let telemetry_due = self.background.run(
            now,
            dev.network,
            self.store.settings(),
            &mut self.weather,
        );

        // 4. Indicators
        dev.indicators
            .show_level(Some(aqi::classify(self.dust).level()));

        // 5. Telemetry
        if telemetry_due {
            let record = Telemetry::new(
                dev.clock.local_time(),
                self.dust,
                self.store.settings().offset,
                &self.weather,
                dev.network.rssi(),
                self.auto_cycle,
            );
            match record.to_json() {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Telemetry encode failed: {}", e),
            }
            self.last_telemetry = Some(record);
        }

        // 6. Views
        if self.auto_cycle && self.views.auto_advance(now) {
            info!("Auto view -> {:?}", self.views.current());
        }
        self.render(now, dev);

        Phase::Normal
    }

    /// Blocking calibration. `uptime_ms` is read once it finishes to stamp
    /// the confirmation message.
    pub fn calibrate(
        &mut self,
        dev: &mut Devices<'_>,
        delay: &mut dyn DelayNs,
        uptime_ms: &dyn Fn() -> u32,
    ) -> f32 {
        let stamp = dev.clock.local_time();
        let offset = calibration::calibrate(
            CalibrationRig {
                probe: &mut *dev.probe,
                indicators: &mut *dev.indicators,
                panel: &mut *dev.panel,
                delay,
            },
            &mut self.frame,
            &mut self.store,
            stamp,
        );
        self.message = Some(Message::new("CAL & LOGGED!", uptime_ms(), CAL_MESSAGE_MS));
        offset
    }

    /// Blocking setup portal on an already-bound listener. The caller brings
    /// the access point up first and reboots afterwards.
    pub fn run_portal(
        &mut self,
        listener: &TcpListener,
        dev: &mut Devices<'_>,
        recovery_pressed: &mut dyn FnMut() -> bool,
    ) -> PortalExit {
        dev.indicators.show_level(None);
        portal::serve(
            listener,
            &mut self.store,
            &mut self.frame,
            PortalRig {
                panel: &mut *dev.panel,
                clock: dev.clock,
                recovery_pressed,
            },
        )
    }

    fn toggle_auto_cycle(&mut self, now: u32, clock: &dyn WallClock) {
        self.auto_cycle = !self.auto_cycle;
        let update = SettingsUpdate {
            auto_cycle: Some(self.auto_cycle),
            ..Default::default()
        };
        if let Err(e) = self.store.update(update, clock.local_time()) {
            warn!("Auto-cycle flag not persisted: {:#}", e);
        }
        let text = if self.auto_cycle { "AUTO ON" } else { "AUTO OFF" };
        info!("{}", text);
        self.message = Some(Message::new(text, now, AUTO_MESSAGE_MS));
    }

    fn render(&mut self, now: u32, dev: &mut Devices<'_>) {
        if self.message.as_ref().is_some_and(|m| !m.is_active(now)) {
            self.message = None;
        }

        let screen = Screen {
            now,
            time: dev.clock.local_time(),
            dust: self.dust,
            weather: &self.weather,
            rssi: dev.network.rssi(),
            ip: dev.network.ip_address(),
            networks: &self.networks,
        };
        ui::compose(
            &mut self.frame,
            self.views.current(),
            &screen,
            self.message.as_ref(),
            self.gestures.held_for(now),
        );
        if let Err(e) = dev.panel.present(&self.frame) {
            warn!("Display error: {:#}", e);
        }
    }
}
