// Air-Sentinel - Cooperative Background Tasks
//
// Evaluated once per control-loop tick. Each task carries its own interval
// and last-run stamp; a task that fails keeps its old stamp so the very next
// eligible tick tries again. Tasks do not depend on each other.
//
//   time sync   every 24 h   needs Wi-Fi
//   weather     every 15 min needs Wi-Fi
//   telemetry   every 1 s    always

use log::{info, warn};
use serde::Serialize;

use crate::clock::LocalTime;
use crate::config::*;
use crate::drivers::Network;
use crate::events::WeatherReport;
use crate::store::Settings;
use crate::weather;

// ---------------------------------------------------------------------------
// Interval gate
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    name: &'static str,
    interval_ms: u32,
    last_run: Option<u32>,
}

impl ScheduledTask {
    /// Never-run tasks are due immediately.
    pub const fn new(name: &'static str, interval_ms: u32) -> Self {
        Self {
            name,
            interval_ms,
            last_run: None,
        }
    }

    pub fn is_due(&self, now: u32) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.interval_ms,
        }
    }

    pub fn mark_run(&mut self, now: u32) {
        self.last_run = Some(now);
    }

    pub fn last_run(&self) -> Option<u32> {
        self.last_run
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct Background {
    pub time_sync: ScheduledTask,
    pub weather: ScheduledTask,
    pub telemetry: ScheduledTask,
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}

impl Background {
    pub const fn new() -> Self {
        Self {
            time_sync: ScheduledTask::new("time sync", TIME_SYNC_INTERVAL_MS),
            weather: ScheduledTask::new("weather", WEATHER_INTERVAL_MS),
            telemetry: ScheduledTask::new("telemetry", TELEMETRY_INTERVAL_MS),
        }
    }

    /// Returns true when a telemetry record is due this tick.
    pub fn run(
        &mut self,
        now: u32,
        net: &mut dyn Network,
        settings: &Settings,
        report: &mut WeatherReport,
    ) -> bool {
        let connected = net.is_connected();

        if connected && self.time_sync.is_due(now) {
            match net.sync_time() {
                Ok(()) => {
                    info!("Clock synchronised");
                    self.time_sync.mark_run(now);
                }
                Err(e) => warn!("{} failed, retrying next tick: {:#}", self.time_sync.name(), e),
            }
        }

        if connected && self.weather.is_due(now) {
            let url = weather::current_weather_url(&settings.latitude, &settings.longitude);
            match net.http_get(&url).and_then(|body| weather::parse_current_weather(&body)) {
                Ok(fresh) => {
                    info!("Weather: {} {}", fresh.temperature, fresh.description);
                    *report = fresh;
                    self.weather.mark_run(now);
                }
                Err(e) => warn!("{} refresh failed, keeping last values: {:#}", self.weather.name(), e),
            }
        }

        if self.telemetry.is_due(now) {
            self.telemetry.mark_run(now);
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Telemetry record (one JSON object per line on the diagnostic console)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rssi {
    Dbm(i8),
    Disconnected(&'static str),
}

impl From<Option<i8>> for Rssi {
    fn from(rssi: Option<i8>) -> Self {
        rssi.map(Rssi::Dbm).unwrap_or(Rssi::Disconnected("DISC"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub ts: String,
    pub dust: f64,
    pub cat: &'static str,
    pub cal: f64,
    pub temp: String,
    pub weather: String,
    pub rssi: Rssi,
    pub auto: bool,
}

impl Telemetry {
    pub fn new(
        time: LocalTime,
        dust: f32,
        offset: f32,
        report: &WeatherReport,
        rssi: Option<i8>,
        auto_cycle: bool,
    ) -> Self {
        Self {
            ts: time.to_string(),
            dust: round_to(dust, 2),
            cat: crate::aqi::classify(dust).label(),
            cal: round_to(offset, 4),
            temp: report.temperature.clone(),
            weather: report.description.clone(),
            rssi: rssi.into(),
            auto: auto_cycle,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn round_to(value: f32, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value as f64 * scale).round() / scale
}
