// Scripted stand-ins for the hardware seams, shared by the unit tests.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use embedded_hal::delay::DelayNs;

use crate::clock::{LocalTime, WallClock};
use crate::drivers::dust::raw_to_volts;
use crate::drivers::{Frame, Indicators, Network, Panel, Probe, ScanEntry};
use crate::store::Storage;

pub const STAMP: LocalTime = LocalTime {
    year: 2026,
    month: 3,
    day: 7,
    hour: 9,
    minute: 5,
    second: 2,
};

#[derive(Debug, Default)]
pub struct MemStorage {
    files: HashMap<String, String>,
    pub fail_writes: bool,
}

impl Storage for MemStorage {
    fn read(&self, name: &str) -> Result<String> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("{} not found", name))
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        if self.fail_writes {
            bail!("write to {} refused", name);
        }
        self.files.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn append(&mut self, name: &str, contents: &str) -> Result<()> {
        if self.fail_writes {
            bail!("append to {} refused", name);
        }
        self.files.entry(name.to_string()).or_default().push_str(contents);
        Ok(())
    }
}

pub struct FixedClock;

impl WallClock for FixedClock {
    fn local_time(&self) -> LocalTime {
        STAMP
    }
}

/// Returns the same voltage every cycle and counts cycles.
pub struct ConstProbe {
    volts: f32,
    pub samples: usize,
}

impl ConstProbe {
    pub fn raw(raw: u16) -> Self {
        Self::volts(raw_to_volts(raw))
    }

    pub fn volts(volts: f32) -> Self {
        Self { volts, samples: 0 }
    }

    pub fn set_volts(&mut self, volts: f32) {
        self.volts = volts;
    }
}

impl Probe for ConstProbe {
    fn sample_voltage(&mut self) -> f32 {
        self.samples += 1;
        self.volts
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndicators {
    pub history: Vec<Option<usize>>,
}

impl RecordingIndicators {
    pub fn current(&self) -> Option<usize> {
        self.history.last().copied().flatten()
    }
}

impl Indicators for RecordingIndicators {
    fn show_level(&mut self, level: Option<usize>) {
        self.history.push(level);
    }
}

/// Counts presents and keeps a copy of the last frame.
#[derive(Default)]
pub struct CountingPanel {
    pub frames: usize,
    pub last: Option<Frame>,
}

impl Panel for CountingPanel {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames += 1;
        self.last = Some(frame.clone());
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub struct FakeNetwork {
    online: bool,
    pub body: String,
    pub fail_sync: bool,
    pub sync_calls: u32,
    pub requests: Vec<String>,
    pub visible: Vec<ScanEntry>,
}

impl FakeNetwork {
    pub fn offline() -> Self {
        Self {
            online: false,
            body: String::new(),
            fail_sync: false,
            sync_calls: 0,
            requests: Vec::new(),
            visible: Vec::new(),
        }
    }

    pub fn online(body: &str) -> Self {
        Self {
            online: true,
            body: body.to_string(),
            ..Self::offline()
        }
    }
}

impl Network for FakeNetwork {
    fn is_connected(&self) -> bool {
        self.online
    }

    fn rssi(&self) -> Option<i8> {
        self.online.then_some(-61)
    }

    fn ip_address(&self) -> Option<String> {
        self.online.then(|| "192.168.1.42".to_string())
    }

    fn scan(&mut self) -> Result<Vec<ScanEntry>> {
        Ok(self.visible.clone())
    }

    fn sync_time(&mut self) -> Result<()> {
        self.sync_calls += 1;
        if self.fail_sync {
            bail!("sntp sync pending");
        }
        Ok(())
    }

    fn http_get(&mut self, url: &str) -> Result<String> {
        self.requests.push(url.to_string());
        Ok(self.body.clone())
    }
}
