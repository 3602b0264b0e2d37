// Air-Sentinel - Hardware seams
//
// The control loop only talks to the board through these traits. The device
// build implements them on ESP-IDF drivers (see `crate::esp`); tests use
// scripted fakes.

pub mod dust;
pub mod frame;
pub mod indicators;

use anyhow::Result;

pub use frame::Frame;

/// One-shot analog read, 12-bit (0..=4095).
pub trait AnalogInput {
    fn read_raw(&mut self) -> u16;
}

/// One full optical measurement cycle of the dust sensor, in volts.
pub trait Probe {
    fn sample_voltage(&mut self) -> f32;
}

/// Category indicator lines. `Some(level)` lights exactly that line,
/// `None` turns every line off.
pub trait Indicators {
    fn show_level(&mut self, level: Option<usize>);
}

/// Pushes a finished frame to the physical display.
pub trait Panel {
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// One access point seen by a station scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub ssid: String,
    pub rssi: i8,
}

/// Station-mode network link used by the background tasks.
pub trait Network {
    fn is_connected(&self) -> bool;
    fn rssi(&self) -> Option<i8>;
    fn ip_address(&self) -> Option<String>;
    fn scan(&mut self) -> Result<Vec<ScanEntry>>;
    /// Bounded wait for an SNTP sync; `Err` if it did not complete.
    fn sync_time(&mut self) -> Result<()>;
    fn http_get(&mut self, url: &str) -> Result<String>;
}
