// Air-Sentinel - Dust Sampling
//
// Each control-loop tick takes one excitation cycle from the probe, removes
// the calibration baseline and scales to ug/m3. The last 60 concentrations
// are kept; the displayed value is the mean of the newest 15.
//
// A stuck or disconnected sensor is not detected: it shows up as a steady
// but wrong concentration.

use heapless::Deque;

use crate::config::*;
use crate::drivers::Probe;

/// Concentration estimate for one probe voltage.
pub fn concentration(volts: f32, offset: f32) -> f32 {
    (volts - offset).max(0.0) * DUST_SENSITIVITY
}

/// Fixed-capacity FIFO of recent concentrations, pre-filled with zeros so it
/// is always full.
pub struct DustWindow {
    history: Deque<f32, HISTORY_LEN>,
}

impl Default for DustWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl DustWindow {
    pub fn new() -> Self {
        let mut history = Deque::new();
        while history.push_back(0.0).is_ok() {}
        Self { history }
    }

    /// Append, evicting the oldest entry.
    pub fn push(&mut self, value: f32) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.history.iter()
    }

    /// Mean of the newest `SMOOTHING_LEN` entries.
    pub fn smoothed(&self) -> f32 {
        let skip = self.history.len().saturating_sub(SMOOTHING_LEN);
        let sum: f32 = self.history.iter().skip(skip).sum();
        sum / SMOOTHING_LEN as f32
    }
}

/// Take one reading and fold it into `window`; returns the new smoothed value.
pub fn sample(probe: &mut dyn Probe, window: &mut DustWindow, offset: f32) -> f32 {
    let volts = probe.sample_voltage();
    window.push(concentration(volts, offset));
    window.smoothed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ConstProbe;

    #[test]
    fn baseline_is_subtracted_and_clamped() {
        assert!((concentration(0.8, 0.6) - 34.0).abs() < 1e-3);
        assert_eq!(concentration(0.5, 0.6), 0.0);
    }

    #[test]
    fn window_stays_full_and_evicts_oldest_first() {
        let mut window = DustWindow::new();
        assert_eq!(window.len(), HISTORY_LEN);

        for i in 0..150 {
            window.push(i as f32);
            assert_eq!(window.len(), HISTORY_LEN);
        }

        let values: Vec<f32> = window.iter().copied().collect();
        let expected: Vec<f32> = (90..150).map(|i| i as f32).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn smoothing_uses_the_newest_fifteen() {
        let mut window = DustWindow::new();
        for _ in 0..HISTORY_LEN {
            window.push(1_000.0);
        }
        for _ in 0..SMOOTHING_LEN {
            window.push(30.0);
        }
        assert!((window.smoothed() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn smoothing_ramps_up_from_an_empty_history() {
        let mut window = DustWindow::new();
        window.push(150.0);
        assert!((window.smoothed() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn sample_feeds_the_window() {
        let mut probe = ConstProbe::volts(1.0);
        let mut window = DustWindow::new();
        let mut smoothed = 0.0;
        for _ in 0..SMOOTHING_LEN {
            smoothed = sample(&mut probe, &mut window, 0.6);
        }
        assert!((smoothed - 68.0).abs() < 1e-2);
    }
}
