// Air-Sentinel - Category Indicator Lines
//
// Six mutually exclusive outputs, one per air-quality category. Only lines
// whose state changes are written, so refreshing every tick never glitches
// an already-correct output.

use embedded_hal::digital::OutputPin;

use crate::drivers::Indicators;

pub struct IndicatorBank<P, const N: usize> {
    pins: [P; N],
    active: Option<Option<usize>>,
}

impl<P: OutputPin, const N: usize> IndicatorBank<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        let mut bank = Self { pins, active: None };
        bank.show_level(None);
        bank
    }
}

impl<P: OutputPin, const N: usize> Indicators for IndicatorBank<P, N> {
    fn show_level(&mut self, level: Option<usize>) {
        let previous = self.active.replace(level);
        for (i, pin) in self.pins.iter_mut().enumerate() {
            let on = level == Some(i);
            let was_on = previous.map(|p| p == Some(i));
            if was_on == Some(on) {
                continue;
            }
            let result = if on { pin.set_high() } else { pin.set_low() };
            if result.is_err() {
                log::warn!("Indicator line {} write failed", i);
            }
        }
    }
}
