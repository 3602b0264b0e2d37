// Air-Sentinel - GP2Y1010 Optical Dust Sensor Driver
//
// The IR LED must be pulsed and the output sampled 280 us into the pulse;
// the LED is released 40 us later. Reordering these steps yields a reading
// from the wrong part of the optical cycle.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::*;
use crate::drivers::{AnalogInput, Probe};

pub struct DustProbe<L, A, D> {
    led: L,
    adc: A,
    delay: D,
}

impl<L, A, D> DustProbe<L, A, D>
where
    L: OutputPin,
    A: AnalogInput,
    D: DelayNs,
{
    pub fn new(mut led: L, adc: A, delay: D) -> Self {
        // LED is active LOW; park it off.
        let _ = led.set_high();
        Self { led, adc, delay }
    }
}

impl<L, A, D> Probe for DustProbe<L, A, D>
where
    L: OutputPin,
    A: AnalogInput,
    D: DelayNs,
{
    fn sample_voltage(&mut self) -> f32 {
        let _ = self.led.set_low();
        self.delay.delay_us(DUST_PULSE_SETTLE_US);
        let raw = self.adc.read_raw();
        self.delay.delay_us(DUST_PULSE_HOLD_US);
        let _ = self.led.set_high();
        raw_to_volts(raw)
    }
}

pub fn raw_to_volts(raw: u16) -> f32 {
    (raw as f32 / ADC_FULL_SCALE) * ADC_REFERENCE_V
}
