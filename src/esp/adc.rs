// Air-Sentinel - One-shot ADC
//
// Raw ESP-IDF oneshot driver on ADC1. 11 dB attenuation covers the full
// 0-3.3 V swing of the sensor output.

use anyhow::Result;
use esp_idf_sys::{
    adc_channel_t, adc_oneshot_chan_cfg_t, adc_oneshot_unit_handle_t, adc_oneshot_unit_init_cfg_t,
    esp,
};
use log::warn;

use crate::drivers::AnalogInput;

pub struct OneshotAdc {
    handle: adc_oneshot_unit_handle_t,
    channel: adc_channel_t,
}

impl OneshotAdc {
    /// Claim ADC1 and configure `channel` for 12-bit reads.
    pub fn new(channel: adc_channel_t) -> Result<Self> {
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        unsafe {
            let unit_cfg = adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp!(esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle))?;

            let chan_cfg = adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            esp!(esp_idf_sys::adc_oneshot_config_channel(handle, channel, &chan_cfg))?;
        }
        log::info!("ADC1 channel {} ready", channel);
        Ok(Self { handle, channel })
    }
}

impl AnalogInput for OneshotAdc {
    /// A failed conversion reads as 0, i.e. clean air.
    fn read_raw(&mut self) -> u16 {
        let mut raw: i32 = 0;
        let ret = unsafe { esp_idf_sys::adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != esp_idf_sys::ESP_OK {
            warn!("ADC read failed ({})", ret);
            return 0;
        }
        raw.clamp(0, 4095) as u16
    }
}
