// Air-Sentinel - ESP-IDF board glue
//
// Implementations of the hardware seams on top of esp-idf-hal / esp-idf-svc.

pub mod adc;
pub mod clock;
pub mod http_client;
pub mod oled;
pub mod storage;
pub mod wifi;

// ---------------------------------------------------------------------------
// Utility: milliseconds since boot (wraps at ~49 days; callers use wrapping
// arithmetic)
// ---------------------------------------------------------------------------
pub fn now_ms() -> u32 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
}
