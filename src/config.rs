// Air-Sentinel - Hardware & System Configuration
// Target: ESP32-C3-DevKitM-1 (RISC-V) + Sharp GP2Y1010 dust sensor
// Console runs over USB-Serial-JTAG, which frees GPIO20/21 for indicators.

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;       // User button (INPUT_PULLUP, active LOW)
pub const PIN_RECOVERY: i32 = 9;     // BOOT button - recovery / break-out (active LOW)
pub const PIN_DUST_LED: i32 = 10;    // Sensor IR LED drive (active LOW)
pub const PIN_DUST_ADC: i32 = 2;     // Sensor analog output (ADC1 channel 2)
pub const PIN_I2C_SDA: i32 = 6;      // I2C data line
pub const PIN_I2C_SCL: i32 = 7;      // I2C clock line
pub const PINS_CATEGORY: [i32; CATEGORY_COUNT] = [0, 1, 4, 5, 20, 21]; // GOOD .. HAZARDOUS

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED, 128x32)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 32;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 512

// ---------------------------------------------------------------------------
// Dust Sensor
// ---------------------------------------------------------------------------
pub const ADC_FULL_SCALE: f32 = 4095.0;     // 12-bit one-shot ADC
pub const ADC_REFERENCE_V: f32 = 3.3;
pub const DUST_PULSE_SETTLE_US: u32 = 280;  // LED on -> sample point
pub const DUST_PULSE_HOLD_US: u32 = 40;     // sample point -> LED off
pub const DUST_SENSITIVITY: f32 = 170.0;    // ug/m3 per volt above baseline
pub const HISTORY_LEN: usize = 60;
pub const SMOOTHING_LEN: usize = 15;

// ---------------------------------------------------------------------------
// Air-quality categories
// ---------------------------------------------------------------------------
pub const CATEGORY_COUNT: usize = 6;
pub const WARNING_THRESHOLD: f32 = 35.0;

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------
pub const CAL_SAMPLE_COUNT: usize = 500;
pub const CAL_SAMPLE_DELAY_MS: u32 = 10;
pub const CAL_PROGRESS_EVERY: usize = 10;
pub const CAL_PROGRESS_WIDTH: u32 = 104;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const TICK_INTERVAL_MS: u64 = 50;               // ~20 Hz frame rate
pub const CLICK_MIN_MS: u32 = 20;                   // shorter presses are contact noise
pub const CLICK_QUIET_MS: u32 = 250;                // multi-click aggregation window
pub const CALIBRATION_HOLD_MS: u32 = 5_000;
pub const PORTAL_HOLD_MS: u32 = 10_000;
pub const AUTO_CYCLE_INTERVAL_MS: u32 = 10_000;
pub const TIME_SYNC_INTERVAL_MS: u32 = 86_400_000;  // 24 hours
pub const WEATHER_INTERVAL_MS: u32 = 900_000;       // 15 minutes
pub const TELEMETRY_INTERVAL_MS: u32 = 1_000;
pub const CAL_MESSAGE_MS: u32 = 2_000;
pub const AUTO_MESSAGE_MS: u32 = 1_000;
pub const WARNING_BLINK_MS: u32 = 500;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------
pub const AP_SSID: &str = "AirSentinel_AP";
pub const AP_PASSWORD: &str = "password123";
pub const AP_IP: &str = "192.168.4.1";
pub const PORTAL_PORT: u16 = 80;
pub const PORTAL_POLL_MS: u64 = 500;
pub const PORTAL_REQUEST_MAX: usize = 1024;
pub const HTTP_TIMEOUT_MS: u64 = 15_000;
pub const WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------
pub const STORAGE_ROOT: &str = "/spiffs";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "cal_history.txt";

pub const DEFAULT_LAT: &str = "51.7520";
pub const DEFAULT_LON: &str = "-1.2577";
pub const DEFAULT_OFFSET_V: f32 = 0.6;
