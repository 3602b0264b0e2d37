// Air-Sentinel - Wall-clock time
//
// Calendar time as broken down by the C library on the device. Only used for
// display, telemetry stamps and calibration log entries; the control loop
// itself runs on the monotonic millisecond clock.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    /// `YYYY-MM-DD HH:MM`, as written to the calibration log.
    pub fn log_stamp(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }

    /// `HH:MM:SS`
    pub fn clock_text(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    /// `DD/MM/YYYY`
    pub fn date_text(&self) -> String {
        format!("{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

/// `YYYY-MM-DD HH:MM:SS`, as used in telemetry records.
impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

pub trait WallClock {
    fn local_time(&self) -> LocalTime;
}
