use crate::clock::{LocalTime, WallClock};

/// C-library local time. Reads 1970-01-01 until the first SNTP sync.
pub struct SystemClock;

impl WallClock for SystemClock {
    fn local_time(&self) -> LocalTime {
        let mut now: libc::time_t = 0;
        let mut tm: libc::tm = unsafe { std::mem::zeroed() };
        unsafe {
            libc::time(&mut now);
            libc::localtime_r(&now, &mut tm);
        }
        LocalTime {
            year: tm.tm_year + 1900,
            month: (tm.tm_mon + 1) as u8,
            day: tm.tm_mday as u8,
            hour: tm.tm_hour as u8,
            minute: tm.tm_min as u8,
            second: tm.tm_sec as u8,
        }
    }
}
