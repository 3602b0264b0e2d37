// Air-Sentinel - PM2.5 monitor firmware
//
// Everything that does not touch the radio or the registers lives here and
// builds on the host. The device glue is in `esp`, compiled only for the
// ESP-IDF target.

pub mod aqi;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod events;
pub mod input;
pub mod monitor;
pub mod store;
pub mod tasks;
pub mod weather;

#[cfg(target_os = "espidf")]
pub mod esp;

#[cfg(test)]
mod testing;
