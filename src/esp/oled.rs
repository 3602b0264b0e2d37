// Air-Sentinel - SSD1306 OLED Driver
//
// Register-level driver for the 128x32 panel over I2C. The frame buffer is
// already in the controller's page layout, so a flush is one address window
// followed by the raw bytes.

use anyhow::Result;
use esp_idf_hal::i2c::I2cDriver;

use crate::config::*;
use crate::drivers::{Frame, Panel};

const CONTROL_CMD: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
const DATA_CHUNK: usize = 32;

/// 128x32, internal charge pump, horizontal addressing, rotated 180.
const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x1F, // multiplex 32
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x02, // COM pins for 128x32
    0x81, 0x8F, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH
    0xA4, // resume from RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct Ssd1306 {
    i2c: I2cDriver<'static>,
}

impl Ssd1306 {
    pub fn new(i2c: I2cDriver<'static>) -> Self {
        Self { i2c }
    }

    pub fn init(&mut self) -> Result<()> {
        for &cmd in INIT_SEQUENCE {
            self.command(&[cmd])?;
        }
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> Result<()> {
        let mut buf = [0u8; 4];
        buf[0] = CONTROL_CMD;
        buf[1..=bytes.len()].copy_from_slice(bytes);
        self.i2c
            .write(I2C_ADDR_OLED, &buf[..=bytes.len()], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}

impl Panel for Ssd1306 {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let last_page = (SCREEN_HEIGHT / 8 - 1) as u8;
        self.command(&[0x21, 0, (SCREEN_WIDTH - 1) as u8])?;
        self.command(&[0x22, 0, last_page])?;

        let mut buf = [0u8; DATA_CHUNK + 1];
        buf[0] = CONTROL_DATA;
        for chunk in frame.bytes().chunks(DATA_CHUNK) {
            buf[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c
                .write(I2C_ADDR_OLED, &buf[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}
