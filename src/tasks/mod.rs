pub mod background;
pub mod calibration;
pub mod portal;
pub mod sensor;
pub mod ui;
