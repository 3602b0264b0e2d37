// Air-Sentinel - Baseline Calibration
//
// Blocking foreground routine, entered from a 5-second hold. Runs to
// completion once started: 500 excitation cycles 10 ms apart (about five
// seconds), progress bar redrawn every 10th sample, indicators dark
// throughout. The mean voltage becomes the new offset and is persisted and
// logged through the config store.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::clock::LocalTime;
use crate::config::*;
use crate::drivers::{Frame, Indicators, Panel, Probe};
use crate::store::{ConfigStore, SettingsUpdate, Storage};

pub struct CalibrationRig<'a> {
    pub probe: &'a mut dyn Probe,
    pub indicators: &'a mut dyn Indicators,
    pub panel: &'a mut dyn Panel,
    pub delay: &'a mut dyn DelayNs,
}

/// Returns the new offset in volts.
pub fn calibrate<S: Storage>(
    rig: CalibrationRig<'_>,
    frame: &mut Frame,
    store: &mut ConfigStore<S>,
    stamp: LocalTime,
) -> f32 {
    info!("Calibration started ({} samples)", CAL_SAMPLE_COUNT);
    rig.indicators.show_level(None);

    frame.clear();
    frame.text("CALIBRATING...", 10, 5);
    frame.rect(10, 20, 108, 10);
    present(rig.panel, frame);

    let mut sum = 0.0f32;
    for i in 0..CAL_SAMPLE_COUNT {
        sum += rig.probe.sample_voltage();

        if i % CAL_PROGRESS_EVERY == 0 {
            let progress = (i as u32 * CAL_PROGRESS_WIDTH) / CAL_SAMPLE_COUNT as u32;
            frame.fill_rect(12, 22, progress, 6);
            present(rig.panel, frame);
        }
        rig.delay.delay_ms(CAL_SAMPLE_DELAY_MS);
    }

    let offset = sum / CAL_SAMPLE_COUNT as f32;
    info!("Calibration complete: offset {:.4} V", offset);

    let update = SettingsUpdate {
        offset: Some(offset),
        ..Default::default()
    };
    if let Err(e) = store.update(update, stamp) {
        warn!("Calibration offset not persisted: {:#}", e);
    }
    offset
}

fn present(panel: &mut dyn Panel, frame: &Frame) {
    if let Err(e) = panel.present(frame) {
        warn!("Display error: {:#}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::dust::raw_to_volts;
    use crate::testing::{ConstProbe, CountingPanel, MemStorage, NoDelay, RecordingIndicators, STAMP};

    #[test]
    fn constant_signal_becomes_the_offset() {
        let mut store = ConfigStore::load(MemStorage::default());
        let mut probe = ConstProbe::raw(1_000);
        let mut indicators = RecordingIndicators::default();
        let mut panel = CountingPanel::default();
        let mut delay = NoDelay;
        let mut frame = Frame::new();

        let offset = calibrate(
            CalibrationRig {
                probe: &mut probe,
                indicators: &mut indicators,
                panel: &mut panel,
                delay: &mut delay,
            },
            &mut frame,
            &mut store,
            STAMP,
        );

        let expected = raw_to_volts(1_000);
        assert!((offset - expected).abs() < 1e-4);
        assert!((store.settings().offset - expected).abs() < 1e-4);
        assert_eq!(probe.samples, CAL_SAMPLE_COUNT);

        let log = store.calibration_log().unwrap();
        assert_eq!(log.lines().count(), 1);
        assert_eq!(log, format!("2026-03-07 09:05, {:.4}\n", expected));
    }

    #[test]
    fn indicators_are_dark_and_progress_is_shown() {
        let mut store = ConfigStore::load(MemStorage::default());
        let mut probe = ConstProbe::raw(0);
        let mut indicators = RecordingIndicators::default();
        let mut panel = CountingPanel::default();
        let mut delay = NoDelay;
        let mut frame = Frame::new();

        calibrate(
            CalibrationRig {
                probe: &mut probe,
                indicators: &mut indicators,
                panel: &mut panel,
                delay: &mut delay,
            },
            &mut frame,
            &mut store,
            STAMP,
        );

        assert_eq!(indicators.history, vec![None]);
        // Title frame plus one redraw per 10 samples.
        assert_eq!(panel.frames, 1 + CAL_SAMPLE_COUNT / CAL_PROGRESS_EVERY);
        // Last redraw at sample 490 fills 101 of 104 columns.
        assert_eq!(frame.pixel(12 + 100, 24), Some(true));
        assert_eq!(frame.pixel(12 + 102, 24), Some(false));
    }
}
