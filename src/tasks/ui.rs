// Air-Sentinel - Views & Display Composition
//
// Five full-screen views share the 128x32 panel. A short tap steps through
// all of them; auto-cycle rotates only through the first three, which need
// no network diagnostics to be meaningful.
//
// Each frame is composed in priority order:
//
//   1. timed overlay message     ("AUTO ON", "CAL & LOGGED!", ...)
//   2. hold prompt               (button still down past 10 s / 5 s)
//   3. current view

use crate::aqi;
use crate::clock::LocalTime;
use crate::config::*;
use crate::drivers::{Frame, ScanEntry};
use crate::events::{Message, WeatherReport};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Weather,
    Graph,
    WifiDiag,
    WifiScan,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Weather,
        View::Graph,
        View::WifiDiag,
        View::WifiScan,
    ];

    /// Rotated by auto-cycle.
    pub const AUTO: [View; 3] = [View::Dashboard, View::Weather, View::Graph];
}

pub struct ViewScheduler {
    index: usize,
    last_change: u32,
}

impl ViewScheduler {
    pub const fn new(now: u32) -> Self {
        Self {
            index: 0,
            last_change: now,
        }
    }

    pub fn current(&self) -> View {
        View::ALL[self.index]
    }

    /// Step through the full list. The caller disables auto-cycle.
    pub fn manual_advance(&mut self, now: u32) {
        self.index = (self.index + 1) % View::ALL.len();
        self.last_change = now;
    }

    /// Advance within the auto subset once the dwell time has passed.
    /// A view outside the subset jumps to its first entry.
    pub fn auto_advance(&mut self, now: u32) -> bool {
        if now.wrapping_sub(self.last_change) < AUTO_CYCLE_INTERVAL_MS {
            return false;
        }
        let current = self.current();
        let next = match View::AUTO.iter().position(|v| *v == current) {
            Some(i) => View::AUTO[(i + 1) % View::AUTO.len()],
            None => View::AUTO[0],
        };
        self.index = View::ALL.iter().position(|v| *v == next).unwrap_or(0);
        self.last_change = now;
        true
    }
}

// ---------------------------------------------------------------------------
// Frame inputs
// ---------------------------------------------------------------------------
/// Everything a view may show. Borrowed from the monitor for one frame.
pub struct Screen<'a> {
    pub now: u32,
    pub time: LocalTime,
    pub dust: f32,
    pub weather: &'a WeatherReport,
    pub rssi: Option<i8>,
    pub ip: Option<String>,
    pub networks: &'a [ScanEntry],
}

/// Draw one complete frame.
pub fn compose(
    frame: &mut Frame,
    view: View,
    screen: &Screen<'_>,
    message: Option<&Message>,
    held_ms: Option<u32>,
) {
    frame.clear();

    if let Some(msg) = message.filter(|m| m.is_active(screen.now)) {
        frame.text_centered(&msg.text, 12);
        return;
    }

    match held_ms {
        Some(held) if held >= PORTAL_HOLD_MS => {
            frame.text("RELEASE FOR", 0, 8);
            frame.text("SETUP PORTAL", 0, 18);
        }
        Some(held) if held >= CALIBRATION_HOLD_MS => {
            frame.text("RELEASE TO", 0, 8);
            frame.text("CALIBRATE", 0, 18);
        }
        _ => draw_view(frame, view, screen),
    }
}

fn draw_view(frame: &mut Frame, view: View, screen: &Screen<'_>) {
    match view {
        View::Dashboard => dashboard(frame, screen),
        View::Weather => weather(frame, screen),
        View::Graph => graph(frame, screen),
        View::WifiDiag => wifi_diag(frame, screen),
        View::WifiScan => wifi_scan(frame, screen),
    }
}

fn dashboard(frame: &mut Frame, s: &Screen<'_>) {
    frame.text(
        &format!("{}  {}", s.time.clock_text(), s.weather.temperature),
        0,
        0,
    );
    frame.text(&s.time.date_text(), 0, 8);

    let blink_on = (s.now / WARNING_BLINK_MS) % 2 == 0;
    let status = if s.dust > WARNING_THRESHOLD && blink_on {
        "!!! WARNING !!!".to_string()
    } else {
        format!("STATUS: {}", aqi::classify(s.dust).label())
    };
    frame.text(&status, 0, 16);
    frame.text(&format!("PM2.5: {:.2} ug/m3", s.dust), 0, 24);
}

fn weather(frame: &mut Frame, s: &Screen<'_>) {
    frame.text("WEATHER REPORT", 0, 0);
    frame.text("----------------", 0, 8);
    frame.text(&format!("TEMP: {}", s.weather.temperature), 0, 16);
    frame.text(&s.weather.description.to_uppercase(), 0, 24);
}

/// Bar length for the trend view: two pixels per ug/m3, capped at 120.
pub fn graph_bar_width(dust: f32) -> u32 {
    ((dust * 2.0) as u32).min(120)
}

fn graph(frame: &mut Frame, s: &Screen<'_>) {
    frame.text(&format!("TREND: {}", aqi::classify(s.dust).label()), 0, 0);
    frame.rect(0, 18, 122, 12);
    frame.fill_rect(2, 20, graph_bar_width(s.dust), 8);
}

fn wifi_diag(frame: &mut Frame, s: &Screen<'_>) {
    frame.text("WIFI DIAGNOSTIC", 0, 0);
    match (s.rssi, s.ip.as_deref()) {
        (Some(rssi), ip) => {
            frame.text(&format!("RSSI: {} dBm", rssi), 0, 10);
            frame.text(&format!("IP: {}", ip.unwrap_or("0.0.0.0")), 0, 18);
        }
        (None, _) => frame.text("DISCONNECTED", 0, 12),
    }
}

fn wifi_scan(frame: &mut Frame, s: &Screen<'_>) {
    frame.text("NEARBY NETWORKS", 0, 0);
    for (i, net) in s.networks.iter().take(3).enumerate() {
        frame.text(&network_line(i, net), 0, 8 + i as i32 * 8);
    }
}

fn network_line(i: usize, net: &ScanEntry) -> String {
    let ssid: String = net.ssid.chars().take(10).collect();
    format!("{}.{:<10} {}", i + 1, ssid, net.rssi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::STAMP;

    fn lines(rows: &[(&str, i32)]) -> Frame {
        let mut frame = Frame::new();
        for (text, y) in rows {
            frame.text(text, 0, *y);
        }
        frame
    }

    fn screen<'a>(now: u32, dust: f32, weather: &'a WeatherReport) -> Screen<'a> {
        Screen {
            now,
            time: STAMP,
            dust,
            weather,
            rssi: None,
            ip: None,
            networks: &[],
        }
    }

    #[test]
    fn manual_advance_visits_every_view() {
        let mut views = ViewScheduler::new(0);
        let mut seen = vec![views.current()];
        for t in 1..View::ALL.len() as u32 {
            views.manual_advance(t);
            seen.push(views.current());
        }
        assert_eq!(seen, View::ALL);
        views.manual_advance(99);
        assert_eq!(views.current(), View::Dashboard);
    }

    #[test]
    fn auto_cycle_steps_once_per_interval() {
        let mut views = ViewScheduler::new(0);
        let mut changes = Vec::new();
        let mut now = 0;
        while now <= 40_000 {
            if views.auto_advance(now) {
                changes.push((now, views.current()));
            }
            now += 50;
        }
        assert_eq!(
            changes,
            vec![
                (10_000, View::Weather),
                (20_000, View::Graph),
                (30_000, View::Dashboard),
                (40_000, View::Weather),
            ]
        );
    }

    #[test]
    fn auto_cycle_leaves_diagnostic_views() {
        let mut views = ViewScheduler::new(0);
        for _ in 0..4 {
            views.manual_advance(0);
        }
        assert_eq!(views.current(), View::WifiScan);
        assert!(!views.auto_advance(9_999));
        assert!(views.auto_advance(10_000));
        assert_eq!(views.current(), View::Dashboard);
    }

    #[test]
    fn dashboard_blinks_warning_above_threshold() {
        let report = WeatherReport::default();
        let mut frame = Frame::new();

        compose(&mut frame, View::Dashboard, &screen(0, 40.0, &report), None, None);
        let warning = lines(&[
            ("09:05:02  --C", 0),
            ("07/03/2026", 8),
            ("!!! WARNING !!!", 16),
            ("PM2.5: 40.00 ug/m3", 24),
        ]);
        assert_eq!(frame.bytes(), warning.bytes());

        compose(&mut frame, View::Dashboard, &screen(500, 40.0, &report), None, None);
        let status = lines(&[
            ("09:05:02  --C", 0),
            ("07/03/2026", 8),
            ("STATUS: UNHEALTHY-S", 16),
            ("PM2.5: 40.00 ug/m3", 24),
        ]);
        assert_eq!(frame.bytes(), status.bytes());
    }

    #[test]
    fn dashboard_never_warns_at_or_below_threshold() {
        let report = WeatherReport::default();
        let mut frame = Frame::new();
        compose(&mut frame, View::Dashboard, &screen(0, 35.0, &report), None, None);
        let expected = lines(&[
            ("09:05:02  --C", 0),
            ("07/03/2026", 8),
            ("STATUS: MODERATE", 16),
            ("PM2.5: 35.00 ug/m3", 24),
        ]);
        assert_eq!(frame.bytes(), expected.bytes());
    }

    #[test]
    fn graph_bar_is_capped() {
        assert_eq!(graph_bar_width(0.0), 0);
        assert_eq!(graph_bar_width(12.7), 25);
        assert_eq!(graph_bar_width(60.0), 120);
        assert_eq!(graph_bar_width(400.0), 120);

        let report = WeatherReport::default();
        let mut frame = Frame::new();
        compose(&mut frame, View::Graph, &screen(0, 30.0, &report), None, None);
        assert_eq!(frame.pixel(2 + 59, 24), Some(true));
        assert_eq!(frame.pixel(2 + 61, 24), Some(false));
    }

    #[test]
    fn wifi_views_show_link_and_scan() {
        let report = WeatherReport::default();
        let mut frame = Frame::new();

        compose(&mut frame, View::WifiDiag, &screen(0, 0.0, &report), None, None);
        let offline = lines(&[("WIFI DIAGNOSTIC", 0), ("DISCONNECTED", 12)]);
        assert_eq!(frame.bytes(), offline.bytes());

        let networks = [
            ScanEntry { ssid: "VeryLongNetworkName".into(), rssi: -40 },
            ScanEntry { ssid: "home".into(), rssi: -55 },
            ScanEntry { ssid: "cafe".into(), rssi: -70 },
            ScanEntry { ssid: "hidden".into(), rssi: -90 },
        ];
        let mut s = screen(0, 0.0, &report);
        s.networks = &networks;
        compose(&mut frame, View::WifiScan, &s, None, None);
        let expected = lines(&[
            ("NEARBY NETWORKS", 0),
            ("1.VeryLongNe -40", 8),
            ("2.home       -55", 16),
            ("3.cafe       -70", 24),
        ]);
        assert_eq!(frame.bytes(), expected.bytes());
    }

    #[test]
    fn message_outranks_hold_prompt_and_view() {
        let report = WeatherReport::default();
        let msg = Message::new("AUTO ON", 1_000, AUTO_MESSAGE_MS);
        let mut frame = Frame::new();

        compose(&mut frame, View::Weather, &screen(1_500, 0.0, &report), Some(&msg), Some(6_000));
        let mut expected = Frame::new();
        expected.text_centered("AUTO ON", 12);
        assert_eq!(frame.bytes(), expected.bytes());

        compose(&mut frame, View::Weather, &screen(2_000, 0.0, &report), Some(&msg), Some(6_000));
        let prompt = lines(&[("RELEASE TO", 8), ("CALIBRATE", 18)]);
        assert_eq!(frame.bytes(), prompt.bytes());

        compose(&mut frame, View::Weather, &screen(2_000, 0.0, &report), None, Some(10_000));
        let portal = lines(&[("RELEASE FOR", 8), ("SETUP PORTAL", 18)]);
        assert_eq!(frame.bytes(), portal.bytes());

        compose(&mut frame, View::Weather, &screen(2_000, 0.0, &report), None, Some(4_999));
        let view = lines(&[
            ("WEATHER REPORT", 0),
            ("----------------", 8),
            ("TEMP: --C", 16),
            ("SYNCING...", 24),
        ]);
        assert_eq!(frame.bytes(), view.bytes());
    }
}
