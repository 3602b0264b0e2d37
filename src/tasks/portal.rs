// Air-Sentinel - Setup Portal
//
// Minimal HTTP/1.0 server run while the device is its own access point.
// One connection per poll, one request per connection:
//
//   GET /logs           -> calibration history as text/plain
//   GET /?s=&p=&la=&lo=&os=  -> save settings, reply, caller reboots
//   anything else       -> settings form
//
// The loop owns the CPU until a save succeeds or the recovery button is
// held; either way the caller reboots.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use crate::clock::WallClock;
use crate::config::*;
use crate::drivers::{Frame, Panel};
use crate::store::{ConfigStore, Settings, SettingsUpdate, Storage};

const NO_HISTORY: &str = "No history found.";
const SAVED: &str = "Saved! Rebooting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalExit {
    /// New settings were written; reboot to apply them.
    Saved,
    /// Recovery button held.
    Recovery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Logs,
    Save(SettingsUpdate),
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content_type: Option<&'static str>,
    pub body: String,
    pub reboot: bool,
}

impl Reply {
    pub fn to_http(&self) -> String {
        match self.content_type {
            Some(ct) => format!("HTTP/1.0 200 OK\r\nContent-type: {}\r\n\r\n{}", ct, self.body),
            None => format!("HTTP/1.0 200 OK\r\n\r\n{}", self.body),
        }
    }
}

// ---------------------------------------------------------------------------
// Request handling
// ---------------------------------------------------------------------------

/// Route on the request text the same loose way the portal always has:
/// substring match on the method and path.
pub fn route(request: &str) -> Route {
    if request.contains("GET /logs") {
        return Route::Logs;
    }
    if request.contains("GET /?s=") {
        let query = request
            .lines()
            .next()
            .and_then(|line| line.split(' ').nth(1))
            .and_then(|target| target.split_once('?'))
            .map(|(_, query)| query)
            .unwrap_or_default();
        return Route::Save(parse_save_query(query));
    }
    Route::Form
}

fn parse_save_query(query: &str) -> SettingsUpdate {
    let mut update = SettingsUpdate::default();
    for (key, value) in parse_query(query) {
        match key.as_str() {
            "s" => update.ssid = Some(value),
            "p" => update.password = Some(value),
            "la" => update.latitude = Some(value),
            "lo" => update.longitude = Some(value),
            "os" => match value.trim().parse::<f32>() {
                Ok(offset) => update.offset = Some(offset),
                Err(_) => warn!("Ignoring unparsable offset {:?}", value),
            },
            other => warn!("Ignoring unknown portal field {:?}", other),
        }
    }
    update
}

/// Split `a=1&b=2` into percent-decoded pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(key), url_decode(value))
        })
        .collect()
}

/// Form decoding: `+` is a space, `%XX` a byte. Malformed escapes pass
/// through literally; invalid UTF-8 is replaced.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match bytes.get(i + 1..i + 3).and_then(decode_hex_pair) {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn decode_hex_pair(pair: &[u8]) -> Option<u8> {
    // from_str_radix alone would accept a leading sign.
    if !pair.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let text = std::str::from_utf8(pair).ok()?;
    u8::from_str_radix(text, 16).ok()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

pub fn render_form(settings: &Settings) -> String {
    format!(
        "<html><head><meta name='viewport' content='width=device-width, initial-scale=1'>\
<style>body{{font-family:sans-serif;padding:20px;background:#f4f4f9;}}\
input{{width:100%;padding:10px;margin:5px 0;}}\
.btn{{display:block;width:100%;padding:12px;text-align:center;background:#2ecc71;color:white;\
text-decoration:none;border-radius:5px;border:none;margin-top:10px;}}\
.log{{background:#3498db;}}</style></head>\
<body><h2>Air-Sentinel Settings</h2><form>\
SSID:<input name='s' value='{ssid}'>\
Pass:<input name='p' type='password'>\
Lat:<input name='la' value='{lat}'>\
Lon:<input name='lo' value='{lon}'>\
Offset (V):<input name='os' value='{offset:.4}'>\
<input type='submit' class='btn' value='Save &amp; Reboot'></form>\
<a href='/logs' class='btn log'>View Calibration History</a></body></html>",
        ssid = escape_html(&settings.ssid),
        lat = escape_html(&settings.latitude),
        lon = escape_html(&settings.longitude),
        offset = settings.offset,
    )
}

pub fn handle_request<S: Storage>(
    request: &str,
    store: &mut ConfigStore<S>,
    clock: &dyn WallClock,
) -> Reply {
    match route(request) {
        Route::Logs => Reply {
            content_type: Some("text/plain"),
            body: store
                .calibration_log()
                .unwrap_or_else(|| NO_HISTORY.to_string()),
            reboot: false,
        },
        Route::Save(update) => {
            info!("Portal save: {:?}", SettingsUpdate { password: None, ..update.clone() });
            if let Err(e) = store.update(update, clock.local_time()) {
                warn!("Portal settings not persisted: {:#}", e);
            }
            Reply {
                content_type: None,
                body: SAVED.to_string(),
                reboot: true,
            }
        }
        Route::Form => Reply {
            content_type: Some("text/html"),
            body: render_form(store.settings()),
            reboot: false,
        },
    }
}

// ---------------------------------------------------------------------------
// Accept loop
// ---------------------------------------------------------------------------
pub struct PortalRig<'a> {
    pub panel: &'a mut dyn Panel,
    pub clock: &'a dyn WallClock,
    /// Polled once per iteration; `true` leaves the portal.
    pub recovery_pressed: &'a mut dyn FnMut() -> bool,
}

pub fn serve<S: Storage>(
    listener: &TcpListener,
    store: &mut ConfigStore<S>,
    frame: &mut Frame,
    rig: PortalRig<'_>,
) -> PortalExit {
    if let Err(e) = listener.set_nonblocking(true) {
        warn!("Portal listener stays blocking: {}", e);
    }
    info!("Setup portal listening on {:?}", listener.local_addr().ok());

    loop {
        frame.clear();
        frame.text(AP_SSID, 0, 0);
        frame.text(&format!("pass: {}", AP_PASSWORD), 0, 12);
        frame.text(&format!("IP: {}", AP_IP), 0, 24);
        if let Err(e) = rig.panel.present(frame) {
            warn!("Display error: {:#}", e);
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                info!("Portal client {}", peer);
                match handle_connection(stream, store, rig.clock) {
                    Ok(true) => return PortalExit::Saved,
                    Ok(false) => {}
                    Err(e) => warn!("Portal connection error: {:#}", e),
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(PORTAL_POLL_MS));
            }
            Err(e) => warn!("Portal accept error: {}", e),
        }

        if (rig.recovery_pressed)() {
            info!("Recovery button held - leaving portal");
            return PortalExit::Recovery;
        }
    }
}

/// Serve one request. Returns `true` when the settings were saved.
fn handle_connection<S: Storage>(
    mut stream: TcpStream,
    store: &mut ConfigStore<S>,
    clock: &dyn WallClock,
) -> Result<bool> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_millis(PORTAL_POLL_MS)))?;

    let mut buf = [0u8; PORTAL_REQUEST_MAX];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let reply = handle_request(&request, store, clock);
    stream.write_all(reply.to_http().as_bytes())?;
    stream.flush()?;
    let _ = stream.shutdown(std::net::Shutdown::Both);
    Ok(reply.reboot)
}
