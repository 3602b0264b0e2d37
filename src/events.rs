// Air-Sentinel - System Events & Shared Data Types

// ---------------------------------------------------------------------------
// Gestures (produced by the button state machine, consumed once per tick)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureEvent {
    #[default]
    None,
    /// Exactly one click after the quiet window closed.
    ShortTap,
    /// Two or more clicks coalesced inside the quiet window.
    DoubleTap,
    /// Released after 5 s or more.
    CalibrationHold,
    /// Released after 10 s or more.
    PortalHold,
}

// ---------------------------------------------------------------------------
// Control-loop phase
// ---------------------------------------------------------------------------
/// What the main loop must do after a tick. `Calibrating` and `PortalActive`
/// are blocking sub-loops that own the CPU until they finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    Calibrating,
    PortalActive,
}

// ---------------------------------------------------------------------------
// Timed overlay message
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    shown_at: u32,
    duration_ms: u32,
}

impl Message {
    pub fn new(text: impl Into<String>, now: u32, duration_ms: u32) -> Self {
        Self {
            text: text.into(),
            shown_at: now,
            duration_ms,
        }
    }

    /// Still on screen at `now` (wrap-safe on the u32 millisecond clock).
    pub fn is_active(&self, now: u32) -> bool {
        now.wrapping_sub(self.shown_at) < self.duration_ms
    }
}

// ---------------------------------------------------------------------------
// Cached remote weather
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    pub temperature: String,
    pub description: String,
}

impl Default for WeatherReport {
    fn default() -> Self {
        Self {
            temperature: "--C".to_string(),
            description: "Syncing...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_after_its_duration() {
        let msg = Message::new("AUTO ON", 1_000, 1_000);
        assert!(msg.is_active(1_000));
        assert!(msg.is_active(1_999));
        assert!(!msg.is_active(2_000));
    }

    #[test]
    fn message_survives_clock_wrap() {
        let msg = Message::new("CAL & LOGGED!", u32::MAX - 500, 2_000);
        assert!(msg.is_active(1_000));
        assert!(!msg.is_active(1_500));
    }
}
