// Air-Sentinel - Button Gesture State Machine
//
// Turns the raw button level into taps, multi-taps and timed holds.
// Polled once per control-loop tick with the current level and the
// millisecond clock; never touches hardware itself.
//
// Short presses are coalesced: every click restarts a 250 ms quiet window and
// nothing is emitted until that window closes, so a tap can never turn into a
// double-tap after its action has already fired.

use crate::config::*;
use crate::events::GestureEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonState {
    Idle,
    Pressed { since: u32 },
}

#[derive(Debug)]
pub struct GestureMachine {
    state: ButtonState,

    // Multi-click aggregation
    pending_clicks: u8,
    last_click: u32,
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureMachine {
    pub const fn new() -> Self {
        Self {
            state: ButtonState::Idle,
            pending_clicks: 0,
            last_click: 0,
        }
    }

    /// Call every tick. `pressed` is the logical level (true = held down).
    pub fn update(&mut self, pressed: bool, now: u32) -> GestureEvent {
        match (self.state, pressed) {
            // ---- press edge ----
            (ButtonState::Idle, true) => {
                self.state = ButtonState::Pressed { since: now };
            }

            // ---- release edge ----
            (ButtonState::Pressed { since }, false) => {
                self.state = ButtonState::Idle;
                let held = now.wrapping_sub(since);

                if held >= PORTAL_HOLD_MS {
                    self.pending_clicks = 0;
                    return GestureEvent::PortalHold;
                }
                if held >= CALIBRATION_HOLD_MS {
                    self.pending_clicks = 0;
                    return GestureEvent::CalibrationHold;
                }
                if held > CLICK_MIN_MS {
                    self.pending_clicks = self.pending_clicks.saturating_add(1);
                    self.last_click = now;
                }
            }

            _ => {}
        }

        self.check_quiet_window(now)
    }

    /// How long the button has been held, while it is still down.
    pub fn held_for(&self, now: u32) -> Option<u32> {
        match self.state {
            ButtonState::Pressed { since } => Some(now.wrapping_sub(since)),
            ButtonState::Idle => None,
        }
    }

    /// Once the quiet window closes, resolve the aggregated click count.
    fn check_quiet_window(&mut self, now: u32) -> GestureEvent {
        if self.pending_clicks == 0 || now.wrapping_sub(self.last_click) <= CLICK_QUIET_MS {
            return GestureEvent::None;
        }

        let clicks = self.pending_clicks;
        self.pending_clicks = 0;
        if clicks >= 2 {
            GestureEvent::DoubleTap
        } else {
            GestureEvent::ShortTap
        }
    }
}
