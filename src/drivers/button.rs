//! Edge-sampled single-button gesture recognizer.
//!
//! ## Sampling
//!
//! The button is read once per mains half-cycle by the zero-cross handler.
//! Debouncing is by state change only: the ≈8 ms sampling period is longer
//! than typical contact bounce, so no time filter is needed.
//!
//! ## Gestures
//!
//! | Event             | Condition                         |
//! |-------------------|-----------------------------------|
//! | press             | released → pressed, duration := 0 |
//! | hold              | pressed → pressed, duration += 1  |
//! | `Gesture`         | pressed → released                |
//!
//! Classification (short vs. long) belongs to the mode state machine; this
//! driver only measures.  Nothing is emitted while the button stays held.

/// A completed press, measured in half-cycles held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub duration: u16,
}

pub struct ButtonDriver {
    pressed: bool,
    duration: u16,
}

impl Default for ButtonDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonDriver {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            duration: 0,
        }
    }

    /// Feed one sample.  Returns the completed gesture on release.
    pub fn update(&mut self, pressed_now: bool) -> Option<Gesture> {
        if pressed_now != self.pressed {
            self.pressed = pressed_now;
            if pressed_now {
                self.duration = 0;
                return None;
            }
            return Some(Gesture {
                duration: self.duration,
            });
        }

        if pressed_now {
            self.duration = self.duration.saturating_add(1);
        }
        None
    }
}
