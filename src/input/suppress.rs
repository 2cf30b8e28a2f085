//! Suppress-until-release filtering for logical buttons.
//!
//! Once a logical press has been fully consumed by a state-machine
//! transition, the same physical press must not be interpreted a second
//! time by another consumer, nor by the world once a menu closes. Arming a
//! flag hides the button's "pressed" state from every emitted snapshot
//! until the physical source is observed released; the flag then clears
//! permanently and the next press reads normally.

use crate::input::LogicalButton;
use tracing::debug;

/// One-shot per-button suppression flags.
#[derive(Debug, Clone, Default)]
pub struct SuppressionTracker {
    armed: [bool; LogicalButton::COUNT],
}

impl SuppressionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms suppression for `button`. The button reads "not pressed" until
    /// it is observed physically released at least once.
    pub fn suppress_until_release(&mut self, button: LogicalButton) {
        if !self.armed[button.slot()] {
            debug!("suppressing {:?} until release", button);
        }
        self.armed[button.slot()] = true;
    }

    pub fn is_armed(&self, button: LogicalButton) -> bool {
        self.armed[button.slot()]
    }

    /// Filters one tick's unsuppressed logical downs in place.
    ///
    /// For every armed flag: a button still held is forced to "not
    /// pressed"; a button observed up clears its flag for good. Must be
    /// called exactly once per emitted snapshot so release observation
    /// stays in lockstep with what consumers saw.
    pub fn filter(&mut self, down: &mut [bool; LogicalButton::COUNT]) {
        for button in LogicalButton::ALL {
            let slot = button.slot();
            if !self.armed[slot] {
                continue;
            }
            if down[slot] {
                down[slot] = false;
            } else {
                debug!("{:?} released, suppression cleared", button);
                self.armed[slot] = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downs(pressed: &[LogicalButton]) -> [bool; LogicalButton::COUNT] {
        let mut down = [false; LogicalButton::COUNT];
        for b in pressed {
            down[b.slot()] = true;
        }
        down
    }

    #[test]
    fn armed_button_reads_unpressed_while_held() {
        let mut tracker = SuppressionTracker::new();
        tracker.suppress_until_release(LogicalButton::A);

        for _ in 0..5 {
            let mut down = downs(&[LogicalButton::A]);
            tracker.filter(&mut down);
            assert!(!down[LogicalButton::A.slot()]);
            assert!(tracker.is_armed(LogicalButton::A));
        }
    }

    #[test]
    fn release_clears_the_flag_permanently() {
        let mut tracker = SuppressionTracker::new();
        tracker.suppress_until_release(LogicalButton::A);

        // Held for two ticks, suppressed both.
        for _ in 0..2 {
            let mut down = downs(&[LogicalButton::A]);
            tracker.filter(&mut down);
            assert!(!down[LogicalButton::A.slot()]);
        }

        // Observed up once: flag clears.
        let mut down = downs(&[]);
        tracker.filter(&mut down);
        assert!(!tracker.is_armed(LogicalButton::A));

        // Re-press reads normally, the flag does not re-arm.
        let mut down = downs(&[LogicalButton::A]);
        tracker.filter(&mut down);
        assert!(down[LogicalButton::A.slot()]);
    }

    #[test]
    fn unrelated_buttons_pass_through() {
        let mut tracker = SuppressionTracker::new();
        tracker.suppress_until_release(LogicalButton::A);

        let mut down = downs(&[LogicalButton::A, LogicalButton::Y]);
        tracker.filter(&mut down);
        assert!(!down[LogicalButton::A.slot()]);
        assert!(down[LogicalButton::Y.slot()]);
    }
}
