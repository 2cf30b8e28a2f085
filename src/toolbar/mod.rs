//! Toolbar row correction.
//!
//! The host models the active toolbar slot as a single integer it cycles
//! through 0..=9, while the actual toolbar row holds twelve slots and the
//! inventory holds several rows. This controller owns the row, turns
//! shoulder/trigger (or d-pad, on pads without readable analog triggers)
//! presses into row switches and slot moves, and intercepts the host's own
//! writes to the index so every tick ends with the index inside the active
//! row. Corrections are silent; there is no user-visible failure mode.

use crate::adapter::{InventoryPort, ToolbarPort};
use crate::input::{Edges, LogicalButton};
use tracing::{debug, trace};

/// Slots in one toolbar row.
pub const SLOTS_PER_ROW: i32 = 12;

/// Highest index the host's built-in cycling will produce.
const HOST_NATIVE_MAX: i32 = 9;

/// Owns the active row and corrects every index write against it.
#[derive(Debug, Clone, Default)]
pub struct ToolbarRowController {
    current_row: i32,
    /// Last index this controller settled on, for recognizing the host's
    /// native wrap patterns.
    last_index: i32,
}

impl ToolbarRowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_row(&self) -> i32 {
        self.current_row
    }

    pub fn row_start(&self) -> i32 {
        self.current_row * SLOTS_PER_ROW
    }

    fn total_rows<H: InventoryPort + ?Sized>(host: &H) -> i32 {
        (host.capacity() as i32 / SLOTS_PER_ROW).max(1)
    }

    /// Consumes this tick's row-switch and slot-move edges.
    ///
    /// Default bindings: shoulders switch rows, analog triggers move the
    /// slot. With `alternate_triggers` the shoulders move the slot and
    /// d-pad up/down switches rows instead.
    pub fn handle_input<H>(&mut self, edges: &Edges, alternate_triggers: bool, host: &mut H)
    where
        H: ToolbarPort + InventoryPort + ?Sized,
    {
        let (row_next, row_prev, slot_next, slot_prev) = if alternate_triggers {
            (
                LogicalButton::DPadDown,
                LogicalButton::DPadUp,
                LogicalButton::RightBumper,
                LogicalButton::LeftBumper,
            )
        } else {
            (
                LogicalButton::RightBumper,
                LogicalButton::LeftBumper,
                LogicalButton::RightTrigger,
                LogicalButton::LeftTrigger,
            )
        };

        if edges.just_pressed(row_next) {
            self.switch_row(1, host);
        } else if edges.just_pressed(row_prev) {
            self.switch_row(-1, host);
        }

        if edges.just_pressed(slot_next) {
            self.move_slot(1, host);
        } else if edges.just_pressed(slot_prev) {
            self.move_slot(-1, host);
        }
    }

    /// Row change wraps across all rows; position within the row is kept.
    fn switch_row<H>(&mut self, delta: i32, host: &mut H)
    where
        H: ToolbarPort + InventoryPort + ?Sized,
    {
        let total = Self::total_rows(host);
        let position = (host.active_index() - self.row_start()).rem_euclid(SLOTS_PER_ROW);
        self.current_row = (self.current_row + delta).rem_euclid(total);
        let index = self.row_start() + position;
        debug!("row switch to {} (index {})", self.current_row, index);
        host.set_active_index(index);
        self.last_index = index;
    }

    /// Slot move wraps within the current row.
    fn move_slot<H>(&mut self, delta: i32, host: &mut H)
    where
        H: ToolbarPort + InventoryPort + ?Sized,
    {
        let position = (host.active_index() - self.row_start()).rem_euclid(SLOTS_PER_ROW);
        let index = self.row_start() + (position + delta).rem_euclid(SLOTS_PER_ROW);
        trace!("slot move to index {}", index);
        host.set_active_index(index);
        self.last_index = index;
    }

    /// Intercepts a host-driven write to the active index.
    ///
    /// The host believes the index lives in 0..=9: negatives wrap to the
    /// row's last slot, 0..=9 on a non-zero row means "same position, this
    /// row", and on row 0 the native 9→0 / 0→9 cycling wraps are widened
    /// to use all twelve slots.
    pub fn intercept_write<H>(&mut self, value: i32, host: &mut H)
    where
        H: ToolbarPort + InventoryPort + ?Sized,
    {
        let row_start = self.row_start();
        let corrected = if value < 0 {
            row_start + SLOTS_PER_ROW - 1
        } else if self.current_row > 0 && value <= HOST_NATIVE_MAX {
            row_start + value
        } else if self.current_row == 0 && value == 0 && self.last_index == HOST_NATIVE_MAX {
            // Native scroll past slot 9 should land on slot 10.
            HOST_NATIVE_MAX + 1
        } else if self.current_row == 0 && value == HOST_NATIVE_MAX && self.last_index == 0 {
            // Native scroll back from slot 0 should land on slot 11.
            SLOTS_PER_ROW - 1
        } else {
            value
        };

        if corrected != value {
            debug!("host index write {} corrected to {}", value, corrected);
        }
        host.set_active_index(corrected);
        self.last_index = corrected;
    }

    /// End-of-tick safety net: whatever happened this tick, the index ends
    /// inside the active row.
    pub fn enforce_invariant<H>(&mut self, host: &mut H)
    where
        H: ToolbarPort + InventoryPort + ?Sized,
    {
        let index = host.active_index();
        let row_start = self.row_start();
        if index < row_start || index >= row_start + SLOTS_PER_ROW {
            let corrected = row_start + index.rem_euclid(SLOTS_PER_ROW);
            debug!("index {} outside row {}, corrected to {}", index, self.current_row, corrected);
            host.set_active_index(corrected);
            self.last_index = corrected;
        } else {
            self.last_index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::snapshot::FrameSnapshot;
    use crate::sim::SimHost;

    fn edges_for(pressed: &[LogicalButton]) -> Edges {
        let previous = FrameSnapshot::empty(0);
        let mut current = FrameSnapshot::empty(1);
        for &b in pressed {
            current.set_down(b, true);
        }
        Edges::between(&previous, &current)
    }

    fn host() -> SimHost {
        // 36 slots: three rows of twelve.
        SimHost::with_capacity(36)
    }

    #[test]
    fn row_switch_wraps_and_keeps_position() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();
        host.set_active_index(5);

        toolbar.handle_input(&edges_for(&[LogicalButton::RightBumper]), false, &mut host);
        assert_eq!(toolbar.current_row(), 1);
        assert_eq!(host.active_index(), 17);

        toolbar.handle_input(&edges_for(&[LogicalButton::RightBumper]), false, &mut host);
        toolbar.handle_input(&edges_for(&[LogicalButton::RightBumper]), false, &mut host);
        assert_eq!(toolbar.current_row(), 0);
        assert_eq!(host.active_index(), 5);

        toolbar.handle_input(&edges_for(&[LogicalButton::LeftBumper]), false, &mut host);
        assert_eq!(toolbar.current_row(), 2);
        assert_eq!(host.active_index(), 29);
    }

    #[test]
    fn slot_move_wraps_within_the_row() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();
        host.set_active_index(11);

        toolbar.handle_input(&edges_for(&[LogicalButton::RightTrigger]), false, &mut host);
        assert_eq!(host.active_index(), 0);

        toolbar.handle_input(&edges_for(&[LogicalButton::LeftTrigger]), false, &mut host);
        assert_eq!(host.active_index(), 11);
    }

    #[test]
    fn alternate_mode_rebinds_row_and_slot() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();
        host.set_active_index(0);

        toolbar.handle_input(&edges_for(&[LogicalButton::DPadDown]), true, &mut host);
        assert_eq!(toolbar.current_row(), 1);

        toolbar.handle_input(&edges_for(&[LogicalButton::RightBumper]), true, &mut host);
        assert_eq!(host.active_index(), 13);

        // Analog trigger presses do nothing in alternate mode.
        toolbar.handle_input(&edges_for(&[LogicalButton::RightTrigger]), true, &mut host);
        assert_eq!(host.active_index(), 13);
    }

    #[test]
    fn native_forward_wrap_is_widened_to_slot_ten() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();
        host.set_active_index(9);
        toolbar.enforce_invariant(&mut host);

        // Host cycles 9 -> 0; the controller widens it to slot 10.
        toolbar.intercept_write(0, &mut host);
        assert_eq!(host.active_index(), 10);
    }

    #[test]
    fn native_backward_wrap_is_widened_to_slot_eleven() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();
        host.set_active_index(0);
        toolbar.enforce_invariant(&mut host);

        toolbar.intercept_write(9, &mut host);
        assert_eq!(host.active_index(), 11);
    }

    #[test]
    fn negative_write_wraps_to_row_end() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();

        toolbar.intercept_write(-1, &mut host);
        assert_eq!(host.active_index(), 11);

        // Same on a non-zero row.
        toolbar.handle_input(&edges_for(&[LogicalButton::RightBumper]), false, &mut host);
        toolbar.intercept_write(-1, &mut host);
        assert_eq!(host.active_index(), 23);
    }

    #[test]
    fn native_range_write_is_lifted_onto_the_active_row() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();
        toolbar.handle_input(&edges_for(&[LogicalButton::RightBumper]), false, &mut host);
        assert_eq!(toolbar.current_row(), 1);

        toolbar.intercept_write(4, &mut host);
        assert_eq!(host.active_index(), 16);
    }

    #[test]
    fn invariant_holds_after_arbitrary_sequences() {
        let mut host = host();
        let mut toolbar = ToolbarRowController::new();

        let script: &[&[LogicalButton]] = &[
            &[LogicalButton::RightBumper],
            &[LogicalButton::RightTrigger],
            &[LogicalButton::LeftBumper, LogicalButton::LeftTrigger],
            &[LogicalButton::RightBumper],
            &[],
        ];
        let writes = [-3, 0, 9, 25, 7, 11, 40];

        for (step, pressed) in script.iter().enumerate() {
            toolbar.handle_input(&edges_for(pressed), false, &mut host);
            toolbar.intercept_write(writes[step % writes.len()], &mut host);
            toolbar.enforce_invariant(&mut host);

            let index = host.active_index();
            assert!(
                index >= toolbar.row_start() && index < toolbar.row_start() + SLOTS_PER_ROW,
                "index {} escaped row {} at step {}",
                index,
                toolbar.current_row(),
                step
            );
        }
    }
}
