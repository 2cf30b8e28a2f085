//! Pick-up/place emulation for cursor-based inventory interaction.
//!
//! The host's native interaction model is a touch tap per slot; console
//! play needs the pick-up / carry / place cycle instead. This controller
//! owns that machine: the confirm press picks a stack onto the cursor,
//! places it, merges it, or swaps it; the siphon press peels single units
//! off a stack with hold-to-repeat. The host cursor item is the
//! authoritative mirror of the `Holding` state; external code may consume
//! or replace it at any time, so every tick starts by resynchronizing to
//! observed reality rather than trusting the machine's own belief.

pub mod sort;

use crate::adapter::{Cue, FeedbackPort, HoverTarget, InventoryPort, ItemStack, MenuPort};
use crate::input::{Edges, FrameSnapshot, LogicalButton};
use tracing::{debug, warn};

/// Ticks the siphon button must be held before repeat kicks in.
pub const SIPHON_INITIAL_DELAY_TICKS: u32 = 18;
/// Repeat cadence after the initial delay.
pub const SIPHON_REPEAT_INTERVAL_TICKS: u32 = 4;

/// What the cursor is carrying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeldItem {
    #[default]
    Empty,
    Holding {
        /// Slot the stack was lifted from, when it came from a slot at
        /// all; host collaborators can put items on the cursor directly.
        source: Option<usize>,
        stack: ItemStack,
    },
}

impl HeldItem {
    pub fn is_holding(&self) -> bool {
        matches!(self, HeldItem::Holding { .. })
    }
}

/// Hold-to-repeat bookkeeping for the siphon button. The repeat always
/// acts on the slot first pressed, not whatever is hovered later.
#[derive(Debug, Clone, Default)]
struct SiphonState {
    target: Option<usize>,
    held_ticks: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum HeldItemError {
    #[error("hovered slot {0} is out of range for capacity {1}")]
    SlotOutOfRange(usize, usize),
}

/// The pick-up/place state machine.
#[derive(Debug, Clone, Default)]
pub struct HeldItemController {
    state: HeldItem,
    siphon: SiphonState,
}

impl HeldItemController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HeldItem {
        &self.state
    }

    /// Brings the machine back in line with the host cursor.
    ///
    /// Returns true when drift was detected. The machine's belief is never
    /// preferred over observed host state.
    pub fn resynchronize<H>(&mut self, host: &H) -> bool
    where
        H: InventoryPort + ?Sized,
    {
        match (self.state.clone(), host.cursor()) {
            (HeldItem::Holding { source, .. }, None) => {
                warn!(
                    "cursor item vanished externally (source {:?}), resyncing to empty",
                    source
                );
                self.state = HeldItem::Empty;
                true
            }
            (HeldItem::Holding { source, stack }, Some(cursor)) if stack != cursor => {
                debug!("cursor stack replaced externally, adopting it");
                self.state = HeldItem::Holding {
                    source,
                    stack: cursor,
                };
                true
            }
            (HeldItem::Empty, Some(cursor)) => {
                debug!("cursor item appeared externally, adopting it");
                self.state = HeldItem::Holding {
                    source: None,
                    stack: cursor,
                };
                true
            }
            _ => false,
        }
    }

    /// One tick of held-item processing while an inventory menu is open.
    pub fn tick<H>(
        &mut self,
        frame: &FrameSnapshot,
        edges: &Edges,
        host: &mut H,
    ) -> Result<(), HeldItemError>
    where
        H: InventoryPort + MenuPort + FeedbackPort + ?Sized,
    {
        self.resynchronize(host);

        if edges.just_pressed(LogicalButton::A) {
            self.primary_action(host)?;
        }

        self.siphon_tick(frame, edges, host)?;
        Ok(())
    }

    /// Confirm press: pick, place, merge, swap, or delegate.
    fn primary_action<H>(&mut self, host: &mut H) -> Result<(), HeldItemError>
    where
        H: InventoryPort + MenuPort + FeedbackPort + ?Sized,
    {
        let Some(target) = host.hovered() else {
            return Ok(());
        };

        match target {
            HoverTarget::Component(_) => {
                // Equipment, trash, shop rows: the surrounding menu owns
                // that click, and it may consume or replace the held item
                // without telling us.
                host.forward_click(target);
                self.resynchronize(host);
                Ok(())
            }
            HoverTarget::Slot(index) => {
                let capacity = host.capacity();
                if index >= capacity {
                    return Err(HeldItemError::SlotOutOfRange(index, capacity));
                }
                match self.state.clone() {
                    HeldItem::Empty => self.pick_from(index, host),
                    HeldItem::Holding { source, stack } => {
                        self.place_at(index, source, stack, host)
                    }
                }
                Ok(())
            }
        }
    }

    fn pick_from<H>(&mut self, index: usize, host: &mut H)
    where
        H: InventoryPort + FeedbackPort + ?Sized,
    {
        let Some(stack) = host.slot(index) else {
            return;
        };
        // Source slot is cleared before the state becomes Holding.
        host.set_slot(index, None);
        host.set_cursor(Some(stack.clone()));
        self.state = HeldItem::Holding {
            source: Some(index),
            stack,
        };
        host.play_cue(Cue::Pick);
        debug!("picked stack from slot {}", index);
    }

    fn place_at<H>(
        &mut self,
        index: usize,
        source: Option<usize>,
        held: ItemStack,
        host: &mut H,
    ) where
        H: InventoryPort + FeedbackPort + ?Sized,
    {
        match host.slot(index) {
            None => {
                host.set_slot(index, Some(held));
                host.set_cursor(None);
                self.state = HeldItem::Empty;
                host.play_cue(Cue::Place);
                debug!("placed held stack into slot {}", index);
            }
            Some(mut existing) if existing.stacks_with(&held) => {
                let before = held.quantity;
                let remainder = existing.absorb(held);
                host.set_slot(index, Some(existing));
                match remainder {
                    None => {
                        host.set_cursor(None);
                        self.state = HeldItem::Empty;
                        host.play_cue(Cue::Place);
                    }
                    Some(rest) => {
                        if rest.quantity == before {
                            // Target was already full; nothing moved.
                            host.play_cue(Cue::Cancel);
                        } else {
                            host.play_cue(Cue::Place);
                        }
                        host.set_cursor(Some(rest.clone()));
                        self.state = HeldItem::Holding {
                            source,
                            stack: rest,
                        };
                    }
                }
            }
            Some(displaced) => {
                // Incompatible stack: trade places with the cursor.
                host.set_slot(index, Some(held));
                host.set_cursor(Some(displaced.clone()));
                self.state = HeldItem::Holding {
                    source: Some(index),
                    stack: displaced,
                };
                host.play_cue(Cue::Pick);
                debug!("swapped held stack with slot {}", index);
            }
        }
    }

    /// Siphon press and hold-to-repeat, polled every tick.
    fn siphon_tick<H>(
        &mut self,
        frame: &FrameSnapshot,
        edges: &Edges,
        host: &mut H,
    ) -> Result<(), HeldItemError>
    where
        H: InventoryPort + MenuPort + FeedbackPort + ?Sized,
    {
        if !frame.is_down(LogicalButton::Y) {
            // Released: counters reset the instant the button comes up.
            self.siphon = SiphonState::default();
            return Ok(());
        }

        if edges.just_pressed(LogicalButton::Y) {
            let Some(HoverTarget::Slot(index)) = host.hovered() else {
                return Ok(());
            };
            let capacity = host.capacity();
            if index >= capacity {
                return Err(HeldItemError::SlotOutOfRange(index, capacity));
            }
            // A new press targets the newly hovered slot.
            self.siphon = SiphonState {
                target: Some(index),
                held_ticks: 0,
            };
            self.siphon_step(index, host);
            return Ok(());
        }

        let Some(index) = self.siphon.target else {
            return Ok(());
        };
        self.siphon.held_ticks += 1;
        let past_delay = self.siphon.held_ticks >= SIPHON_INITIAL_DELAY_TICKS;
        if past_delay
            && (self.siphon.held_ticks - SIPHON_INITIAL_DELAY_TICKS)
                % SIPHON_REPEAT_INTERVAL_TICKS
                == 0
        {
            self.siphon_step(index, host);
        }
        Ok(())
    }

    /// Moves exactly one unit from `index` to the cursor.
    fn siphon_step<H>(&mut self, index: usize, host: &mut H)
    where
        H: InventoryPort + FeedbackPort + ?Sized,
    {
        let Some(mut source) = host.slot(index) else {
            return;
        };
        if source.quantity <= 1 {
            return;
        }

        match self.state.clone() {
            HeldItem::Empty => {
                let unit = match source.split_one() {
                    Some(unit) => unit,
                    None => return,
                };
                host.set_slot(index, Some(source));
                host.set_cursor(Some(unit.clone()));
                self.state = HeldItem::Holding {
                    source: Some(index),
                    stack: unit,
                };
                host.play_cue(Cue::Pick);
            }
            HeldItem::Holding {
                source: held_source,
                mut stack,
            } => {
                if !stack.stacks_with(&source) || stack.space_left() == 0 {
                    host.play_cue(Cue::Cancel);
                    return;
                }
                let Some(unit) = source.split_one() else {
                    return;
                };
                stack.quantity += unit.quantity;
                host.set_slot(index, Some(source));
                host.set_cursor(Some(stack.clone()));
                self.state = HeldItem::Holding {
                    source: held_source,
                    stack,
                };
            }
        }
    }

    /// Menu-close / fault cleanup.
    ///
    /// Any non-empty state is resolved through a strict fallback chain:
    /// back into the source slot if still empty, else into any free slot,
    /// else dropped into the world. Never skipped, never reordered.
    pub fn resolve_cancellation<H>(&mut self, host: &mut H)
    where
        H: InventoryPort + ?Sized,
    {
        self.resynchronize(host);
        self.siphon = SiphonState::default();

        let HeldItem::Holding { source, stack } = std::mem::take(&mut self.state) else {
            return;
        };
        host.set_cursor(None);

        if let Some(slot) = source {
            if slot < host.capacity() && host.slot(slot).is_none() {
                debug!("returned held stack to source slot {}", slot);
                host.set_slot(slot, Some(stack));
                return;
            }
        }
        if let Some(free) = host.first_free_slot() {
            debug!("stowed held stack into free slot {}", free);
            host.set_slot(free, Some(stack));
            return;
        }
        warn!("inventory full, dropping held stack into the world");
        host.drop_into_world(stack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MenuKind;
    use crate::sim::SimHost;

    fn edges_for(pressed: &[LogicalButton]) -> (FrameSnapshot, Edges) {
        let previous = FrameSnapshot::empty(0);
        let mut current = FrameSnapshot::empty(1);
        for &b in pressed {
            current.set_down(b, true);
        }
        (current, Edges::between(&previous, &current))
    }

    fn held_frame(down: &[LogicalButton]) -> (FrameSnapshot, Edges) {
        let mut previous = FrameSnapshot::empty(0);
        let mut current = FrameSnapshot::empty(1);
        for &b in down {
            previous.set_down(b, true);
            current.set_down(b, true);
        }
        (current, Edges::between(&previous, &current))
    }

    fn total_items(host: &SimHost) -> u32 {
        let mut total = 0;
        for i in 0..host.capacity() {
            if let Some(stack) = host.slot(i) {
                total += stack.quantity;
            }
        }
        if let Some(cursor) = host.cursor() {
            total += cursor.quantity;
        }
        total
    }

    fn press_a_on(slot: usize, controller: &mut HeldItemController, host: &mut SimHost) {
        host.hover_slot(slot);
        let (frame, edges) = edges_for(&[LogicalButton::A]);
        controller.tick(&frame, &edges, host).unwrap();
    }

    #[test]
    fn pick_then_place_moves_the_stack() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("parsnip", 5, 99));
        let mut controller = HeldItemController::new();

        press_a_on(0, &mut controller, &mut host);
        assert!(controller.state().is_holding());
        assert!(host.slot(0).is_none());
        assert_eq!(host.cursor().unwrap().quantity, 5);

        press_a_on(3, &mut controller, &mut host);
        assert_eq!(*controller.state(), HeldItem::Empty);
        assert_eq!(host.slot(3).unwrap().quantity, 5);
        assert!(host.slot(0).is_none());
        assert!(host.cursor().is_none());
    }

    #[test]
    fn merge_keeps_remainder_on_cursor() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("wood", 40, 99));
        host.put_slot(1, ItemStack::new("wood", 90, 99));
        let mut controller = HeldItemController::new();

        press_a_on(0, &mut controller, &mut host);
        press_a_on(1, &mut controller, &mut host);

        assert_eq!(host.slot(1).unwrap().quantity, 99);
        match controller.state() {
            HeldItem::Holding { stack, .. } => assert_eq!(stack.quantity, 31),
            HeldItem::Empty => panic!("remainder should stay held"),
        }
        assert_eq!(host.cursor().unwrap().quantity, 31);
    }

    #[test]
    fn incompatible_slot_swaps_with_cursor() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("wood", 10, 99));
        host.put_slot(1, ItemStack::new("stone", 7, 99));
        let mut controller = HeldItemController::new();

        press_a_on(0, &mut controller, &mut host);
        press_a_on(1, &mut controller, &mut host);

        assert_eq!(host.slot(1).unwrap().kind, "wood");
        match controller.state() {
            HeldItem::Holding { stack, source } => {
                assert_eq!(stack.kind, "stone");
                assert_eq!(*source, Some(1));
            }
            HeldItem::Empty => panic!("swap must keep holding"),
        }
    }

    #[test]
    fn siphon_takes_single_units_and_repeats_on_the_original_slot() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(2, ItemStack::new("coal", 3, 99));
        let mut controller = HeldItemController::new();

        host.hover_slot(2);
        let (frame, edges) = edges_for(&[LogicalButton::Y]);
        controller.tick(&frame, &edges, &mut host).unwrap();

        assert_eq!(host.slot(2).unwrap().quantity, 2);
        assert_eq!(host.cursor().unwrap().quantity, 1);

        // Hover moves away, but the held repeat stays on slot 2.
        host.hover_slot(5);
        let (frame, edges) = held_frame(&[LogicalButton::Y]);
        for _ in 0..SIPHON_INITIAL_DELAY_TICKS {
            controller.tick(&frame, &edges, &mut host).unwrap();
        }
        // One repeat fired after the delay: 2 -> 1 (and 1 never drops to 0).
        assert_eq!(host.slot(2).unwrap().quantity, 1);
        assert_eq!(host.cursor().unwrap().quantity, 2);
    }

    #[test]
    fn siphon_release_and_repress_targets_the_new_slot() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("coal", 3, 99));
        host.put_slot(4, ItemStack::new("coal", 5, 99));
        let mut controller = HeldItemController::new();

        host.hover_slot(0);
        let (frame, edges) = edges_for(&[LogicalButton::Y]);
        controller.tick(&frame, &edges, &mut host).unwrap();
        assert_eq!(host.slot(0).unwrap().quantity, 2);

        // Release resets the counters and the bound slot.
        let (frame, edges) = edges_for(&[]);
        controller.tick(&frame, &edges, &mut host).unwrap();

        host.hover_slot(4);
        let (frame, edges) = edges_for(&[LogicalButton::Y]);
        controller.tick(&frame, &edges, &mut host).unwrap();
        assert_eq!(host.slot(4).unwrap().quantity, 4);
        assert_eq!(host.slot(0).unwrap().quantity, 2);
        assert_eq!(host.cursor().unwrap().quantity, 2);
    }

    #[test]
    fn siphon_ignores_singleton_stacks() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("sword", 1, 1));
        let mut controller = HeldItemController::new();

        host.hover_slot(0);
        let (frame, edges) = edges_for(&[LogicalButton::Y]);
        controller.tick(&frame, &edges, &mut host).unwrap();

        assert_eq!(host.slot(0).unwrap().quantity, 1);
        assert!(host.cursor().is_none());
        assert_eq!(*controller.state(), HeldItem::Empty);
    }

    #[test]
    fn item_count_is_conserved_across_interactions() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("wood", 40, 99));
        host.put_slot(1, ItemStack::new("wood", 90, 99));
        host.put_slot(2, ItemStack::new("stone", 12, 99));
        let before = total_items(&host);
        let mut controller = HeldItemController::new();

        for &slot in &[0usize, 1, 2, 5, 2, 0, 1] {
            press_a_on(slot, &mut controller, &mut host);
            assert_eq!(total_items(&host), before);
        }

        host.hover_slot(2);
        let (frame, edges) = edges_for(&[LogicalButton::Y]);
        controller.tick(&frame, &edges, &mut host).unwrap();
        assert_eq!(total_items(&host), before);

        controller.resolve_cancellation(&mut host);
        assert_eq!(total_items(&host), before);
    }

    #[test]
    fn vanished_cursor_resyncs_to_empty() {
        let mut host = SimHost::with_capacity(36);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("wood", 10, 99));
        let mut controller = HeldItemController::new();

        press_a_on(0, &mut controller, &mut host);
        assert!(controller.state().is_holding());

        // Unrelated host logic consumes the cursor item.
        host.set_cursor(None);
        let (frame, edges) = edges_for(&[]);
        controller.tick(&frame, &edges, &mut host).unwrap();
        assert_eq!(*controller.state(), HeldItem::Empty);
    }

    #[test]
    fn cancellation_prefers_source_then_free_then_world() {
        let mut host = SimHost::with_capacity(12);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("wood", 10, 99));
        let mut controller = HeldItemController::new();

        // (a) source still empty: stack goes home.
        press_a_on(0, &mut controller, &mut host);
        controller.resolve_cancellation(&mut host);
        assert_eq!(host.slot(0).unwrap().quantity, 10);

        // (b) source occupied: stack goes to the first free slot.
        press_a_on(0, &mut controller, &mut host);
        host.put_slot(0, ItemStack::new("stone", 1, 99));
        controller.resolve_cancellation(&mut host);
        assert_eq!(host.slot(1).unwrap().kind, "wood");

        // (c) nothing free anywhere: the world catches it.
        press_a_on(1, &mut controller, &mut host);
        for i in 0..host.capacity() {
            if host.slot(i).is_none() {
                host.put_slot(i, ItemStack::new("filler", 1, 99));
            }
        }
        controller.resolve_cancellation(&mut host);
        assert_eq!(host.world_drops().len(), 1);
        assert_eq!(host.world_drops()[0].kind, "wood");
    }

    #[test]
    fn delegated_click_resynchronizes_afterwards() {
        let mut host = SimHost::with_capacity(12);
        host.open_menu(MenuKind::Inventory);
        host.put_slot(0, ItemStack::new("wood", 10, 99));
        let mut controller = HeldItemController::new();

        press_a_on(0, &mut controller, &mut host);

        // The trash component consumes whatever the cursor holds.
        host.hover_trash();
        let (frame, edges) = edges_for(&[LogicalButton::A]);
        controller.tick(&frame, &edges, &mut host).unwrap();
        assert_eq!(*controller.state(), HeldItem::Empty);
    }
}
