//! # Host Adapter Boundary
//!
//! ## Why This Module Exists
//! The interaction machines must read and write host state (controller
//! polls, the active toolbar index, inventory slots, the cursor item, menu
//! component graphs) without knowing how the host lays any of it out. These
//! traits are the one place that understands host internals; everything
//! behind them is plain state-machine code that can be driven by the real
//! host or by the in-memory rig.
//!
//! ## Contract
//! Every port call is synchronous and completes within the tick. The host
//! calls the session entry points exactly once per event (one `tick` per
//! frame, one `on_menu_opened`/`on_menu_closed` per lifecycle change, one
//! `on_index_write` per foreign write to the active index); the ports here
//! are how the session answers back.

pub mod items;

pub use items::ItemStack;

use crate::input::RawSnapshot;
use crate::nav::{ComponentId, MenuGraph, SwatchWidget};

/// Per-tick raw controller poll.
pub trait InputPort {
    fn poll(&mut self) -> RawSnapshot;
}

/// The host's mutable "active toolbar index".
///
/// Writable by both this system and the host's own logic, which hard-codes
/// a 0..=9 range; the toolbar controller intercepts and corrects foreign
/// writes through [`crate::session::PadSession::on_index_write`].
pub trait ToolbarPort {
    fn active_index(&self) -> i32;
    fn set_active_index(&mut self, index: i32);
}

/// Fixed-size inventory slots plus the cursor item.
pub trait InventoryPort {
    fn capacity(&self) -> usize;
    fn slot(&self, index: usize) -> Option<ItemStack>;
    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>);
    fn cursor(&self) -> Option<ItemStack>;
    fn set_cursor(&mut self, stack: Option<ItemStack>);

    /// Lowest empty slot, if any.
    fn first_free_slot(&self) -> Option<usize> {
        (0..self.capacity()).find(|&i| self.slot(i).is_none())
    }

    /// Last-resort disposal: the item leaves the inventory system entirely.
    fn drop_into_world(&mut self, stack: ItemStack);
}

/// The small set of menu kinds this system interacts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Inventory,
    Shop,
    ItemGrab,
    Customization,
    Other,
}

/// What the discrete cursor currently rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// A backpack inventory slot.
    Slot(usize),
    /// Anything else: equipment, trash, sidebar actions. Clicks on these
    /// are delegated back to the host.
    Component(ComponentId),
}

/// Feedback cues for business-rule refusals and interaction noises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Cancel,
    Pick,
    Place,
}

/// Menu lifecycle state and the per-menu component graph.
pub trait MenuPort {
    fn current_menu(&self) -> Option<MenuKind>;

    /// The open menu's component graph. `None` when no menu is open or the
    /// host has not built one for this menu kind.
    fn nav_graph(&mut self) -> Option<&mut MenuGraph>;

    fn hovered(&self) -> Option<HoverTarget>;

    /// Delegates a click to the host's own handling (equipment, trash,
    /// shop rows). The held-item machine resynchronizes afterwards.
    fn forward_click(&mut self, target: HoverTarget);

    fn close_menu(&mut self);

    /// Geometry of the currently visible color-picker widget, if any.
    /// Direct query; cell rects are derived from it rather than probed.
    fn swatch_widget(&self) -> Option<SwatchWidget>;

    /// Shows or hides the picker widget. Special-cased activation goes
    /// through here because the toggle's visual state does not update
    /// from a simulated click.
    fn set_swatch_visible(&mut self, visible: bool);
}

pub trait FeedbackPort {
    fn play_cue(&mut self, cue: Cue);
}

/// Everything a tick needs from the host, bundled for the session.
pub trait HostPortal: ToolbarPort + InventoryPort + MenuPort + FeedbackPort {}

impl<T: ToolbarPort + InventoryPort + MenuPort + FeedbackPort> HostPortal for T {}
