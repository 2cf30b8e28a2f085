//! Minimal item model the interaction machines operate on.

use serde::{Deserialize, Serialize};

/// A stack of identical items as the host inventory stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item identity; stacks only combine across equal kinds.
    pub kind: String,
    pub quantity: u32,
    pub max_stack: u32,
}

impl ItemStack {
    pub fn new(kind: impl Into<String>, quantity: u32, max_stack: u32) -> Self {
        Self {
            kind: kind.into(),
            quantity,
            max_stack,
        }
    }

    /// Whether `other` can merge into this stack.
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.kind == other.kind && self.max_stack == other.max_stack && self.max_stack > 1
    }

    pub fn space_left(&self) -> u32 {
        self.max_stack.saturating_sub(self.quantity)
    }

    /// Merges as much of `other` as fits. Returns the remainder, or `None`
    /// if `other` was fully absorbed.
    pub fn absorb(&mut self, mut other: ItemStack) -> Option<ItemStack> {
        debug_assert!(self.stacks_with(&other));
        let moved = other.quantity.min(self.space_left());
        self.quantity += moved;
        other.quantity -= moved;
        if other.quantity == 0 {
            None
        } else {
            Some(other)
        }
    }

    /// Takes a single unit off this stack. Returns `None` once empty.
    pub fn split_one(&mut self) -> Option<ItemStack> {
        if self.quantity == 0 {
            return None;
        }
        self.quantity -= 1;
        Some(ItemStack {
            kind: self.kind.clone(),
            quantity: 1,
            max_stack: self.max_stack,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}
