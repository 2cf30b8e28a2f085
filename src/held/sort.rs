//! Flag-gated inventory sort.
//!
//! Merges compatible stacks, then orders the inventory by item kind with
//! empty slots pushed to the back. Refuses to run while the cursor holds
//! an item: the held-item machine exclusively owns the slot data in that
//! state.

use crate::adapter::{InventoryPort, ItemStack};
use crate::held::HeldItem;
use tracing::debug;

/// Sorts the inventory in place. Returns false (and does nothing) while
/// an item is held.
pub fn sort_inventory<H>(held: &HeldItem, host: &mut H) -> bool
where
    H: InventoryPort + ?Sized,
{
    if held.is_holding() {
        debug!("sort refused while an item is held");
        return false;
    }

    let capacity = host.capacity();
    let mut stacks: Vec<ItemStack> = Vec::new();
    for i in 0..capacity {
        let Some(incoming) = host.slot(i) else {
            continue;
        };
        merge_into(&mut stacks, incoming);
    }

    stacks.sort_by(|a, b| a.kind.cmp(&b.kind));

    for i in 0..capacity {
        host.set_slot(i, stacks.get(i).cloned());
    }
    debug!("inventory sorted into {} stacks", stacks.len());
    true
}

/// Merges `incoming` into earlier compatible stacks with room; whatever
/// does not fit is appended.
fn merge_into(stacks: &mut Vec<ItemStack>, incoming: ItemStack) {
    let mut rest = Some(incoming);
    for stack in stacks.iter_mut() {
        let Some(current) = rest.take() else {
            break;
        };
        if stack.stacks_with(&current) && stack.space_left() > 0 {
            rest = stack.absorb(current);
        } else {
            rest = Some(current);
        }
    }
    if let Some(leftover) = rest {
        stacks.push(leftover);
    }
}
