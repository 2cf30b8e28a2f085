//! In-memory host rig.
//!
//! Implements the adapter ports over a small inventory/menu model so the
//! session can be driven without the real host: interactively from the
//! binary, and as the shared fixture for the test suite. Menus are built
//! with the same defects the repairer exists to fix (colliding ids,
//! unregistered sidebar actions, flat-row picker cells).

use crate::adapter::{
    Cue, FeedbackPort, HoverTarget, InputPort, InventoryPort, ItemStack, MenuKind, MenuPort,
    ToolbarPort,
};
use crate::input::RawSnapshot;
use crate::nav::{
    ComponentId, ComponentRole, GridRegion, MenuGraph, NavComponent, Rect, SwatchWidget,
};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Columns in the rig's inventory grids.
const GRID_COLUMNS: usize = 12;
/// Pixel pitch between generated grid cells.
const CELL_SIZE: i32 = 64;

/// An in-memory stand-in for the host application.
#[derive(Debug)]
pub struct SimHost {
    slots: Vec<Option<ItemStack>>,
    cursor: Option<ItemStack>,
    active_index: i32,
    menu: Option<MenuKind>,
    graph: Option<MenuGraph>,
    hovered: Option<HoverTarget>,
    trash_id: ComponentId,
    swatch_visible: bool,
    world_drops: Vec<ItemStack>,
    cues: Vec<Cue>,
}

impl SimHost {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            cursor: None,
            active_index: 0,
            menu: None,
            graph: None,
            hovered: None,
            trash_id: ComponentId(-1),
            swatch_visible: false,
            world_drops: Vec::new(),
            cues: Vec::new(),
        }
    }

    pub fn put_slot(&mut self, index: usize, stack: ItemStack) {
        self.slots[index] = Some(stack);
    }

    pub fn hover_slot(&mut self, index: usize) {
        self.hovered = Some(HoverTarget::Slot(index));
    }

    pub fn hover_component(&mut self, id: ComponentId) {
        self.hovered = Some(HoverTarget::Component(id));
    }

    pub fn hover_trash(&mut self) {
        self.hovered = Some(HoverTarget::Component(self.trash_id));
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn world_drops(&self) -> &[ItemStack] {
        &self.world_drops
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn menu_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Opens a menu and generates its (deliberately defective) graph.
    pub fn open_menu(&mut self, kind: MenuKind) {
        info!("rig: opening {:?} menu", kind);
        self.menu = Some(kind);
        self.graph = Some(match kind {
            MenuKind::Customization => self.build_customization_graph(),
            _ => self.build_inventory_graph(),
        });
    }

    /// Inventory-style menu: an item grid per inventory row, plus an
    /// independently generated sidebar whose ids restart at zero and
    /// never reach the master list.
    fn build_inventory_graph(&mut self) -> MenuGraph {
        let mut graph = MenuGraph::new();
        let rows = self.slots.len() / GRID_COLUMNS;
        let mut cells = Vec::new();
        for row in 0..rows {
            for col in 0..GRID_COLUMNS {
                let index = graph.add_component(NavComponent::new(
                    ComponentId((row * GRID_COLUMNS + col) as i32),
                    format!("slot-{}", row * GRID_COLUMNS + col),
                    Rect::new(
                        col as i32 * CELL_SIZE,
                        row as i32 * CELL_SIZE,
                        CELL_SIZE,
                        CELL_SIZE,
                    ),
                ));
                cells.push(index);
            }
        }
        graph.add_grid(GridRegion {
            cells,
            columns: GRID_COLUMNS,
        });

        // The sidebar generator restarts its id counter at zero.
        let close = graph.add_unregistered(
            NavComponent::new(
                ComponentId(0),
                "close",
                Rect::new(GRID_COLUMNS as i32 * CELL_SIZE + 16, 0, 48, 48),
            )
            .with_role(ComponentRole::CloseButton),
        );
        let trash = graph.add_unregistered(NavComponent::new(
            ComponentId(1),
            "trash",
            Rect::new(GRID_COLUMNS as i32 * CELL_SIZE + 16, 96, 48, 48),
        ));
        graph.mark_sidebar(close);
        graph.mark_sidebar(trash);

        // The trash can's repaired id is only known after the pass runs;
        // until then clicks resolve against the generator's id.
        self.trash_id = ComponentId(1);
        graph
    }

    /// Character-customization menu: a swatch toggle plus picker cells the
    /// generator stamped into one flat row.
    fn build_customization_graph(&mut self) -> MenuGraph {
        let mut graph = MenuGraph::new();
        graph.add_component(
            NavComponent::new(ComponentId(0), "eye-color", Rect::new(0, 0, 48, 48))
                .with_role(ComponentRole::SwatchToggle),
        );
        for i in 0..SWATCH_COLUMNS * SWATCH_ROWS {
            let index = graph.add_component(NavComponent::new(
                ComponentId(100 + i as i32),
                format!("swatch-{}", i),
                Rect::new(0, 64, 16, 16),
            ));
            graph.mark_swatch_cell(index);
        }
        let close = graph.add_unregistered(
            NavComponent::new(ComponentId(0), "close", Rect::new(400, 0, 48, 48))
                .with_role(ComponentRole::CloseButton),
        );
        graph.mark_sidebar(close);
        graph
    }

    /// Refreshes the trash component id after the repairer reassigned it.
    pub fn adopt_repaired_ids(&mut self) {
        if let Some(graph) = &self.graph {
            for i in 0..graph.len() {
                if let Some(component) = graph.component(i) {
                    if component.name == "trash" {
                        self.trash_id = component.id;
                    }
                }
            }
        }
    }
}

const SWATCH_COLUMNS: usize = 4;
const SWATCH_ROWS: usize = 2;

impl ToolbarPort for SimHost {
    fn active_index(&self) -> i32 {
        self.active_index
    }

    fn set_active_index(&mut self, index: i32) {
        self.active_index = index;
    }
}

impl InventoryPort for SimHost {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> Option<ItemStack> {
        self.slots.get(index).cloned().flatten()
    }

    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = stack;
        }
    }

    fn cursor(&self) -> Option<ItemStack> {
        self.cursor.clone()
    }

    fn set_cursor(&mut self, stack: Option<ItemStack>) {
        self.cursor = stack;
    }

    fn drop_into_world(&mut self, stack: ItemStack) {
        debug!("rig: {}x{} dropped into the world", stack.quantity, stack.kind);
        self.world_drops.push(stack);
    }
}

impl MenuPort for SimHost {
    fn current_menu(&self) -> Option<MenuKind> {
        self.menu
    }

    fn nav_graph(&mut self) -> Option<&mut MenuGraph> {
        self.graph.as_mut()
    }

    fn hovered(&self) -> Option<HoverTarget> {
        self.hovered
    }

    fn forward_click(&mut self, target: HoverTarget) {
        match target {
            HoverTarget::Component(id) if id == self.trash_id => {
                debug!("rig: trash consumed the cursor item");
                self.cursor = None;
            }
            other => {
                debug!("rig: click forwarded to {:?}", other);
            }
        }
    }

    fn close_menu(&mut self) {
        info!("rig: menu closed");
        self.menu = None;
        self.graph = None;
        self.hovered = None;
        self.swatch_visible = false;
    }

    fn swatch_widget(&self) -> Option<SwatchWidget> {
        if !self.swatch_visible {
            return None;
        }
        Some(SwatchWidget {
            bounds: Rect::new(32, 96, 256, 128),
            columns: SWATCH_COLUMNS,
            rows: SWATCH_ROWS,
        })
    }

    fn set_swatch_visible(&mut self, visible: bool) {
        self.swatch_visible = visible;
    }
}

impl FeedbackPort for SimHost {
    fn play_cue(&mut self, cue: Cue) {
        debug!("rig: cue {:?}", cue);
        self.cues.push(cue);
    }
}

/// Scripted controller input for tests and headless runs: plays queued
/// frames, then repeats the last one.
#[derive(Debug, Default)]
pub struct ScriptedPad {
    frames: VecDeque<RawSnapshot>,
    last: RawSnapshot,
}

impl ScriptedPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, frame: RawSnapshot) {
        self.frames.push_back(frame);
    }
}

impl InputPort for ScriptedPad {
    fn poll(&mut self) -> RawSnapshot {
        if let Some(frame) = self.frames.pop_front() {
            self.last = frame;
        }
        self.last
    }
}
