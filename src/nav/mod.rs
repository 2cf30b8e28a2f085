//! Navigation graph repair for auto-generated menus.
//!
//! Host menus generate their component graphs per sub-panel, which leaves
//! three classes of damage once the panels are glued together: identifier
//! collisions across panels, sidebar actions missing from the master
//! component list (so id-based neighbor lookups dead-end), and neighbor
//! links that point into the wrong panel. The repairer runs exactly once
//! per menu-open, before any input is routed at that menu, and fixes all
//! three in place.
//!
//! # Lifecycle
//!
//! ```text
//! MenuRepair<Pending> ──repair()──► MenuRepair<Repaired>
//!                                        │
//!                              open_swatch()/close_swatch()
//! ```
//!
//! The typestate split guarantees input routing can only see a repaired
//! graph: the session stores the `Repaired` machine and drops it when the
//! menu closes.

pub mod swatch;

pub use swatch::{SwatchOverlay, SwatchWidget};

use crate::adapter::MenuKind;
use statum::{machine, state};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Stable component identifier inside one menu instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub i32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Screen-space bounds in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }
}

/// A directed neighbor reference.
///
/// `Blocked` is the host's "do not escape this axis" sentinel; the
/// repairer must never rewrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Neighbor {
    #[default]
    Unset,
    Id(ComponentId),
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// How a component reacts to the confirm press, as described by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentRole {
    /// Generic center-click activation is safe and effective.
    #[default]
    Generic,
    /// Closing action: a simulated center-click would also reach the
    /// world behind the menu on the same physical press.
    CloseButton,
    /// Color-picker toggle whose visual state does not update from a
    /// simulated click.
    SwatchToggle,
}

/// One UI component: identity, geometry, and four directed neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavComponent {
    pub id: ComponentId,
    pub name: String,
    pub bounds: Rect,
    pub role: ComponentRole,
    pub up: Neighbor,
    pub down: Neighbor,
    pub left: Neighbor,
    pub right: Neighbor,
}

impl NavComponent {
    pub fn new(id: ComponentId, name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id,
            name: name.into(),
            bounds,
            role: ComponentRole::Generic,
            up: Neighbor::Unset,
            down: Neighbor::Unset,
            left: Neighbor::Unset,
            right: Neighbor::Unset,
        }
    }

    pub fn with_role(mut self, role: ComponentRole) -> Self {
        self.role = role;
        self
    }

    pub fn neighbor(&self, direction: Direction) -> Neighbor {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn neighbors(&self) -> [Neighbor; 4] {
        [self.up, self.down, self.left, self.right]
    }

    pub fn set_neighbors(&mut self, links: [Neighbor; 4]) {
        [self.up, self.down, self.left, self.right] = links;
    }

    /// Rewires one link unless the host placed a sentinel there.
    pub fn wire(&mut self, direction: Direction, to: Neighbor) {
        let slot = match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        };
        if *slot == Neighbor::Blocked {
            return;
        }
        *slot = to;
    }
}

/// An item grid inside the menu, row-major with a fixed column count.
#[derive(Debug, Clone)]
pub struct GridRegion {
    /// Indices into the graph's component storage, row-major.
    pub cells: Vec<usize>,
    pub columns: usize,
}

impl GridRegion {
    /// Indices of the rightmost column, top to bottom.
    pub fn rightmost_column(&self) -> Vec<usize> {
        if self.columns == 0 {
            return Vec::new();
        }
        self.cells
            .iter()
            .enumerate()
            .filter(|(i, _)| i % self.columns == self.columns - 1)
            .map(|(_, &idx)| idx)
            .collect()
    }
}

/// The per-menu component graph, rebuilt from scratch on every menu open.
///
/// Components are stored by index; `registered` models the host's master
/// list, which is the only place its navigation code resolves ids from.
/// Sidebar actions and swatch cells are held as direct index references
/// because their ids are untrustworthy until the repairer has run.
#[derive(Debug, Clone, Default)]
pub struct MenuGraph {
    components: Vec<NavComponent>,
    registered: Vec<bool>,
    sidebar: Vec<usize>,
    grids: Vec<GridRegion>,
    swatch_cells: Vec<usize>,
}

impl MenuGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component that is already on the host's master list.
    pub fn add_component(&mut self, component: NavComponent) -> usize {
        self.components.push(component);
        self.registered.push(true);
        self.components.len() - 1
    }

    /// Adds a component the host generated but never registered, so
    /// id-based lookups cannot find it yet.
    pub fn add_unregistered(&mut self, component: NavComponent) -> usize {
        self.components.push(component);
        self.registered.push(false);
        self.components.len() - 1
    }

    pub fn mark_sidebar(&mut self, index: usize) {
        self.sidebar.push(index);
    }

    pub fn add_grid(&mut self, grid: GridRegion) {
        self.grids.push(grid);
    }

    pub fn mark_swatch_cell(&mut self, index: usize) {
        self.swatch_cells.push(index);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, index: usize) -> Option<&NavComponent> {
        self.components.get(index)
    }

    pub fn component_mut(&mut self, index: usize) -> Option<&mut NavComponent> {
        self.components.get_mut(index)
    }

    pub fn sidebar(&self) -> &[usize] {
        &self.sidebar
    }

    pub fn grids(&self) -> &[GridRegion] {
        &self.grids
    }

    pub fn swatch_cells(&self) -> &[usize] {
        &self.swatch_cells
    }

    pub fn is_registered(&self, index: usize) -> bool {
        self.registered.get(index).copied().unwrap_or(false)
    }

    /// Id lookup the way the host's navigation code does it: only
    /// registered components are visible.
    pub fn find(&self, id: ComponentId) -> Option<&NavComponent> {
        self.components
            .iter()
            .zip(&self.registered)
            .find(|(c, &r)| r && c.id == id)
            .map(|(c, _)| c)
    }

    /// Highest id across all components, registered or not.
    pub fn max_id(&self) -> i32 {
        self.components.iter().map(|c| c.id.0).max().unwrap_or(0)
    }

    /// Follows one neighbor link the way the host's snap navigation does:
    /// through the master list, ignoring sentinels and dead ends.
    pub fn resolve_neighbor(
        &self,
        from: ComponentId,
        direction: Direction,
    ) -> Option<ComponentId> {
        match self.find(from)?.neighbor(direction) {
            Neighbor::Id(id) => self.find(id).map(|c| c.id),
            Neighbor::Unset | Neighbor::Blocked => None,
        }
    }
}

/// How the session should activate a component on the confirm press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Forward a generic click to the host.
    GenericClick,
    /// Close the menu ourselves and suppress the press so the world never
    /// sees it.
    CloseMenu,
    /// Toggle the color picker overlay directly.
    ToggleSwatch,
}

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("component {0} not present in this menu")]
    MissingComponent(ComponentId),

    #[error("sidebar reference {0} is out of range")]
    BadSidebarRef(usize),

    #[error("picker cell reference {0} is out of range")]
    BadCellRef(usize),

    #[error("no swatch widget is visible")]
    NoSwatchWidget,

    #[error("swatch geometry invalid: {0}")]
    SwatchGeometry(String),
}

/// Repair lifecycle states.
#[state]
#[derive(Debug, Clone)]
pub enum RepairState {
    Pending,
    Repaired,
}

/// One menu instance's repair pass and the state it leaves behind.
#[machine]
#[derive(Debug)]
pub struct MenuRepair<S: RepairState> {
    kind: MenuKind,
    activation: HashMap<ComponentId, Activation>,
    reassigned: Vec<(ComponentId, ComponentId)>,
    overlay: Option<SwatchOverlay>,
}

impl<S: RepairState> MenuRepair<S> {
    pub fn menu_kind(&self) -> MenuKind {
        self.kind
    }
}

impl MenuRepair<Pending> {
    pub fn create(kind: MenuKind) -> Self {
        debug!("repair pass created for {:?}", kind);
        Self::new(kind, HashMap::new(), Vec::new(), None)
    }

    /// Runs the one-shot repair pass over `graph`.
    ///
    /// Steps, in order: resolve sidebar actions by direct reference,
    /// reassign them locally-unique identifiers, register them on the
    /// master list, wire the vertical chain plus the grid-to-chain
    /// horizontal links, and record components that need special-cased
    /// activation. Sentinel links are never rewritten.
    pub fn repair(mut self, graph: &mut MenuGraph) -> Result<MenuRepair<Repaired>, NavError> {
        let sidebar = self.resolve_sidebar(graph)?;
        self.reassign_ids(graph, &sidebar);
        self.register_missing(graph, &sidebar);
        self.wire_chain(graph, &sidebar);
        self.record_activations(graph);

        info!(
            "repaired {:?} menu: {} components, {} sidebar actions, {} special activations",
            self.kind,
            graph.len(),
            sidebar.len(),
            self.activation.len()
        );
        Ok(self.transition())
    }

    /// Step 1: direct references only; ids are not trustworthy yet.
    fn resolve_sidebar(&self, graph: &MenuGraph) -> Result<Vec<usize>, NavError> {
        let mut sidebar = graph.sidebar().to_vec();
        for &index in &sidebar {
            if index >= graph.len() {
                return Err(NavError::BadSidebarRef(index));
            }
        }
        // Chain order is visual order.
        sidebar.sort_by_key(|&i| graph.component(i).map(|c| c.bounds.y).unwrap_or(i32::MAX));
        Ok(sidebar)
    }

    /// Step 2: every sidebar action gets an id above anything the panel
    /// generators produced, before any link refers to it.
    fn reassign_ids(&mut self, graph: &mut MenuGraph, sidebar: &[usize]) {
        let mut next = graph.max_id() + 1;
        for &index in sidebar {
            if let Some(component) = graph.component_mut(index) {
                let old = component.id;
                component.id = ComponentId(next);
                debug!("sidebar '{}' id {} -> {}", component.name, old, component.id);
                self.reassigned.push((old, component.id));
                next += 1;
            }
        }
    }

    /// Step 3: id-based neighbor lookups require master-list membership.
    fn register_missing(&self, graph: &mut MenuGraph, sidebar: &[usize]) {
        for &index in sidebar {
            if !graph.is_registered(index) {
                graph.registered[index] = true;
                if let Some(component) = graph.component(index) {
                    debug!("registered '{}' ({})", component.name, component.id);
                }
            }
        }
    }

    /// Step 4: vertical chain among sidebar actions, and horizontal links
    /// from every grid's rightmost column into the nearest chain entry.
    fn wire_chain(&self, graph: &mut MenuGraph, sidebar: &[usize]) {
        for pair in sidebar.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            let lower_id = graph.components[lower].id;
            let upper_id = graph.components[upper].id;
            graph.components[upper].wire(Direction::Down, Neighbor::Id(lower_id));
            graph.components[lower].wire(Direction::Up, Neighbor::Id(upper_id));
        }

        let grids = graph.grids().to_vec();
        for grid in &grids {
            for cell_index in grid.rightmost_column() {
                let Some(cell_center) = graph.component(cell_index).map(|c| c.bounds.center_y())
                else {
                    continue;
                };
                let Some(&nearest) = sidebar.iter().min_by_key(|&&s| {
                    graph
                        .component(s)
                        .map(|c| (c.bounds.center_y() - cell_center).abs())
                        .unwrap_or(i32::MAX)
                }) else {
                    continue;
                };
                let side_id = graph.components[nearest].id;
                let cell_id = graph.components[cell_index].id;
                graph.components[cell_index].wire(Direction::Right, Neighbor::Id(side_id));
                // Entry back into the grid only where the host left the
                // link open.
                if graph.components[nearest].left == Neighbor::Unset {
                    graph.components[nearest].wire(Direction::Left, Neighbor::Id(cell_id));
                }
            }
        }
    }

    /// Step 5: components whose generic center-click is unsafe or
    /// ineffective get a special-cased activation.
    fn record_activations(&mut self, graph: &MenuGraph) {
        for component in &graph.components {
            let activation = match component.role {
                ComponentRole::Generic => continue,
                ComponentRole::CloseButton => Activation::CloseMenu,
                ComponentRole::SwatchToggle => Activation::ToggleSwatch,
            };
            warn_if_duplicate(&self.activation, component.id);
            self.activation.insert(component.id, activation);
        }
    }
}

fn warn_if_duplicate(map: &HashMap<ComponentId, Activation>, id: ComponentId) {
    if map.contains_key(&id) {
        warn!("duplicate special-activation id {}", id);
    }
}

impl MenuRepair<Repaired> {
    pub fn activation(&self, id: ComponentId) -> Activation {
        self.activation
            .get(&id)
            .copied()
            .unwrap_or(Activation::GenericClick)
    }

    /// Old-to-new id mapping produced by the reassignment step.
    pub fn reassigned(&self) -> &[(ComponentId, ComponentId)] {
        &self.reassigned
    }

    pub fn swatch_active(&self) -> bool {
        self.overlay.is_some()
    }

    /// Enters sub-grid navigation mode for a visible picker widget.
    pub fn open_swatch(
        &mut self,
        graph: &mut MenuGraph,
        widget: SwatchWidget,
        toggle: ComponentId,
    ) -> Result<(), NavError> {
        if self.overlay.is_some() {
            // Toggled twice without a close in between; treat as a no-op.
            return Ok(());
        }
        let overlay = SwatchOverlay::open(graph, widget, toggle)?;
        self.overlay = Some(overlay);
        Ok(())
    }

    /// Leaves sub-grid mode, restoring original bounds and the toggle's
    /// pre-picker links exactly.
    pub fn close_swatch(&mut self, graph: &mut MenuGraph) -> Result<(), NavError> {
        if let Some(overlay) = self.overlay.take() {
            overlay.close(graph)?;
        }
        Ok(())
    }
}
