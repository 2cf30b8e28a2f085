//! Sub-grid navigation mode for color-picker widgets.
//!
//! The picker's cell components report visually misleading bounds (the
//! generator stamps them all into one row), so discrete navigation inside
//! the widget is impossible without correction. While the picker is
//! visible, the overlay relocates every cell to its true cell rect,
//! derived from the widget's own position and size, and wires strictly
//! non-wrapping 2-D neighbor links. Closing restores the original bounds
//! and the toggle's pre-picker links exactly.

use crate::nav::{
    ComponentId, Direction, MenuGraph, NavError, Neighbor, Rect,
};
use tracing::{debug, warn};

/// Geometry of the visible picker widget, queried from the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwatchWidget {
    pub bounds: Rect,
    pub columns: usize,
    pub rows: usize,
}

/// Active sub-grid mode: what must be undone on close.
#[derive(Debug)]
pub struct SwatchOverlay {
    toggle_index: usize,
    toggle_links: [Neighbor; 4],
    saved_bounds: Vec<(usize, Rect)>,
}

impl SwatchOverlay {
    /// Relocates the picker cells and wires the sub-grid.
    pub(crate) fn open(
        graph: &mut MenuGraph,
        widget: SwatchWidget,
        toggle: ComponentId,
    ) -> Result<Self, NavError> {
        if widget.columns == 0 || widget.rows == 0 {
            return Err(NavError::SwatchGeometry(format!(
                "{}x{} grid",
                widget.columns, widget.rows
            )));
        }
        let cell_width = widget.bounds.width / widget.columns as i32;
        let cell_height = widget.bounds.height / widget.rows as i32;
        if cell_width <= 0 || cell_height <= 0 {
            return Err(NavError::SwatchGeometry(format!(
                "widget {}x{} too small for {}x{} cells",
                widget.bounds.width, widget.bounds.height, widget.columns, widget.rows
            )));
        }

        let toggle_index = graph
            .components
            .iter()
            .position(|c| c.id == toggle)
            .ok_or(NavError::MissingComponent(toggle))?;

        let cells = graph.swatch_cells().to_vec();
        if cells.is_empty() {
            return Err(NavError::SwatchGeometry("no picker cells".to_string()));
        }
        let wired = cells.len().min(widget.columns * widget.rows);
        if wired < cells.len() {
            warn!(
                "picker has {} cells but the widget grid holds {}",
                cells.len(),
                wired
            );
        }

        let mut saved_bounds = Vec::with_capacity(wired);
        for (i, &cell_index) in cells.iter().take(wired).enumerate() {
            let column = (i % widget.columns) as i32;
            let row = (i / widget.columns) as i32;
            let component = graph
                .component_mut(cell_index)
                .ok_or(NavError::BadCellRef(cell_index))?;
            saved_bounds.push((cell_index, component.bounds));
            component.bounds = Rect::new(
                widget.bounds.x + column * cell_width,
                widget.bounds.y + row * cell_height,
                cell_width,
                cell_height,
            );
        }

        Self::wire_grid(graph, &cells[..wired], widget.columns);

        // Entry point into the grid; boundaries themselves never wrap.
        let first_id = graph.components[cells[0]].id;
        let toggle_links = graph.components[toggle_index].neighbors();
        graph.components[toggle_index].wire(Direction::Down, Neighbor::Id(first_id));

        debug!(
            "swatch overlay opened: {}x{} cells at {:?}",
            widget.columns, widget.rows, widget.bounds
        );
        Ok(Self {
            toggle_index,
            toggle_links,
            saved_bounds,
        })
    }

    /// Strictly non-wrapping 2-D links: a boundary edge has no neighbor.
    fn wire_grid(graph: &mut MenuGraph, cells: &[usize], columns: usize) {
        let count = cells.len();
        for (i, &cell_index) in cells.iter().enumerate() {
            let column = i % columns;
            let row = i / columns;

            let left = if column > 0 {
                Neighbor::Id(graph.components[cells[i - 1]].id)
            } else {
                Neighbor::Unset
            };
            let right = if column + 1 < columns && i + 1 < count {
                Neighbor::Id(graph.components[cells[i + 1]].id)
            } else {
                Neighbor::Unset
            };
            let up = if row > 0 {
                Neighbor::Id(graph.components[cells[i - columns]].id)
            } else {
                Neighbor::Unset
            };
            let down = if i + columns < count {
                Neighbor::Id(graph.components[cells[i + columns]].id)
            } else {
                Neighbor::Unset
            };

            let component = &mut graph.components[cell_index];
            component.wire(Direction::Left, left);
            component.wire(Direction::Right, right);
            component.wire(Direction::Up, up);
            component.wire(Direction::Down, down);
        }
    }

    /// Restores original bounds and the toggle's links exactly.
    pub(crate) fn close(self, graph: &mut MenuGraph) -> Result<(), NavError> {
        for (cell_index, bounds) in self.saved_bounds {
            if let Some(component) = graph.component_mut(cell_index) {
                component.bounds = bounds;
            }
        }
        if let Some(toggle) = graph.component_mut(self.toggle_index) {
            toggle.set_neighbors(self.toggle_links);
        }
        debug!("swatch overlay closed, bounds and toggle links restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{ComponentRole, NavComponent};

    /// Menu with a swatch toggle and six picker cells the generator
    /// stamped into one misleading row.
    fn picker_menu() -> (MenuGraph, ComponentId) {
        let mut graph = MenuGraph::new();
        let toggle_index = graph.add_component(
            NavComponent::new(ComponentId(10), "eye-color", Rect::new(0, 0, 32, 32))
                .with_role(ComponentRole::SwatchToggle),
        );
        for i in 0..6 {
            let index = graph.add_component(NavComponent::new(
                ComponentId(20 + i),
                format!("swatch-{}", i),
                // All cells report the same flat row.
                Rect::new(0, 40, 16, 16),
            ));
            graph.mark_swatch_cell(index);
        }
        let toggle_id = graph.component(toggle_index).unwrap().id;
        (graph, toggle_id)
    }

    fn widget() -> SwatchWidget {
        SwatchWidget {
            bounds: Rect::new(100, 200, 90, 60),
            columns: 3,
            rows: 2,
        }
    }

    #[test]
    fn cells_are_relocated_to_true_geometry() {
        let (mut graph, toggle) = picker_menu();
        let _overlay = SwatchOverlay::open(&mut graph, widget(), toggle).unwrap();

        // Cell 0: top-left. Cell 4: second row, middle column.
        assert_eq!(graph.component(1).unwrap().bounds, Rect::new(100, 200, 30, 30));
        assert_eq!(graph.component(5).unwrap().bounds, Rect::new(130, 230, 30, 30));
    }

    #[test]
    fn grid_links_do_not_wrap() {
        let (mut graph, toggle) = picker_menu();
        let _overlay = SwatchOverlay::open(&mut graph, widget(), toggle).unwrap();

        let top_left = graph.component(1).unwrap();
        assert_eq!(top_left.left, Neighbor::Unset);
        assert_eq!(top_left.up, Neighbor::Unset);
        assert_eq!(top_left.right, Neighbor::Id(ComponentId(21)));
        assert_eq!(top_left.down, Neighbor::Id(ComponentId(23)));

        let bottom_right = graph.component(6).unwrap();
        assert_eq!(bottom_right.right, Neighbor::Unset);
        assert_eq!(bottom_right.down, Neighbor::Unset);
        assert_eq!(bottom_right.left, Neighbor::Id(ComponentId(24)));
        assert_eq!(bottom_right.up, Neighbor::Id(ComponentId(22)));
    }

    #[test]
    fn toggle_gains_an_entry_link_while_open() {
        let (mut graph, toggle) = picker_menu();
        let _overlay = SwatchOverlay::open(&mut graph, widget(), toggle).unwrap();
        assert_eq!(
            graph.component(0).unwrap().down,
            Neighbor::Id(ComponentId(20))
        );
    }

    #[test]
    fn close_restores_bounds_and_toggle_links_exactly() {
        let (mut graph, toggle) = picker_menu();
        // Host pinned the toggle's right link with a sentinel.
        graph.component_mut(0).unwrap().right = Neighbor::Blocked;
        graph.component_mut(0).unwrap().down = Neighbor::Id(ComponentId(99));
        let original_bounds = graph.component(3).unwrap().bounds;

        let overlay = SwatchOverlay::open(&mut graph, widget(), toggle).unwrap();
        overlay.close(&mut graph).unwrap();

        assert_eq!(graph.component(3).unwrap().bounds, original_bounds);
        let restored = graph.component(0).unwrap();
        assert_eq!(restored.right, Neighbor::Blocked);
        assert_eq!(restored.down, Neighbor::Id(ComponentId(99)));
    }

    #[test]
    fn partial_last_row_leaves_missing_neighbors_unset() {
        let (mut graph, toggle) = picker_menu();
        // 6 cells in a 4x2 widget: second row holds only two.
        let wide = SwatchWidget {
            bounds: Rect::new(0, 0, 120, 60),
            columns: 4,
            rows: 2,
        };
        let _overlay = SwatchOverlay::open(&mut graph, wide, toggle).unwrap();

        // Cell index 3 (last of row 0) has no cell beneath it.
        let cell = graph.component(4).unwrap();
        assert_eq!(cell.down, Neighbor::Unset);
        // Cell index 5 (second of row 1) has nothing to its right.
        let cell = graph.component(6).unwrap();
        assert_eq!(cell.right, Neighbor::Unset);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let (mut graph, toggle) = picker_menu();
        let flat = SwatchWidget {
            bounds: Rect::new(0, 0, 2, 2),
            columns: 3,
            rows: 2,
        };
        assert!(SwatchOverlay::open(&mut graph, flat, toggle).is_err());
    }
}
