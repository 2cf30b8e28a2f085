//! The per-session context that owns every interaction machine.
//!
//! One `PadSession` is created at startup and passed `&mut` into each
//! host event. The host calls exactly four entry points, each once per
//! event: [`PadSession::tick`] every frame, [`PadSession::on_menu_opened`]
//! and [`PadSession::on_menu_closed`] around menu lifecycles, and
//! [`PadSession::on_index_write`] when its own logic writes the active
//! toolbar index.
//!
//! Ordering inside a tick: the controller snapshot is computed first and
//! memoized, then every consumer branches off the same frame. A fault in
//! one machine is recorded and isolated; the others still run that tick
//! and every tick after.

use crate::adapter::{HostPortal, HoverTarget, InputPort, MenuKind};
use crate::config::Options;
use crate::diagnostics::DiagnosticLog;
use crate::held::{sort, HeldItemController, HeldItemError};
use crate::input::{Edges, FrameSnapshot, LogicalButton, SnapshotCache, SuppressionTracker};
use crate::nav::{Activation, ComponentId, MenuRepair, NavError, Repaired};
use crate::toolbar::ToolbarRowController;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("held-item error: {0}")]
    HeldItem(#[from] HeldItemError),

    #[error("navigation error: {0}")]
    Nav(#[from] NavError),
}

/// Owns all interaction state for one play session.
pub struct PadSession {
    options: Options,
    tick: u64,
    cache: SnapshotCache,
    suppression: SuppressionTracker,
    previous: FrameSnapshot,
    toolbar: ToolbarRowController,
    held: HeldItemController,
    menu: Option<MenuRepair<Repaired>>,
    diagnostics: DiagnosticLog,
}

impl PadSession {
    pub fn new(options: Options) -> Self {
        info!(
            "session created: layout {:?}, style {:?}",
            options.layout, options.style
        );
        Self {
            options,
            tick: 0,
            cache: SnapshotCache::new(),
            suppression: SuppressionTracker::new(),
            previous: FrameSnapshot::empty(0),
            toolbar: ToolbarRowController::new(),
            held: HeldItemController::new(),
            menu: None,
            diagnostics: DiagnosticLog::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// The suppressed/remapped controller view for the current tick, for
    /// host code that reads controller state outside the fixed entry
    /// points.
    pub fn snapshot(&mut self, pad: &mut dyn InputPort) -> FrameSnapshot {
        self.cache.frame(
            self.tick,
            pad,
            self.options.layout,
            self.options.style,
            &mut self.suppression,
        )
    }

    /// One frame of processing, invoked by the host's own loop.
    pub fn tick<H: HostPortal>(&mut self, pad: &mut dyn InputPort, host: &mut H) {
        self.tick += 1;
        let mut frame = self.snapshot(pad);
        let mut edges = Edges::between(&self.previous, &frame);

        match host.current_menu() {
            Some(kind) => {
                if self.options.nav_fix
                    && edges.just_pressed(LogicalButton::A)
                    && self.handle_special_activation(kind, host)
                {
                    // The press was fully consumed; recompute so no later
                    // consumer interprets it a second time.
                    frame = self.snapshot(pad);
                    edges = Edges::between(&self.previous, &frame);
                }

                // The activation may have closed the menu.
                if host.current_menu().is_some() {
                    if self.options.held_item_fix {
                        if let Err(e) = self.held.tick(&frame, &edges, host) {
                            self.record_fault("held", e.into());
                        }
                    }
                    if self.options.sort_fix
                        && kind == MenuKind::Inventory
                        && edges.just_pressed(LogicalButton::X)
                    {
                        sort::sort_inventory(self.held.state(), host);
                    }
                }
            }
            None => {
                if self.options.toolbar_fix {
                    self.toolbar
                        .handle_input(&edges, self.options.alternate_triggers, host);
                    self.toolbar.enforce_invariant(host);
                }
            }
        }

        self.previous = frame;
    }

    /// Menu-open notification. Runs the one-shot repair pass before any
    /// input is processed against this menu.
    pub fn on_menu_opened<H: HostPortal>(&mut self, kind: MenuKind, host: &mut H) {
        self.menu = None;
        if !self.options.nav_fix {
            return;
        }
        let Some(graph) = host.nav_graph() else {
            debug!("{:?} menu opened without a component graph", kind);
            return;
        };
        match MenuRepair::create(kind).repair(graph) {
            Ok(repaired) => self.menu = Some(repaired),
            Err(e) => self.record_fault("nav", e.into()),
        }
    }

    /// Menu-close notification: cleanup entry point for everything the
    /// menu left behind.
    pub fn on_menu_closed<H: HostPortal>(&mut self, kind: MenuKind, host: &mut H) {
        debug!("{:?} menu closed", kind);
        self.restore_swatch_if_active(host);
        self.menu = None;
        if self.options.held_item_fix {
            self.held.resolve_cancellation(host);
        }
        // Whichever button closed the menu must not be reinterpreted by
        // the world as "interact" once the menu is gone. Arming on an
        // already-released button clears on the next observed frame.
        self.suppression.suppress_until_release(LogicalButton::A);
        self.suppression.suppress_until_release(LogicalButton::B);
        self.cache.invalidate();
    }

    /// Pre-hook for host-driven writes to the active toolbar index.
    pub fn on_index_write<H: HostPortal>(&mut self, value: i32, host: &mut H) {
        if !self.options.toolbar_fix || host.current_menu().is_some() {
            host.set_active_index(value);
            return;
        }
        self.toolbar.intercept_write(value, host);
    }

    /// Dispatches the confirm press on a component that must not receive
    /// a generic simulated click. Returns true when the press was
    /// consumed here.
    fn handle_special_activation<H: HostPortal>(&mut self, kind: MenuKind, host: &mut H) -> bool {
        let Some(HoverTarget::Component(id)) = host.hovered() else {
            return false;
        };
        let activation = match &self.menu {
            Some(repair) => repair.activation(id),
            None => return false,
        };

        match activation {
            Activation::GenericClick => false,
            Activation::CloseMenu => {
                debug!("close action {} consumed the confirm press", id);
                self.suppression.suppress_until_release(LogicalButton::A);
                self.cache.invalidate();
                // Undo the overlay while the graph is still alive.
                self.restore_swatch_if_active(host);
                host.close_menu();
                self.on_menu_closed(kind, host);
                true
            }
            Activation::ToggleSwatch => {
                self.suppression.suppress_until_release(LogicalButton::A);
                self.cache.invalidate();
                if let Err(e) = self.toggle_swatch(id, host) {
                    self.record_fault("nav", e.into());
                }
                true
            }
        }
    }

    fn toggle_swatch<H: HostPortal>(
        &mut self,
        toggle: ComponentId,
        host: &mut H,
    ) -> Result<(), NavError> {
        let Some(repair) = &mut self.menu else {
            return Ok(());
        };
        if repair.swatch_active() {
            host.set_swatch_visible(false);
            if let Some(graph) = host.nav_graph() {
                repair.close_swatch(graph)?;
            }
        } else {
            host.set_swatch_visible(true);
            let widget = host.swatch_widget().ok_or(NavError::NoSwatchWidget)?;
            let Some(graph) = host.nav_graph() else {
                return Err(NavError::MissingComponent(toggle));
            };
            repair.open_swatch(graph, widget, toggle)?;
        }
        Ok(())
    }

    /// Restores swatch-mode bounds and links if the overlay is active and
    /// the host still exposes the graph.
    fn restore_swatch_if_active<H: HostPortal>(&mut self, host: &mut H) {
        let Some(mut repair) = self.menu.take() else {
            return;
        };
        if repair.swatch_active() {
            host.set_swatch_visible(false);
            if let Some(graph) = host.nav_graph() {
                if let Err(e) = repair.close_swatch(graph) {
                    self.record_fault("nav", e.into());
                }
            }
        }
        self.menu = Some(repair);
    }

    fn record_fault(&mut self, module: &'static str, error: SessionError) {
        error!("{} fault, degrading to no-op this tick: {}", module, error);
        self.diagnostics.record(module, error.to_string());
    }
}
