pub mod adapter;
pub mod config;
pub mod diagnostics;
pub mod held;
pub mod input;
pub mod nav;
pub mod session;
pub mod sim;
pub mod toolbar;

use crate::adapter::{InventoryPort, ItemStack, MenuKind, MenuPort, ToolbarPort};
use crate::config::Options;
use crate::input::pad_source::{PadSource, Polling, DEFAULT_DEADZONE};
use crate::input::{FrameSnapshot, LogicalButton};
use crate::nav::{ComponentId, Direction};
use crate::session::PadSession;
use crate::sim::SimHost;
use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Frame pacing for the rig loop.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    setup()?;

    Options::ensure_default_config()?;
    let options = Options::load()?;
    setup_logging(options.verbose_logging);
    info!("padbridge starting with {:?}", options);

    let pad = PadSource::create(DEFAULT_DEADZONE)
        .map_err(|e| eyre!("failed to create pad source: {}", e))?
        .initialize()
        .map_err(|e| eyre!("failed to initialize pad source: {}", e))?;

    let session = PadSession::new(options);
    let mut host = SimHost::with_capacity(36);
    seed_demo_inventory(&mut host);

    run_loop(pad, session, host)
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn seed_demo_inventory(host: &mut SimHost) {
    host.put_slot(0, ItemStack::new("wood", 40, 99));
    host.put_slot(1, ItemStack::new("stone", 25, 99));
    host.put_slot(2, ItemStack::new("coal", 12, 99));
    host.put_slot(13, ItemStack::new("wood", 80, 99));
    host.put_slot(20, ItemStack::new("sword", 1, 1));
}

/// Host-side glue the rig stands in for: menu lifecycle off Start/B, snap
/// navigation off the d-pad, and state reporting.
fn run_loop(mut pad: PadSource<Polling>, mut session: PadSession, mut host: SimHost) -> Result<()> {
    info!("rig loop running: Start opens the menu, B closes it, Select+Start quits");
    let mut previous = FrameSnapshot::empty(0);
    let mut cursor: Option<ComponentId> = None;

    loop {
        session.tick(&mut pad, &mut host);
        let frame = session.snapshot(&mut pad);

        if frame.is_down(LogicalButton::Select) && frame.is_down(LogicalButton::Start) {
            info!("quit combination pressed");
            break;
        }

        let start_pressed =
            frame.is_down(LogicalButton::Start) && !previous.is_down(LogicalButton::Start);
        let cancel_pressed =
            frame.is_down(LogicalButton::B) && !previous.is_down(LogicalButton::B);

        if !host.menu_open() && start_pressed {
            host.open_menu(MenuKind::Inventory);
            session.on_menu_opened(MenuKind::Inventory, &mut host);
            host.adopt_repaired_ids();
            cursor = first_component(&mut host);
            sync_hover(&mut host, cursor);
        } else if host.menu_open() && cancel_pressed {
            host.close_menu();
            session.on_menu_closed(MenuKind::Inventory, &mut host);
            cursor = None;
            info!(
                "toolbar index {} after menu close, {} diagnostics recorded",
                host.active_index(),
                session.diagnostics().len()
            );
        } else if host.menu_open() {
            navigate_cursor(&mut host, &frame, &previous, &mut cursor);
        }

        previous = frame;
        std::thread::sleep(TICK_INTERVAL);
    }

    Ok(())
}

fn first_component(host: &mut SimHost) -> Option<ComponentId> {
    host.nav_graph().and_then(|g| g.component(0).map(|c| c.id))
}

/// Moves the discrete cursor along repaired neighbor links.
fn navigate_cursor(
    host: &mut SimHost,
    frame: &FrameSnapshot,
    previous: &FrameSnapshot,
    cursor: &mut Option<ComponentId>,
) {
    let Some(at) = *cursor else {
        return;
    };
    let pressed = |b: LogicalButton| frame.is_down(b) && !previous.is_down(b);

    let direction = if pressed(LogicalButton::DPadUp) {
        Some(Direction::Up)
    } else if pressed(LogicalButton::DPadDown) {
        Some(Direction::Down)
    } else if pressed(LogicalButton::DPadLeft) {
        Some(Direction::Left)
    } else if pressed(LogicalButton::DPadRight) {
        Some(Direction::Right)
    } else {
        None
    };

    if let Some(direction) = direction {
        if let Some(next) = host
            .nav_graph()
            .and_then(|g| g.resolve_neighbor(at, direction))
        {
            info!("cursor {} -> {}", at, next);
            *cursor = Some(next);
            sync_hover(host, *cursor);
        }
    }
}

/// Mirrors the discrete cursor into the host's hover target. Inventory
/// cells carry their slot index as the component id.
fn sync_hover(host: &mut SimHost, cursor: Option<ComponentId>) {
    let Some(id) = cursor else {
        host.clear_hover();
        return;
    };
    let capacity = host.capacity() as i32;
    if id.0 >= 0 && id.0 < capacity {
        host.hover_slot(id.0 as usize);
    } else {
        host.hover_component(id);
    }
}
