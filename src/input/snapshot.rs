//! Frame-coherent controller snapshots.
//!
//! The classic bug this prevents: two reads of controller state inside one
//! tick observing different values, so a stateful consumer (a charging
//! tool, a toggling menu) fires on a state its sibling never saw. The
//! cache performs exactly one raw poll per tick; every same-tick reader
//! gets a structurally identical [`FrameSnapshot`].
//!
//! Raw analog values (sticks, trigger travel) ride along unsuppressed so
//! consumers that must ignore button suppression, like menu scrolling on
//! the right stick, still see this tick's reading.

use crate::adapter::InputPort;
use crate::input::{
    remap, ControlStyle, ControllerLayout, LogicalButton, RawSnapshot, StickVec,
    SuppressionTracker,
};
use tracing::trace;

/// The per-tick, already-remapped, already-suppressed controller view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    down: [bool; LogicalButton::COUNT],
    pub left_stick: StickVec,
    pub right_stick: StickVec,
    pub left_trigger: f32,
    pub right_trigger: f32,
}

impl FrameSnapshot {
    pub fn empty(tick: u64) -> Self {
        Self {
            tick,
            down: [false; LogicalButton::COUNT],
            left_stick: StickVec::default(),
            right_stick: StickVec::default(),
            left_trigger: 0.0,
            right_trigger: 0.0,
        }
    }

    pub fn is_down(&self, button: LogicalButton) -> bool {
        self.down[button.slot()]
    }

    /// Rig and fixture support: snapshots normally come out of the cache.
    pub fn set_down(&mut self, button: LogicalButton, down: bool) {
        self.down[button.slot()] = down;
    }
}

/// Press/release transitions between two consecutive frames.
#[derive(Debug, Clone, Copy)]
pub struct Edges {
    pressed: [bool; LogicalButton::COUNT],
    released: [bool; LogicalButton::COUNT],
}

impl Edges {
    pub fn between(previous: &FrameSnapshot, current: &FrameSnapshot) -> Self {
        let mut pressed = [false; LogicalButton::COUNT];
        let mut released = [false; LogicalButton::COUNT];
        for button in LogicalButton::ALL {
            let slot = button.slot();
            pressed[slot] = current.down[slot] && !previous.down[slot];
            released[slot] = !current.down[slot] && previous.down[slot];
        }
        Self { pressed, released }
    }

    pub fn just_pressed(&self, button: LogicalButton) -> bool {
        self.pressed[button.slot()]
    }

    pub fn just_released(&self, button: LogicalButton) -> bool {
        self.released[button.slot()]
    }
}

/// Memoizes the remapped/suppressed snapshot for the current tick.
///
/// The raw poll is cached separately from the finished frame: an explicit
/// [`SnapshotCache::invalidate`] (after a newly-armed suppression flag must
/// retroactively change the frame) recomputes from the *same* raw reading,
/// never from a second poll.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    raw: Option<(u64, RawSnapshot)>,
    frame: Option<FrameSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this tick's snapshot, computing it on the first call.
    pub fn frame(
        &mut self,
        tick: u64,
        port: &mut dyn InputPort,
        layout: ControllerLayout,
        style: ControlStyle,
        suppression: &mut SuppressionTracker,
    ) -> FrameSnapshot {
        if let Some(frame) = self.frame {
            if frame.tick == tick {
                return frame;
            }
        }

        let raw = match self.raw {
            Some((raw_tick, raw)) if raw_tick == tick => raw,
            _ => {
                let mut polled = port.poll();
                polled.apply_trigger_threshold();
                trace!("raw poll for tick {}", tick);
                self.raw = Some((tick, polled));
                polled
            }
        };

        let mut down = [false; LogicalButton::COUNT];
        for button in crate::input::PadButton::ALL {
            if raw.is_down(button) {
                down[remap(button, layout, style).slot()] = true;
            }
        }
        suppression.filter(&mut down);

        let frame = FrameSnapshot {
            tick,
            down,
            left_stick: raw.left_stick,
            right_stick: raw.right_stick,
            left_trigger: raw.left_trigger,
            right_trigger: raw.right_trigger,
        };
        self.frame = Some(frame);
        frame
    }

    /// Drops the finished frame so the next read recomputes it (from the
    /// already-polled raw data) with the suppression flags as they stand.
    pub fn invalidate(&mut self) {
        self.frame = None;
    }
}
