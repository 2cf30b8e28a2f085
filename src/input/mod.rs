//! Controller input model and the per-tick snapshot pipeline.
//!
//! Raw physical input enters through an [`crate::adapter::InputPort`] poll,
//! gets remapped to logical buttons according to the configured layout and
//! control style, filtered by the suppression tracker, and is then served to
//! every consumer of the same tick as one frame-coherent snapshot.
//!
//! ```text
//! RawSnapshot ──► remap (layout/style) ──► suppression ──► FrameSnapshot
//!      ▲                                                        │
//!  InputPort::poll                                   every same-tick reader
//! ```

pub mod pad_source;
pub mod remap;
pub mod snapshot;
pub mod suppress;

pub use remap::{remap, unmap};
pub use snapshot::{Edges, FrameSnapshot, SnapshotCache};
pub use suppress::SuppressionTracker;

use serde::{Deserialize, Serialize};

/// Physical face-button arrangement of the connected pad.
///
/// Identifies where the labeled A/B/X/Y buttons physically sit on the
/// device. Immutable for the lifetime of a session, user-configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControllerLayout {
    /// Nintendo-style: A on the east position, X on top.
    #[default]
    SwitchLike,
    /// Xbox-style: A on the south position, Y on top.
    XboxLike,
    /// DualShock-style positions, mapped to A/B/X/Y like an Xbox pad.
    PlayStationLike,
}

/// Which convention the user wants for confirm/cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlStyle {
    /// Confirm on the east face button (Nintendo convention).
    #[default]
    SwitchConvention,
    /// Confirm on the south face button (Xbox convention).
    XboxConvention,
}

/// Physical button identity, label-faithful as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadButton {
    A,
    B,
    X,
    Y,
    Start,
    Select,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    LeftStick,
    RightStick,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl PadButton {
    pub const COUNT: usize = 16;

    pub const ALL: [PadButton; Self::COUNT] = [
        PadButton::A,
        PadButton::B,
        PadButton::X,
        PadButton::Y,
        PadButton::Start,
        PadButton::Select,
        PadButton::LeftBumper,
        PadButton::RightBumper,
        PadButton::LeftTrigger,
        PadButton::RightTrigger,
        PadButton::LeftStick,
        PadButton::RightStick,
        PadButton::DPadUp,
        PadButton::DPadDown,
        PadButton::DPadLeft,
        PadButton::DPadRight,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Game-meaning button after remapping (confirm, cancel, tool, menu, ...).
///
/// Shares the physical naming so consumers can speak the host's dialect:
/// logical `A` is always "confirm/interact" regardless of which physical
/// button produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalButton {
    A,
    B,
    X,
    Y,
    Start,
    Select,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    LeftStick,
    RightStick,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl LogicalButton {
    pub const COUNT: usize = 16;

    pub const ALL: [LogicalButton; Self::COUNT] = [
        LogicalButton::A,
        LogicalButton::B,
        LogicalButton::X,
        LogicalButton::Y,
        LogicalButton::Start,
        LogicalButton::Select,
        LogicalButton::LeftBumper,
        LogicalButton::RightBumper,
        LogicalButton::LeftTrigger,
        LogicalButton::RightTrigger,
        LogicalButton::LeftStick,
        LogicalButton::RightStick,
        LogicalButton::DPadUp,
        LogicalButton::DPadDown,
        LogicalButton::DPadLeft,
        LogicalButton::DPadRight,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// One analog stick reading, deadzone already applied by the source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickVec {
    pub x: f32,
    pub y: f32,
}

impl StickVec {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt().min(1.0)
    }
}

/// One tick's physical controller poll: button downs plus analog values.
///
/// Trigger magnitudes are carried separately from the trigger button bits;
/// sources set the button bit once the magnitude crosses
/// [`TRIGGER_PRESS_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSnapshot {
    down: [bool; PadButton::COUNT],
    pub left_stick: StickVec,
    pub right_stick: StickVec,
    pub left_trigger: f32,
    pub right_trigger: f32,
}

/// Analog travel past which a trigger counts as a button press.
pub const TRIGGER_PRESS_THRESHOLD: f32 = 0.2;

impl RawSnapshot {
    pub fn is_down(&self, button: PadButton) -> bool {
        self.down[button.slot()]
    }

    pub fn set_down(&mut self, button: PadButton, down: bool) {
        self.down[button.slot()] = down;
    }

    /// Folds analog trigger travel into the trigger button bits.
    pub fn apply_trigger_threshold(&mut self) {
        if self.left_trigger >= TRIGGER_PRESS_THRESHOLD {
            self.set_down(PadButton::LeftTrigger, true);
        }
        if self.right_trigger >= TRIGGER_PRESS_THRESHOLD {
            self.set_down(PadButton::RightTrigger, true);
        }
    }
}
