//! Physical gamepad source backed by gilrs.
//!
//! The core is pull-driven: once per tick the session asks for a raw
//! snapshot, so this source drains the gilrs event queue into an
//! accumulated button/axis state and hands out a copy. Deadzone rescaling
//! is applied at the edge, before anything downstream sees stick values.

use crate::adapter::InputPort;
use crate::input::{PadButton, RawSnapshot};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use tracing::{debug, info, warn};

/// Default stick deadzone, fraction of full deflection.
pub const DEFAULT_DEADZONE: f32 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to initialize gamepad backend: {0}")]
    InitializationError(String),
}

/// Pad source lifecycle.
#[state]
#[derive(Debug, Clone)]
pub enum SourceState {
    Initializing,
    Polling,
}

/// Wraps the gilrs context and the accumulated controller state.
#[machine]
pub struct PadSource<S: SourceState> {
    gilrs: Gilrs,
    active_gamepad: Option<GamepadId>,
    deadzone: f32,
    snapshot: RawSnapshot,
}

impl PadSource<Initializing> {
    pub fn create(deadzone: f32) -> Result<Self, SourceError> {
        info!("initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => g,
            Err(e) => {
                return Err(SourceError::InitializationError(e.to_string()));
            }
        };
        Ok(Self::new(gilrs, None, deadzone, RawSnapshot::default()))
    }

    /// Picks a gamepad and transitions to the polling state.
    pub fn initialize(mut self) -> Result<PadSource<Polling>, SourceError> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("no gamepad connected, continuing in idle mode");
        } else {
            info!("found {} gamepads:", gamepads.len());
            for (id, gamepad) in &gamepads {
                info!("  [{}] {}", id, gamepad.name());
            }
            let (id, gamepad) = &gamepads[0];
            self.active_gamepad = Some(*id);
            info!("selected gamepad: {} ({})", gamepad.name(), id);
        }

        Ok(self.transition())
    }
}

impl PadSource<Polling> {
    fn apply_event(&mut self, event: EventType) {
        match event {
            EventType::ButtonPressed(button, _) => {
                if let Some(mapped) = map_button(button) {
                    debug!("button pressed: {:?}", mapped);
                    self.snapshot.set_down(mapped, true);
                }
            }
            EventType::ButtonReleased(button, _) => {
                if let Some(mapped) = map_button(button) {
                    debug!("button released: {:?}", mapped);
                    self.snapshot.set_down(mapped, false);
                }
            }
            EventType::AxisChanged(axis, value, _) => {
                let scaled = apply_deadzone(value, self.deadzone);
                match axis {
                    Axis::LeftStickX => self.snapshot.left_stick.x = scaled,
                    Axis::LeftStickY => self.snapshot.left_stick.y = scaled,
                    Axis::RightStickX => self.snapshot.right_stick.x = scaled,
                    Axis::RightStickY => self.snapshot.right_stick.y = scaled,
                    Axis::LeftZ => self.snapshot.left_trigger = scaled.max(0.0),
                    Axis::RightZ => self.snapshot.right_trigger = scaled.max(0.0),
                    _ => {}
                }
            }
            EventType::Connected => {
                info!("controller connected");
            }
            EventType::Disconnected => {
                warn!("controller disconnected");
                self.snapshot = RawSnapshot::default();
            }
            _ => {}
        }
    }
}

impl InputPort for PadSource<Polling> {
    fn poll(&mut self) -> RawSnapshot {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if let Some(active) = self.active_gamepad {
                if id != active {
                    continue;
                }
            }
            self.apply_event(event);
        }
        self.snapshot
    }
}

/// Driver buttons to label-faithful pad buttons. Built against pads that
/// report Switch-style labels; the layout option covers the rest.
fn map_button(button: Button) -> Option<PadButton> {
    match button {
        Button::South => Some(PadButton::A),
        Button::East => Some(PadButton::B),
        Button::West => Some(PadButton::Y),
        Button::North => Some(PadButton::X),
        Button::Start => Some(PadButton::Start),
        Button::Select => Some(PadButton::Select),
        Button::LeftTrigger => Some(PadButton::LeftBumper),
        Button::RightTrigger => Some(PadButton::RightBumper),
        Button::LeftTrigger2 => Some(PadButton::LeftTrigger),
        Button::RightTrigger2 => Some(PadButton::RightTrigger),
        Button::LeftThumb => Some(PadButton::LeftStick),
        Button::RightThumb => Some(PadButton::RightStick),
        Button::DPadUp => Some(PadButton::DPadUp),
        Button::DPadDown => Some(PadButton::DPadDown),
        Button::DPadLeft => Some(PadButton::DPadLeft),
        Button::DPadRight => Some(PadButton::DPadRight),
        _ => None,
    }
}

/// Rescales a stick value so travel outside the deadzone spans 0..=1.
fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}
