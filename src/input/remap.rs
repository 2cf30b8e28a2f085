//! Layout- and style-aware button remapping.
//!
//! A total, stateless translation from physical button labels to logical
//! game-meaning buttons. Two independent corrections compose:
//!
//! - the confirm/cancel pair (A/B) crosses whenever the pad's native
//!   convention disagrees with the user's configured [`ControlStyle`];
//! - the top face pair (X/Y) crosses purely by position, because the
//!   actions behind logical X and Y must stay on the same physical spot
//!   of the pad no matter which convention the user picked.
//!
//! Both crossings are self-inverse, so [`unmap`] is the same pair of swaps
//! read in the other direction.

use crate::input::{ControlStyle, ControllerLayout, LogicalButton, PadButton};

/// True when the layout seats its cancel-labeled face button on the
/// right-hand (east) position: Xbox pads (B east) and DualShock pads
/// (circle east). Switch pads put A there instead.
pub fn is_right_handed(layout: ControllerLayout) -> bool {
    match layout {
        ControllerLayout::SwitchLike => false,
        ControllerLayout::XboxLike | ControllerLayout::PlayStationLike => true,
    }
}

/// Whether the confirm/cancel pair must cross for this layout/style pair.
fn crosses_confirm_pair(layout: ControllerLayout, style: ControlStyle) -> bool {
    is_right_handed(layout) != (style == ControlStyle::XboxConvention)
}

/// Whether the top face pair must cross. Positional only: layouts whose
/// top button is labeled Y report the top press as Y, but logical X is
/// pinned to the top position.
fn crosses_top_pair(layout: ControllerLayout) -> bool {
    !matches!(layout, ControllerLayout::SwitchLike)
}

/// Translates one physical button into its logical meaning.
///
/// Total over all inputs; buttons outside the two face pairs map to the
/// identically-named logical button.
pub fn remap(button: PadButton, layout: ControllerLayout, style: ControlStyle) -> LogicalButton {
    let ab = crosses_confirm_pair(layout, style);
    let xy = crosses_top_pair(layout);

    match button {
        PadButton::A if ab => LogicalButton::B,
        PadButton::B if ab => LogicalButton::A,
        PadButton::A => LogicalButton::A,
        PadButton::B => LogicalButton::B,
        PadButton::X if xy => LogicalButton::Y,
        PadButton::Y if xy => LogicalButton::X,
        PadButton::X => LogicalButton::X,
        PadButton::Y => LogicalButton::Y,
        PadButton::Start => LogicalButton::Start,
        PadButton::Select => LogicalButton::Select,
        PadButton::LeftBumper => LogicalButton::LeftBumper,
        PadButton::RightBumper => LogicalButton::RightBumper,
        PadButton::LeftTrigger => LogicalButton::LeftTrigger,
        PadButton::RightTrigger => LogicalButton::RightTrigger,
        PadButton::LeftStick => LogicalButton::LeftStick,
        PadButton::RightStick => LogicalButton::RightStick,
        PadButton::DPadUp => LogicalButton::DPadUp,
        PadButton::DPadDown => LogicalButton::DPadDown,
        PadButton::DPadLeft => LogicalButton::DPadLeft,
        PadButton::DPadRight => LogicalButton::DPadRight,
    }
}

/// Inverse of [`remap`] for the same layout/style pair.
///
/// Used by the suppression tracker to find the physical source of a
/// logical button, and by anything that must show glyphs for the pad the
/// user actually holds.
pub fn unmap(button: LogicalButton, layout: ControllerLayout, style: ControlStyle) -> PadButton {
    let ab = crosses_confirm_pair(layout, style);
    let xy = crosses_top_pair(layout);

    match button {
        LogicalButton::A if ab => PadButton::B,
        LogicalButton::B if ab => PadButton::A,
        LogicalButton::A => PadButton::A,
        LogicalButton::B => PadButton::B,
        LogicalButton::X if xy => PadButton::Y,
        LogicalButton::Y if xy => PadButton::X,
        LogicalButton::X => PadButton::X,
        LogicalButton::Y => PadButton::Y,
        LogicalButton::Start => PadButton::Start,
        LogicalButton::Select => PadButton::Select,
        LogicalButton::LeftBumper => PadButton::LeftBumper,
        LogicalButton::RightBumper => PadButton::RightBumper,
        LogicalButton::LeftTrigger => PadButton::LeftTrigger,
        LogicalButton::RightTrigger => PadButton::RightTrigger,
        LogicalButton::LeftStick => PadButton::LeftStick,
        LogicalButton::RightStick => PadButton::RightStick,
        LogicalButton::DPadUp => PadButton::DPadUp,
        LogicalButton::DPadDown => PadButton::DPadDown,
        LogicalButton::DPadLeft => PadButton::DPadLeft,
        LogicalButton::DPadRight => PadButton::DPadRight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUTS: [ControllerLayout; 3] = [
        ControllerLayout::SwitchLike,
        ControllerLayout::XboxLike,
        ControllerLayout::PlayStationLike,
    ];
    const STYLES: [ControlStyle; 2] = [
        ControlStyle::SwitchConvention,
        ControlStyle::XboxConvention,
    ];

    #[test]
    fn remap_then_unmap_is_identity() {
        for layout in LAYOUTS {
            for style in STYLES {
                for button in PadButton::ALL {
                    let logical = remap(button, layout, style);
                    assert_eq!(
                        unmap(logical, layout, style),
                        button,
                        "round trip failed for {:?} on {:?}/{:?}",
                        button,
                        layout,
                        style
                    );
                }
            }
        }
    }

    #[test]
    fn confirm_pair_crosses_on_convention_mismatch() {
        // Native pairings pass straight through.
        assert_eq!(
            remap(
                PadButton::A,
                ControllerLayout::SwitchLike,
                ControlStyle::SwitchConvention
            ),
            LogicalButton::A
        );
        assert_eq!(
            remap(
                PadButton::A,
                ControllerLayout::XboxLike,
                ControlStyle::XboxConvention
            ),
            LogicalButton::A
        );

        // Mismatched convention crosses A and B.
        assert_eq!(
            remap(
                PadButton::A,
                ControllerLayout::SwitchLike,
                ControlStyle::XboxConvention
            ),
            LogicalButton::B
        );
        assert_eq!(
            remap(
                PadButton::B,
                ControllerLayout::SwitchLike,
                ControlStyle::XboxConvention
            ),
            LogicalButton::A
        );
        assert_eq!(
            remap(
                PadButton::A,
                ControllerLayout::XboxLike,
                ControlStyle::SwitchConvention
            ),
            LogicalButton::B
        );
        assert_eq!(
            remap(
                PadButton::B,
                ControllerLayout::PlayStationLike,
                ControlStyle::SwitchConvention
            ),
            LogicalButton::A
        );
    }

    #[test]
    fn top_pair_crossing_ignores_style() {
        for style in STYLES {
            // Switch pads already label the top button X.
            assert_eq!(
                remap(PadButton::X, ControllerLayout::SwitchLike, style),
                LogicalButton::X
            );
            // Xbox-arranged pads label the top button Y; logical X stays on top.
            assert_eq!(
                remap(PadButton::Y, ControllerLayout::XboxLike, style),
                LogicalButton::X
            );
            assert_eq!(
                remap(PadButton::X, ControllerLayout::XboxLike, style),
                LogicalButton::Y
            );
            assert_eq!(
                remap(PadButton::Y, ControllerLayout::PlayStationLike, style),
                LogicalButton::X
            );
        }
    }

    #[test]
    fn non_face_buttons_are_untouched() {
        for layout in LAYOUTS {
            for style in STYLES {
                assert_eq!(
                    remap(PadButton::LeftBumper, layout, style),
                    LogicalButton::LeftBumper
                );
                assert_eq!(
                    remap(PadButton::DPadLeft, layout, style),
                    LogicalButton::DPadLeft
                );
                assert_eq!(remap(PadButton::Start, layout, style), LogicalButton::Start);
            }
        }
    }
}
