//! Button bitmask shared by every controller backend
//!
//! Bit values follow the XInput `wButtons` layout so a sample from any backend
//! reads the same. The two analog triggers have no bit of their own in XInput;
//! they are folded in as synthetic bits above the 16-bit range.

use bitflags::bitflags;

bitflags! {
    /// Set of buttons held in a single sample
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u32 {
        const DPAD_UP        = 0x0001;
        const DPAD_DOWN      = 0x0002;
        const DPAD_LEFT      = 0x0004;
        const DPAD_RIGHT     = 0x0008;
        const START          = 0x0010;
        const BACK           = 0x0020;
        const LEFT_THUMB     = 0x0040;
        const RIGHT_THUMB    = 0x0080;
        const LEFT_SHOULDER  = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const A              = 0x1000;
        const B              = 0x2000;
        const X              = 0x4000;
        const Y              = 0x8000;
        // Synthetic: trigger axis past threshold
        const LEFT_TRIGGER   = 0x1_0000;
        const RIGHT_TRIGGER  = 0x2_0000;
    }
}

/// A trigger counts as held on any nonzero reading, there is no dead zone.
pub fn trigger_held(raw: u8) -> bool {
    raw != 0
}

/// Folds both trigger axes (0-255) into the bitmask as synthetic buttons
pub fn fold_triggers(buttons: Buttons, left: u8, right: u8) -> Buttons {
    let mut folded = buttons;
    if trigger_held(left) {
        folded |= Buttons::LEFT_TRIGGER;
    }
    if trigger_held(right) {
        folded |= Buttons::RIGHT_TRIGGER;
    }
    folded
}

/// Scales a normalized axis value (0.0-1.0) onto the 0-255 trigger range
pub fn trigger_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
}
