//! Controller subsystem for gamepad input handling
//!
//! Input flows through two stages:
//!
//! 1. [`ControllerSource`] - polls the hardware into raw [`InputSample`]s
//! 2. [`edge_detector`] - turns held-button samples into one-shot press events
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► ControllerSource ──► EdgeDetector ──► press event
//!             (InputSample)        (Option<Buttons>)
//! ```
//!
//! [`gamepad`] is the gilrs backend, [`unavailable`] stands in when that
//! backend cannot start. Tests drive the same pipeline with a scripted source
//! instead of real hardware.

pub mod buttons;
pub mod edge_detector;
pub mod gamepad;
#[cfg(test)]
pub mod scripted;
pub mod unavailable;

use std::fmt;

pub use buttons::Buttons;
pub use edge_detector::EdgeDetector;
pub use gamepad::GamepadController;
pub use unavailable::UnavailableController;

use crate::haptics::Pulse;

/// One poll of a controller
///
/// The packet number only changes when the hardware reports something new,
/// so two samples with the same packet number carry the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSample {
    pub packet: u32,
    pub buttons: Buttons,
}

/// A controller the game loop can poll and rumble
///
/// None of these calls may block the caller or fail loudly. A controller that
/// went away just reports `false` and an empty or stale sample.
pub trait ControllerSource: fmt::Debug {
    /// Polls the platform for the bound slot
    fn is_connected(&mut self) -> bool;

    /// Latest held buttons with synthetic trigger bits folded in
    fn sample(&mut self) -> InputSample;

    /// Fire-and-forget rumble pulse on both motors
    fn vibrate(&self, pulse: Pulse);
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),

    #[error("Failed to set up force feedback: {0}")]
    ForceFeedbackError(String),
}
