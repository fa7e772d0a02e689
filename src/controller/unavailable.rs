//! Stand-in source for when the gamepad backend could not start
//!
//! Reports "not connected" forever, so startup takes the regular
//! Disconnected path instead of aborting with an error report.

use tracing::debug;

use super::{ControllerSource, InputSample};
use crate::haptics::Pulse;

#[derive(Debug)]
pub struct UnavailableController {
    reason: String,
}

impl UnavailableController {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ControllerSource for UnavailableController {
    fn is_connected(&mut self) -> bool {
        debug!("Controller backend unavailable: {}", self.reason);
        false
    }

    fn sample(&mut self) -> InputSample {
        InputSample::default()
    }

    fn vibrate(&self, _pulse: Pulse) {}
}
