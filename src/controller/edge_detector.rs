//! Edge Detector - turns held-button samples into one-shot press events
//!
//! A physical controller keeps reporting a button as held for every poll
//! while the finger is down. The detector emits the held mask once, then
//! suppresses it until the buttons are released.

use tracing::{debug, trace};

use super::buttons::Buttons;
use super::InputSample;

#[derive(Debug, Default)]
pub struct EdgeDetector {
    // Packet number of the last sample that carried new data
    last_packet: Option<u32>,

    // Mask of the last emitted event, held until fully released
    suppressed: Option<Buttons>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one sample and returns the press event it produces, if any
    ///
    /// At most one event comes out per call. A combo of several buttons is
    /// returned as a single mask.
    pub fn observe(&mut self, sample: InputSample) -> Option<Buttons> {
        if self.last_packet == Some(sample.packet) {
            trace!("Packet {} already seen, no new input", sample.packet);
            return None;
        }
        self.last_packet = Some(sample.packet);

        let held = sample.buttons;

        if let Some(suppressed) = self.suppressed {
            if held.intersects(suppressed) {
                trace!("Still holding {:?}, waiting for release", suppressed);
                return None;
            }
            debug!("Released {:?}", suppressed);
            self.suppressed = None;
        }

        if held.is_empty() {
            return None;
        }

        debug!("Press event {:?} from packet {}", held, sample.packet);
        self.suppressed = Some(held);
        Some(held)
    }

    /// Mask currently waiting for release
    pub fn suppressed(&self) -> Option<Buttons> {
        self.suppressed
    }
}
