//! Haptic feedback
//!
//! A pulse drives both rumble motors at a fixed intensity for a fixed time and
//! then switches them off. The hold runs on its own tokio task so the caller
//! never waits for it. Pulses are best-effort: nothing reports back and
//! overlapping pulses simply overwrite each other's motor speed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{CONNECT_PULSE_MS, HIT_PULSE_MS, MISS_PULSE_MS, VIBRATION_INTENSITY};

/// Motor control for one controller
///
/// Implementations must tolerate being called from any thread and must
/// swallow their own failures.
pub trait HapticDevice: Send + Sync + fmt::Debug {
    /// Sets both motors to `intensity`, zero stops them
    fn set_motors(&self, intensity: u16);
}

/// Device for controllers without rumble support, or with rumble turned off
#[derive(Debug, Default)]
pub struct NoRumble;

impl HapticDevice for NoRumble {
    fn set_motors(&self, _intensity: u16) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub intensity: u16,
    pub duration: Duration,
}

impl Pulse {
    pub const fn new(intensity: u16, duration_ms: u64) -> Self {
        Self {
            intensity,
            duration: Duration::from_millis(duration_ms),
        }
    }

    /// Confirmation that the controller was found
    pub const CONNECTED: Pulse = Pulse::new(VIBRATION_INTENSITY, CONNECT_PULSE_MS);

    /// Correct button
    pub const HIT: Pulse = Pulse::new(VIBRATION_INTENSITY, HIT_PULSE_MS);

    /// Wrong button
    pub const MISS: Pulse = Pulse::new(VIBRATION_INTENSITY, MISS_PULSE_MS);
}

/// Plays `pulse` on a detached task
///
/// Returns the task handle only so tests can wait for completion; callers in
/// the game loop drop it. Without a tokio runtime the pulse is skipped.
pub fn spawn_pulse(device: Arc<dyn HapticDevice>, pulse: Pulse) -> Option<JoinHandle<()>> {
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("No runtime available for haptic pulse: {}", e);
            return None;
        }
    };

    debug!(
        "Spawning haptic pulse: intensity {} for {:?}",
        pulse.intensity, pulse.duration
    );
    Some(handle.spawn(async move {
        device.set_motors(pulse.intensity);
        tokio::time::sleep(pulse.duration).await;
        device.set_motors(0);
    }))
}
