//! gilrs backend for [`ControllerSource`]
//!
//! gilrs only updates its cached gamepad state while events are drained, so
//! every query pumps the event queue first. Each event for the bound gamepad
//! advances the packet counter, which gives the same "new data since last
//! poll" signal as an XInput packet number.

use std::fmt;
use std::sync::{Arc, Mutex};

use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Repeat, Replay, Ticks};
use gilrs::{Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, trace, warn};

use super::buttons::{fold_triggers, trigger_byte, Buttons};
use super::{ControllerError, ControllerSource, InputSample};
use crate::haptics::{spawn_pulse, HapticDevice, NoRumble, Pulse};

// Length of one rumble period; the effect repeats it until stopped
const RUMBLE_PERIOD_MS: u32 = 50;

const BUTTON_MAP: [(Button, Buttons); 14] = [
    (Button::DPadUp, Buttons::DPAD_UP),
    (Button::DPadDown, Buttons::DPAD_DOWN),
    (Button::DPadLeft, Buttons::DPAD_LEFT),
    (Button::DPadRight, Buttons::DPAD_RIGHT),
    (Button::Start, Buttons::START),
    (Button::Select, Buttons::BACK),
    (Button::LeftThumb, Buttons::LEFT_THUMB),
    (Button::RightThumb, Buttons::RIGHT_THUMB),
    (Button::LeftTrigger, Buttons::LEFT_SHOULDER),
    (Button::RightTrigger, Buttons::RIGHT_SHOULDER),
    (Button::South, Buttons::A),
    (Button::East, Buttons::B),
    (Button::West, Buttons::X),
    (Button::North, Buttons::Y),
];

#[derive(Debug)]
pub struct GamepadController {
    // Gilrs context
    gilrs: Gilrs,

    // Position in gilrs' gamepad enumeration
    slot: usize,

    // Gamepad currently occupying the slot
    active_gamepad: Option<GamepadId>,

    // Events seen for the active gamepad
    packet: u32,

    rumble_enabled: bool,
    rumble: Arc<dyn HapticDevice>,
}

impl GamepadController {
    pub fn open(slot: usize, rumble_enabled: bool) -> Result<Self, ControllerError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(gilrs::Error::NotImplemented(dummy)) => {
                // Usable context without gamepads, startup reports Disconnected
                warn!("gilrs has no backend for this platform, no gamepads will be found");
                dummy
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(ControllerError::InitializationError(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            slot,
            active_gamepad: None,
            packet: 0,
            rumble_enabled,
            rumble: Arc::new(NoRumble),
        })
    }

    fn pump(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => info!("Gamepad {} connected", id),
                EventType::Disconnected => warn!("Gamepad {} disconnected", id),
                _ => trace!("gilrs event {:?} from {}", event, id),
            }

            if Some(id) == self.active_gamepad {
                self.packet = self.packet.wrapping_add(1);
            }
        }
    }

    fn bind(&mut self, id: GamepadId, name: &str, ff_supported: bool) {
        info!("Bound slot {} to gamepad {} ({})", self.slot, name, id);
        self.active_gamepad = Some(id);

        self.rumble = if !self.rumble_enabled {
            debug!("Rumble disabled by config");
            Arc::new(NoRumble)
        } else if !ff_supported {
            warn!("Gamepad {} has no force feedback support", name);
            Arc::new(NoRumble)
        } else {
            match GilrsRumble::new(&mut self.gilrs, id) {
                Ok(rumble) => Arc::new(rumble),
                Err(e) => {
                    warn!("{}", e);
                    Arc::new(NoRumble)
                }
            }
        };
    }
}

impl ControllerSource for GamepadController {
    fn is_connected(&mut self) -> bool {
        self.pump();

        let found = self
            .gilrs
            .gamepads()
            .nth(self.slot)
            .map(|(id, gamepad)| (id, gamepad.name().to_string(), gamepad.is_ff_supported()));

        match found {
            Some((id, name, ff_supported)) => {
                if self.active_gamepad != Some(id) {
                    self.bind(id, &name, ff_supported);
                }
                true
            }
            None => {
                debug!("No gamepad in slot {}", self.slot);
                false
            }
        }
    }

    fn sample(&mut self) -> InputSample {
        self.pump();

        let buttons = match self
            .active_gamepad
            .and_then(|id| self.gilrs.connected_gamepad(id))
        {
            Some(gamepad) => read_buttons(&gamepad),
            None => Buttons::empty(),
        };

        InputSample {
            packet: self.packet,
            buttons,
        }
    }

    fn vibrate(&self, pulse: Pulse) {
        // Detached; the loop never waits on a pulse
        let _ = spawn_pulse(self.rumble.clone(), pulse);
    }
}

fn read_buttons(gamepad: &Gamepad<'_>) -> Buttons {
    let held = BUTTON_MAP
        .iter()
        .filter(|(button, _)| gamepad.is_pressed(*button))
        .fold(Buttons::empty(), |mask, (_, bit)| mask | *bit);

    let left = trigger_byte(axis_value(gamepad, Button::LeftTrigger2));
    let right = trigger_byte(axis_value(gamepad, Button::RightTrigger2));
    fold_triggers(held, left, right)
}

fn axis_value(gamepad: &Gamepad<'_>, button: Button) -> f32 {
    gamepad
        .button_data(button)
        .map(|data| data.value())
        .unwrap_or(0.0)
}

/// Both motors of one gamepad driven through a single repeating effect
///
/// The effect runs at full magnitude and the requested intensity is applied
/// as gain, so one effect covers every speed.
pub struct GilrsRumble {
    effect: Mutex<Effect>,
}

impl GilrsRumble {
    pub fn new(gilrs: &mut Gilrs, id: GamepadId) -> Result<Self, ControllerError> {
        let scheduling = Replay {
            play_for: Ticks::from_ms(RUMBLE_PERIOD_MS),
            ..Default::default()
        };

        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: u16::MAX,
                },
                scheduling,
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: u16::MAX,
                },
                scheduling,
                ..Default::default()
            })
            .repeat(Repeat::Infinitely)
            .gamepads(&[id])
            .finish(gilrs)
            .map_err(|e| ControllerError::ForceFeedbackError(e.to_string()))?;

        debug!("Created rumble effect for gamepad {}", id);
        Ok(Self {
            effect: Mutex::new(effect),
        })
    }
}

impl HapticDevice for GilrsRumble {
    fn set_motors(&self, intensity: u16) {
        let Ok(effect) = self.effect.lock() else {
            return;
        };

        let result = if intensity == 0 {
            effect.stop()
        } else {
            effect
                .set_gain(intensity as f32 / u16::MAX as f32)
                .and_then(|_| effect.play())
        };

        if let Err(e) = result {
            debug!("Rumble command ignored: {}", e);
        }
    }
}

impl fmt::Debug for GilrsRumble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GilrsRumble").finish_non_exhaustive()
    }
}
