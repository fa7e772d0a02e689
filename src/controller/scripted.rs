//! Scripted controller for driving the game loop without hardware

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Buttons, ControllerSource, InputSample};
use crate::haptics::Pulse;

/// Shared view into what the game loop did with a [`ScriptedController`]
#[derive(Debug, Clone, Default)]
pub struct ScriptRecord {
    pulses: Arc<Mutex<Vec<Pulse>>>,
    samples_taken: Arc<Mutex<usize>>,
}

impl ScriptRecord {
    pub fn pulses(&self) -> Vec<Pulse> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn samples_taken(&self) -> usize {
        self.samples_taken.lock().map(|n| *n).unwrap_or_default()
    }
}

/// Replays samples in order, then keeps repeating the last one
#[derive(Debug)]
pub struct ScriptedController {
    connected: bool,
    script: VecDeque<InputSample>,
    last: InputSample,
    record: ScriptRecord,
}

impl ScriptedController {
    pub fn new(connected: bool, script: impl IntoIterator<Item = (u32, Buttons)>) -> Self {
        Self {
            connected,
            script: script
                .into_iter()
                .map(|(packet, buttons)| InputSample { packet, buttons })
                .collect(),
            last: InputSample::default(),
            record: ScriptRecord::default(),
        }
    }

    pub fn record(&self) -> ScriptRecord {
        self.record.clone()
    }
}

impl ControllerSource for ScriptedController {
    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn sample(&mut self) -> InputSample {
        if let Ok(mut taken) = self.record.samples_taken.lock() {
            *taken += 1;
        }
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }

    fn vibrate(&self, pulse: Pulse) {
        if let Ok(mut pulses) = self.record.pulses.lock() {
            pulses.push(pulse);
        }
    }
}
