//! Trigger engine - the per-message decision pipeline.
//!
//! While a session is armed, every decoded MIDI message runs through a chain
//! of pure filters: Control Change only, value over threshold, controller
//! bound, cooldown elapsed. Only a message that clears all four reaches the
//! injector, and then the whole chord is emitted or nothing is.

mod debounce;
mod map;


pub use debounce::DebounceGate;
pub use map::TriggerMap;

use std::time::Instant;
use tracing::{debug, trace};

use crate::keys::KeyInjector;
use crate::midi::MidiMessage;

pub struct TriggerEngine {
    map: TriggerMap,
    gate: DebounceGate,
    threshold: u8,
}

impl TriggerEngine {
    pub fn new(map: TriggerMap, gate: DebounceGate, threshold: u8) -> Self {
        Self { map, gate, threshold }
    }

    /// Run one decoded message through the filter chain, emitting the bound
    /// chord through `keys` if every filter admits it.
    ///
    /// Returns whether a trigger fired.
    pub fn handle(&mut self, message: &MidiMessage, now: Instant, keys: &mut dyn KeyInjector) -> bool {
        let MidiMessage::ControlChange { controller, value, .. } = *message else {
            return false;
        };

        if value < self.threshold {
            trace!(controller, value, "below trigger threshold");
            return false;
        }

        let Some(action) = self.map.resolve(controller) else {
            trace!(controller, "controller not bound");
            return false;
        };

        if !self.gate.try_admit(now) {
            debug!(controller, "suppressed by cooldown");
            return false;
        }

        // Press the chord in order, release in reverse so modifiers stay
        // held around the main key (Shift+Space, not Shift, Space).
        for &key in action {
            keys.key_down(key);
        }
        for &key in action.iter().rev() {
            keys.key_up(key);
        }

        debug!(controller, value, "trigger fired");
        true
    }
}
