//! pedalflip - turn MIDI pedal presses into page-turn keystrokes.
//!
//! The core pipeline: a device registry tracks hot-pluggable MIDI inputs, a
//! session controller arms the trigger engine against one of them, and every
//! inbound Control Change that clears the threshold and cooldown filters
//! becomes a synthesized keystroke chord.

pub mod cli;
pub mod config;
pub mod devices;
pub mod engine;
pub mod keys;
pub mod midi;
pub mod ports;
pub mod session;

pub use config::AppConfig;
pub use devices::{DeviceDescriptor, DeviceEvent, DeviceRegistry};
pub use engine::{DebounceGate, TriggerEngine, TriggerMap};
pub use keys::{EnigoInjector, KeyInjector, VirtualKey};
pub use midi::{MidiEvent, MidiMessage};
pub use session::{SessionController, SessionError, SessionStatus};
