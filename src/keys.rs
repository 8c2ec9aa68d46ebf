//! Virtual keys and keystroke injection.
//!
//! The engine emits abstract [`VirtualKey`]s through the [`KeyInjector`]
//! trait; the enigo-backed implementation turns them into real OS input.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Abstract key codes a trigger action may emit.
///
/// Names match what users write in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum VirtualKey {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Space,
    Enter,
    Tab,
    Escape,
    Home,
    End,
    Shift,
    Control,
    Alt,
}

impl VirtualKey {
    fn to_enigo(self) -> Key {
        match self {
            VirtualKey::Left => Key::LeftArrow,
            VirtualKey::Right => Key::RightArrow,
            VirtualKey::Up => Key::UpArrow,
            VirtualKey::Down => Key::DownArrow,
            VirtualKey::PageUp => Key::PageUp,
            VirtualKey::PageDown => Key::PageDown,
            VirtualKey::Space => Key::Space,
            VirtualKey::Enter => Key::Return,
            VirtualKey::Tab => Key::Tab,
            VirtualKey::Escape => Key::Escape,
            VirtualKey::Home => Key::Home,
            VirtualKey::End => Key::End,
            VirtualKey::Shift => Key::Shift,
            VirtualKey::Control => Key::Control,
            VirtualKey::Alt => Key::Alt,
        }
    }
}

/// Errors that can occur while setting up key injection.
#[derive(Debug, Error)]
pub enum InjectorError {
    /// The OS input system refused to initialize (missing permissions,
    /// headless session).
    #[error("failed to initialize key injection: {0}")]
    Init(String),
}

/// Fire-and-forget keystroke sink.
///
/// Implementations must not block: the engine calls this from the event loop
/// and never awaits a completion.
pub trait KeyInjector: Send {
    fn key_down(&mut self, key: VirtualKey);
    fn key_up(&mut self, key: VirtualKey);
}

/// OS-level injector backed by enigo.
///
/// Injection failures are logged and swallowed; a dropped keystroke is not
/// worth tearing the session down for.
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    pub fn new() -> Result<Self, InjectorError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| InjectorError::Init(e.to_string()))?;
        Ok(Self { enigo })
    }
}

impl KeyInjector for EnigoInjector {
    fn key_down(&mut self, key: VirtualKey) {
        if let Err(e) = self.enigo.key(key.to_enigo(), Direction::Press) {
            warn!("key press failed for {:?}: {}", key, e);
        }
    }

    fn key_up(&mut self, key: VirtualKey) {
        if let Err(e) = self.enigo.key(key.to_enigo(), Direction::Release) {
            warn!("key release failed for {:?}: {}", key, e);
        }
    }
}

impl std::fmt::Debug for EnigoInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnigoInjector").finish_non_exhaustive()
    }
}
