//! Session lifecycle: arming the trigger engine against a chosen device.
//!
//! The controller is the single owner of session state. It opens the input
//! stream, builds a fresh engine per session, and tears everything down on
//! stop or when the active device disappears from the registry.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError};
use crate::devices::DeviceDescriptor;
use crate::engine::{DebounceGate, TriggerEngine, TriggerMap};
use crate::keys::KeyInjector;
use crate::midi::MidiEvent;

/// Errors surfaced to the UI layer when starting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no MIDI input devices available")]
    NoDevicesAvailable,

    #[error("device '{0}' is no longer connected")]
    DeviceNotFound(String),

    #[error("could not open MIDI input stream: {0}")]
    StreamOpenFailed(String),

    #[error("invalid trigger configuration: {0}")]
    InvalidTriggers(#[from] ConfigError),
}

/// An open, message-pushing input stream. Dropping it closes the connection
/// and unregisters the platform callback.
pub trait InputStream: Send {}

/// Platform capability: open the input stream for one device.
///
/// Implementations parse inbound bytes and `try_send` decoded events on
/// `tx`; the callback thread must never block.
#[async_trait]
pub trait InputPortOpener: Send + Sync {
    async fn open(
        &self,
        device: &DeviceDescriptor,
        tx: mpsc::Sender<MidiEvent>,
    ) -> Result<Box<dyn InputStream>, SessionError>;
}

/// Published session status for observers (status line, badge, REPL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Active { device_id: String, device_name: String },
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Active { device_name, .. } => write!(f, "active on {}", device_name),
        }
    }
}

struct ActiveSession {
    device_id: String,
    engine: TriggerEngine,
    // Held for its Drop side effect: closes the input stream.
    _stream: Box<dyn InputStream>,
}

pub struct SessionController<I: KeyInjector> {
    opener: Arc<dyn InputPortOpener>,
    injector: I,
    midi_tx: mpsc::Sender<MidiEvent>,
    active: Option<ActiveSession>,
    status_tx: watch::Sender<SessionStatus>,
}

impl<I: KeyInjector> SessionController<I> {
    pub fn new(
        opener: Arc<dyn InputPortOpener>,
        injector: I,
        midi_tx: mpsc::Sender<MidiEvent>,
    ) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        Self { opener, injector, midi_tx, active: None, status_tx }
    }

    /// Subscribe to status transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_device_id(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.device_id.as_str())
    }

    /// Start a session on `device_id`, replacing any active one.
    ///
    /// `devices` is the last-published registry snapshot; a stale selection
    /// fails with [`SessionError::DeviceNotFound`]. On any failure the
    /// controller is left idle, no retry is attempted.
    pub async fn start(
        &mut self,
        device_id: &str,
        devices: &[DeviceDescriptor],
        config: &AppConfig,
    ) -> Result<(), SessionError> {
        // Idempotent restart: tear the old session down first.
        self.stop();

        if devices.is_empty() {
            return Err(SessionError::NoDevicesAvailable);
        }

        let device = devices
            .iter()
            .find(|d| d.id == device_id)
            .ok_or_else(|| SessionError::DeviceNotFound(device_id.to_string()))?
            .clone();

        let map = TriggerMap::new(&config.triggers)?;
        let stream = self.opener.open(&device, self.midi_tx.clone()).await?;

        let engine = TriggerEngine::new(map, DebounceGate::new(config.cooldown()), config.threshold);
        self.active = Some(ActiveSession {
            device_id: device.id.clone(),
            engine,
            _stream: stream,
        });

        info!(device = %device.name, "session started");
        self.status_tx.send_replace(SessionStatus::Active {
            device_id: device.id,
            device_name: device.name,
        });
        Ok(())
    }

    /// Stop the active session. Safe to call when idle: a second stop does
    /// nothing and publishes nothing.
    pub fn stop(&mut self) {
        if let Some(session) = self.active.take() {
            drop(session);
            info!("session stopped");
            self.status_tx.send_replace(SessionStatus::Idle);
        }
    }

    /// Feed one decoded MIDI event to the engine; no-op while idle.
    pub fn on_midi(&mut self, event: &MidiEvent) -> bool {
        match &mut self.active {
            Some(session) => {
                session
                    .engine
                    .handle(&event.message, event.timestamp, &mut self.injector)
            }
            None => false,
        }
    }

    /// Device-removal path: force-stop when the active device is gone from
    /// the new registry snapshot. Losing a pedal is an expected event, not
    /// an error.
    pub fn on_devices_changed(&mut self, devices: &[DeviceDescriptor]) {
        let gone = self
            .active
            .as_ref()
            .is_some_and(|session| !devices.iter().any(|d| d.id == session.device_id));
        if gone {
            warn!("active MIDI device disconnected");
            self.stop();
        }
    }
}
