//! midir-backed platform capabilities: enumeration, hot-plug watching and
//! input streams.
//!
//! midir exposes no OS device watcher, so hot-plug is realized as a polling
//! diff task that reports Added/Removed events; the registry re-enumerates
//! on every event anyway, so the watcher only has to notice that something
//! changed, not what.

use async_trait::async_trait;
use midir::{MidiInput, MidiInputConnection};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::devices::{DeviceDescriptor, DeviceEnumerator, DeviceEvent};
use crate::midi::{format_hex, MidiEvent, MidiMessage};
use crate::session::{InputPortOpener, InputStream, SessionError};

const CLIENT_NAME: &str = "pedalflip";

/// Default polling interval for the hot-plug watcher.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(1);

fn input_ports() -> Result<Vec<DeviceDescriptor>, midir::InitError> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;

    let mut devices = Vec::new();
    for port in midi_in.ports() {
        if let Ok(name) = midi_in.port_name(&port) {
            devices.push(DeviceDescriptor { id: port.id(), name });
        }
    }
    Ok(devices)
}

/// Enumerates MIDI input ports through midir.
pub struct MidirEnumerator;

#[async_trait]
impl DeviceEnumerator for MidirEnumerator {
    async fn enumerate(&self) -> Vec<DeviceDescriptor> {
        match input_ports() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("MIDI enumeration failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Spawn the polling watcher. The first scan reports EnumerationCompleted;
/// later scans diff port ids and report Added/Removed.
pub fn spawn_port_watcher(interval: Duration) -> mpsc::Receiver<DeviceEvent> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut known: Option<HashSet<String>> = None;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let ids: HashSet<String> = match input_ports() {
                Ok(devices) => devices.into_iter().map(|d| d.id).collect(),
                Err(e) => {
                    warn!("MIDI port scan failed: {}", e);
                    continue;
                }
            };

            let events = match &known {
                None => vec![DeviceEvent::EnumerationCompleted],
                Some(prev) => {
                    let mut events = Vec::new();
                    if ids.difference(prev).next().is_some() {
                        events.push(DeviceEvent::Added);
                    }
                    if prev.difference(&ids).next().is_some() {
                        events.push(DeviceEvent::Removed);
                    }
                    events
                }
            };
            known = Some(ids);

            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    });

    rx
}

/// Opens midir input connections that decode and forward messages.
pub struct MidirPortOpener;

struct MidirStream {
    _conn: MidiInputConnection<()>,
}

impl InputStream for MidirStream {}

#[async_trait]
impl InputPortOpener for MidirPortOpener {
    async fn open(
        &self,
        device: &DeviceDescriptor,
        tx: mpsc::Sender<MidiEvent>,
    ) -> Result<Box<dyn InputStream>, SessionError> {
        let midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|e| SessionError::StreamOpenFailed(e.to_string()))?;

        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| p.id() == device.id)
            .ok_or_else(|| {
                SessionError::StreamOpenFailed(format!("port '{}' no longer present", device.name))
            })?;

        let conn = midi_in
            .connect(
                &port,
                CLIENT_NAME,
                move |_timestamp, data, _| {
                    if let Some(message) = MidiMessage::parse(data) {
                        let event = MidiEvent {
                            timestamp: Instant::now(),
                            message,
                            raw: data.to_vec(),
                        };
                        // Never block the midir thread; a full queue just
                        // drops the tail of a burst.
                        let _ = tx.try_send(event);
                    } else {
                        debug!("unparsed MIDI bytes: {}", format_hex(data));
                    }
                },
                (),
            )
            .map_err(|e| SessionError::StreamOpenFailed(e.to_string()))?;

        Ok(Box::new(MidirStream { _conn: conn }))
    }
}

/// Print available MIDI input ports (for `--list-ports`).
pub fn list_ports_formatted() {
    use colored::*;

    println!("\n{}", "=== MIDI Input Ports ===".bold().cyan());
    match input_ports() {
        Ok(devices) if devices.is_empty() => {
            println!("  {}", "No MIDI input devices found".yellow());
        }
        Ok(devices) => {
            for (index, device) in devices.iter().enumerate() {
                println!("  {}: {}", index, device.name.green());
            }
        }
        Err(e) => {
            println!("  {}", format!("enumeration failed: {}", e).red());
        }
    }
    println!();
}
