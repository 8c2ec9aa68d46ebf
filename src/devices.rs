//! MIDI input device registry.
//!
//! Tracks which input devices are currently connected and republishes the
//! full ordered list whenever the platform watcher reports any change. The
//! registry never interprets event payloads: every watcher callback means
//! "re-enumerate", which keeps hot-plug races from leaving a stale list.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// A connected MIDI input device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Stable platform identifier; only valid while the device stays
    /// connected.
    pub id: String,
    /// Human-readable name for device pickers.
    pub name: String,
}

/// Device watcher notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    Added,
    Removed,
    Updated,
    EnumerationCompleted,
}

/// Platform capability: enumerate currently connected MIDI input devices.
#[async_trait]
pub trait DeviceEnumerator: Send + Sync {
    async fn enumerate(&self) -> Vec<DeviceDescriptor>;
}

/// The last fully-published snapshot, in enumeration (= display) order.
pub type DeviceList = Arc<Vec<DeviceDescriptor>>;

pub struct DeviceRegistry {
    enumerator: Arc<dyn DeviceEnumerator>,
    devices: DeviceList,
    tx: watch::Sender<DeviceList>,
}

impl DeviceRegistry {
    pub fn new(enumerator: Arc<dyn DeviceEnumerator>) -> Self {
        let devices: DeviceList = Arc::new(Vec::new());
        let (tx, _) = watch::channel(devices.clone());
        Self { enumerator, devices, tx }
    }

    /// Subscribe to list updates. The receiver always observes the last
    /// fully-published snapshot, never a mid-refresh state.
    pub fn subscribe(&self) -> watch::Receiver<DeviceList> {
        self.tx.subscribe()
    }

    pub fn devices(&self) -> DeviceList {
        self.devices.clone()
    }

    /// Re-enumerate and atomically replace the published list.
    ///
    /// Publishes unconditionally: an empty list is the "no devices" state
    /// the UI shows, not a failure.
    pub async fn refresh(&mut self) -> DeviceList {
        let mut fresh = self.enumerator.enumerate().await;

        // Enumeration order is display order; ids must stay unique.
        let mut seen = HashSet::new();
        fresh.retain(|device| seen.insert(device.id.clone()));

        let list: DeviceList = Arc::new(fresh);
        self.devices = list.clone();
        self.tx.send_replace(list.clone());
        debug!(count = list.len(), "device list published");
        list
    }

    /// Platform watcher entry point: exactly one refresh per event,
    /// whatever its kind.
    pub async fn on_device_event(&mut self, event: DeviceEvent) -> DeviceList {
        debug!(?event, "device watcher event");
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeEnumerator {
        devices: Mutex<Vec<DeviceDescriptor>>,
        calls: AtomicUsize,
    }

    impl FakeEnumerator {
        fn new(devices: Vec<DeviceDescriptor>) -> Arc<Self> {
            Arc::new(Self { devices: Mutex::new(devices), calls: AtomicUsize::new(0) })
        }

        fn set_devices(&self, devices: Vec<DeviceDescriptor>) {
            *self.devices.lock().unwrap() = devices;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DeviceEnumerator for FakeEnumerator {
        async fn enumerate(&self) -> Vec<DeviceDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.devices.lock().unwrap().clone()
        }
    }

    fn device(id: &str, name: &str) -> DeviceDescriptor {
        DeviceDescriptor { id: id.to_string(), name: name.to_string() }
    }

    #[tokio::test]
    async fn enumeration_completed_publishes_the_full_list_once() {
        let enumerator = FakeEnumerator::new(vec![
            device("dev-1", "Pedal One"),
            device("dev-2", "Pedal Two"),
        ]);
        let mut registry = DeviceRegistry::new(enumerator.clone());
        let mut rx = registry.subscribe();

        assert!(registry.devices().is_empty());

        let list = registry.on_device_event(DeviceEvent::EnumerationCompleted).await;
        assert_eq!(
            *list,
            vec![device("dev-1", "Pedal One"), device("dev-2", "Pedal Two")]
        );

        // Exactly one notification for the event.
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(enumerator.calls(), 1);
    }

    #[tokio::test]
    async fn every_event_kind_triggers_exactly_one_refresh() {
        let enumerator = FakeEnumerator::new(vec![device("dev-1", "Pedal")]);
        let mut registry = DeviceRegistry::new(enumerator.clone());

        for event in [
            DeviceEvent::Added,
            DeviceEvent::Removed,
            DeviceEvent::Updated,
            DeviceEvent::EnumerationCompleted,
        ] {
            registry.on_device_event(event).await;
        }

        assert_eq!(enumerator.calls(), 4);
    }

    #[tokio::test]
    async fn removal_event_shrinks_the_list() {
        let enumerator = FakeEnumerator::new(vec![
            device("dev-1", "Pedal One"),
            device("dev-2", "Pedal Two"),
        ]);
        let mut registry = DeviceRegistry::new(enumerator.clone());
        registry.refresh().await;

        enumerator.set_devices(vec![device("dev-2", "Pedal Two")]);
        let list = registry.on_device_event(DeviceEvent::Removed).await;
        assert_eq!(*list, vec![device("dev-2", "Pedal Two")]);
    }

    #[tokio::test]
    async fn empty_enumeration_still_publishes() {
        let enumerator = FakeEnumerator::new(vec![device("dev-1", "Pedal")]);
        let mut registry = DeviceRegistry::new(enumerator.clone());
        registry.refresh().await;

        let mut rx = registry.subscribe();
        enumerator.set_devices(Vec::new());
        registry.on_device_event(DeviceEvent::Removed).await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_collapsed_keeping_first() {
        let enumerator = FakeEnumerator::new(vec![
            device("dev-1", "Pedal"),
            device("dev-1", "Pedal (ghost)"),
            device("dev-2", "Other"),
        ]);
        let mut registry = DeviceRegistry::new(enumerator);

        let list = registry.refresh().await;
        assert_eq!(
            *list,
            vec![device("dev-1", "Pedal"), device("dev-2", "Other")]
        );
    }
}
