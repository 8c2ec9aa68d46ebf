//! Controller-number → key-action lookup table.

use crate::config::{ConfigError, TriggerConfig, MAX_TRIGGERS};
use crate::keys::VirtualKey;

/// Immutable mapping from controller number to the chord it fires.
///
/// Built once per session; a linear scan over at most [`MAX_TRIGGERS`]
/// entries is the O(1) lookup.
#[derive(Debug, Clone)]
pub struct TriggerMap {
    bindings: Vec<(u8, Vec<VirtualKey>)>,
}

impl TriggerMap {
    /// Build the map from trigger configs, rejecting anything that could
    /// make two bindings fight over the same pedal.
    ///
    /// Keeping both selectors off the same controller number is the UI
    /// layer's job; here a duplicate is simply a hard error.
    pub fn new(triggers: &[TriggerConfig]) -> Result<Self, ConfigError> {
        if triggers.is_empty() {
            return Err(ConfigError::NoTriggers);
        }
        if triggers.len() > MAX_TRIGGERS {
            return Err(ConfigError::TooManyTriggers(triggers.len()));
        }

        let mut bindings: Vec<(u8, Vec<VirtualKey>)> = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            if trigger.controller > 127 {
                return Err(ConfigError::ControllerOutOfRange(trigger.controller));
            }
            if trigger.keys.is_empty() {
                return Err(ConfigError::EmptyAction(trigger.controller));
            }
            if bindings.iter().any(|(c, _)| *c == trigger.controller) {
                return Err(ConfigError::DuplicateController(trigger.controller));
            }
            bindings.push((trigger.controller, trigger.keys.clone()));
        }

        Ok(Self { bindings })
    }

    /// Look up the action bound to a controller number, if any.
    pub fn resolve(&self, controller: u8) -> Option<&[VirtualKey]> {
        self.bindings
            .iter()
            .find(|(c, _)| *c == controller)
            .map(|(_, keys)| keys.as_slice())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(controller: u8, keys: Vec<VirtualKey>) -> TriggerConfig {
        TriggerConfig { controller, keys }
    }

    #[test]
    fn resolves_bound_controller() {
        let map = TriggerMap::new(&[
            trigger(67, vec![VirtualKey::Right]),
            trigger(66, vec![VirtualKey::Left]),
        ])
        .unwrap();

        assert_eq!(map.resolve(67), Some(&[VirtualKey::Right][..]));
        assert_eq!(map.resolve(66), Some(&[VirtualKey::Left][..]));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn unbound_controller_resolves_to_none() {
        let map = TriggerMap::new(&[trigger(67, vec![VirtualKey::Right])]).unwrap();
        assert_eq!(map.resolve(64), None);
        assert_eq!(map.resolve(0), None);
    }

    #[test]
    fn preserves_chord_order() {
        let map =
            TriggerMap::new(&[trigger(67, vec![VirtualKey::Shift, VirtualKey::Space])]).unwrap();
        assert_eq!(
            map.resolve(67),
            Some(&[VirtualKey::Shift, VirtualKey::Space][..])
        );
    }

    #[test]
    fn rejects_duplicate_controller_numbers() {
        let result = TriggerMap::new(&[
            trigger(67, vec![VirtualKey::Right]),
            trigger(67, vec![VirtualKey::Left]),
        ]);
        assert_eq!(result.unwrap_err(), ConfigError::DuplicateController(67));
    }

    #[test]
    fn rejects_empty_action() {
        let result = TriggerMap::new(&[trigger(67, vec![])]);
        assert_eq!(result.unwrap_err(), ConfigError::EmptyAction(67));
    }

    #[test]
    fn rejects_out_of_range_controller() {
        let result = TriggerMap::new(&[trigger(200, vec![VirtualKey::Right])]);
        assert_eq!(result.unwrap_err(), ConfigError::ControllerOutOfRange(200));
    }
}
