//! Cooldown filter collapsing message bursts into one trigger.
//!
//! A single pedal release can produce a burst of Control Change messages.
//! One shared gate per session means a trigger on either binding closes the
//! window for both.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DebounceGate {
    cooldown: Duration,
    last_trigger: Option<Instant>,
}

impl DebounceGate {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_trigger: None }
    }

    /// Admit iff the cooldown has fully elapsed since the last admitted
    /// trigger. Admitting moves the window; rejection leaves it untouched.
    ///
    /// The first call after construction always admits.
    pub fn try_admit(&mut self, now: Instant) -> bool {
        match self.last_trigger {
            Some(last) if now.duration_since(last) < self.cooldown => false,
            _ => {
                self.last_trigger = Some(now);
                true
            }
        }
    }
}
