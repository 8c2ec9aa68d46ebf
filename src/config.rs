//! Configuration loading and validation.
//!
//! Handles loading and parsing of the YAML configuration file. Trigger
//! validation itself lives in [`crate::engine::TriggerMap`]; `validate`
//! delegates to it so a bad config is rejected before a session ever arms.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

use crate::keys::VirtualKey;

/// Minimum Control Change value that counts as a pedal press.
pub const DEFAULT_THRESHOLD: u8 = 20;

/// Minimum time between two accepted triggers.
pub const DEFAULT_COOLDOWN_MS: u64 = 750;

/// Upper bound on configured triggers (one per selector in the UI layer).
pub const MAX_TRIGGERS: usize = 2;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    pub triggers: Vec<TriggerConfig>,
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

/// MIDI port configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Case-insensitive substring matched against device names. When set, a
    /// matching device is connected automatically as soon as it appears.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_port: Option<String>,
}

/// One controller-number → key-action binding
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    pub controller: u8,
    pub keys: Vec<VirtualKey>,
}

/// Trigger configuration errors, rejected before a session starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no triggers configured")]
    NoTriggers,

    #[error("at most {MAX_TRIGGERS} triggers are supported, got {0}")]
    TooManyTriggers(usize),

    #[error("controller number {0} is bound more than once")]
    DuplicateController(u8),

    #[error("controller number {0} is out of MIDI range (0-127)")]
    ControllerOutOfRange(u8),

    #[error("trigger for controller {0} has no keys")]
    EmptyAction(u8),
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration: {}", path))?;

        Ok(config)
    }

    /// Check the trigger set without building an engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::engine::TriggerMap::new(&self.triggers).map(|_| ())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for AppConfig {
    /// Built-in bindings for when no config file exists: soft pedal (CC 67)
    /// pages forward, sostenuto pedal (CC 66) pages back.
    fn default() -> Self {
        Self {
            midi: MidiConfig::default(),
            triggers: vec![
                TriggerConfig { controller: 67, keys: vec![VirtualKey::Right] },
                TriggerConfig { controller: 66, keys: vec![VirtualKey::Left] },
            ],
            threshold: DEFAULT_THRESHOLD,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

// Default value functions
fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}
fn default_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}
