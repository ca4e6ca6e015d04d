//! Runtime configuration of a world and its scheduler.
//!
//! Every field has a default, so an empty document (or no document at all) is a valid
//! configuration:
//!
//! ```toml
//! archetype_cache_capacity = 30
//! cycle_interval_ms = 1
//! log_level = "info"
//! ```

use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;

use crate::ecs::error::Result;

/// Tunables of a world.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many resolved archetype kinds the factory keeps.
    pub archetype_cache_capacity: usize,

    /// The pause between two cycles of an independently driven system, in milliseconds. Stop
    /// requests are noticed within one pause.
    pub cycle_interval_ms: u64,

    /// The most verbose log level an embedding application should enable.
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archetype_cache_capacity: 30,
            cycle_interval_ms: 1,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Parse a configuration from a TOML document.
    pub fn from_toml(document: &str) -> Result<Self> {
        Ok(toml::from_str(document)?)
    }

    /// The pause between two worker cycles.
    #[inline]
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }
}
