//! Runtime configuration for [`OrderSystem`](super::OrderSystem).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

pub const CHANNEL_CAPACITY_VAR: &str = "STOREFRONT_CHANNEL_CAPACITY";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "STOREFRONT_LOW_STOCK_THRESHOLD";

/// Settings shared by the actors and the reporting operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Request buffer of each actor's mailbox.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Default threshold for low-stock reports.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
}

fn default_channel_capacity() -> usize {
    32
}

fn default_low_stock_threshold() -> u32 {
    10
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

impl SystemConfig {
    /// Defaults, overridden by the `STOREFRONT_*` environment variables that parse.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. Values that do not parse, and a zero channel
    /// capacity, are logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(capacity) = parse_var::<usize>(&lookup, CHANNEL_CAPACITY_VAR) {
            if capacity == 0 {
                warn!(var = CHANNEL_CAPACITY_VAR, "Channel capacity must be positive, keeping default");
            } else {
                self.channel_capacity = capacity;
            }
        }
        if let Some(threshold) = parse_var::<u32>(&lookup, LOW_STOCK_THRESHOLD_VAR) {
            self.low_stock_threshold = threshold;
        }
        self
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}
