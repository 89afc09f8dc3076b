//! Per-key cooldown table.
//!
//! Keys are composed by the executor (channel id + the block's key), so
//! concurrent invocations of the same tag in different channels never
//! contend. Check-and-arm happens under one lock acquisition per key.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tagscript_engine::Clock;

pub struct CooldownTable {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownTable {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        CooldownTable {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// If `key` is cooling down, return the remaining whole seconds (at
    /// least 1). Otherwise arm it for `seconds` and return `None`.
    pub fn check_and_set(&self, key: &str, seconds: u64) -> Option<u64> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        if let Some(expiry) = entries.get(key) {
            if *expiry > now {
                return Some((*expiry - now).num_seconds().max(1) as u64);
            }
        }
        entries.insert(key.to_string(), now + Duration::seconds(seconds as i64));
        None
    }

    pub fn clear(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}
