//! Round-scoped key/value store.
//!
//! The surrounding lifecycle persists a handful of opaque strings (round id,
//! spectator flag, party id, queue position) across the requeue boundary.
//! The core only reads and writes them at workflow transition points.

use std::collections::HashMap;

pub mod keys {
    pub const ROUND_ID: &str = "roundId";
    pub const IS_SPECTATOR: &str = "isSpectator";
    pub const PARTY_ID: &str = "partyId";
    pub const USER_ID: &str = "userId";
    pub const QUEUE_POSITION: &str = "queuePosition";
}

#[derive(Debug, Default)]
pub struct SessionStore {
    values: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn is_spectator(&self) -> bool {
        self.get(keys::IS_SPECTATOR) == Some("true")
    }
}
