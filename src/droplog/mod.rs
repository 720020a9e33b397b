//! Append-only audit log of completed fertilizer drops.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed fertilizer drop
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FertilizerEvent {
    pub x: i64,
    pub y: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "batteryLevel")]
    pub battery_level: i64,
    pub success: bool,
}

/// Append-only store of fertilizer events.
///
/// Exactly one event is appended per executed drop command the agent
/// reports with `fertilizerDropped=true`; nothing is ever removed.
pub struct DropLog {
    events: RwLock<Vec<FertilizerEvent>>,
}

impl DropLog {
    /// Create new empty log
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Appends an event recorded at the given position and battery level.
    pub fn append(&self, x: i64, y: i64, battery_level: i64, success: bool) -> FertilizerEvent {
        let event = FertilizerEvent {
            x,
            y,
            timestamp: Utc::now(),
            battery_level,
            success,
        };
        self.events.write().unwrap().push(event.clone());
        event
    }

    /// Returns up to `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<FertilizerEvent> {
        self.events
            .read()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Total number of recorded drops.
    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().unwrap().is_empty()
    }
}

impl Default for DropLog {
    fn default() -> Self {
        Self::new()
    }
}
