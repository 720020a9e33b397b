//! Singleton agent-status record.
//!
//! One record per deployment, created lazily on first read or write.
//! Only the agent writes it (via telemetry reports); writes are
//! last-write-wins per field, with absent fields keeping their prior
//! value.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Battery percentage is always clamped to this range.
pub const BATTERY_MIN: i64 = 0;
pub const BATTERY_MAX: i64 = 100;

/// Last reported state of the field agent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentStatus {
    pub x: i64,
    pub y: i64,
    /// Percentage, 0..=100
    pub battery: i64,
    #[serde(rename = "isMoving")]
    pub is_moving: bool,
    #[serde(rename = "lastUpdate")]
    pub last_update: DateTime<Utc>,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            battery: BATTERY_MAX,
            is_moving: false,
            last_update: Utc::now(),
        }
    }
}

/// Telemetry report body sent by the agent.
///
/// All status fields are optional: only supplied fields are applied.
/// `command_id` and `fertilizer_dropped` ride along on completion
/// reports and are handled by the coordinator API, not this store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TelemetryReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<i64>,
    #[serde(rename = "isMoving", skip_serializing_if = "Option::is_none")]
    pub is_moving: Option<bool>,
    #[serde(rename = "commandId", skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(rename = "fertilizerDropped", default)]
    pub fertilizer_dropped: bool,
}

/// Holds the singleton status record
pub struct StatusStore {
    status: RwLock<Option<AgentStatus>>,
}

impl StatusStore {
    /// Create new store with no record yet
    pub fn new() -> Self {
        Self {
            status: RwLock::new(None),
        }
    }

    /// Returns the current status, creating the default record if none
    /// exists yet.
    pub fn current(&self) -> AgentStatus {
        let mut guard = self.status.write().unwrap();
        guard.get_or_insert_with(AgentStatus::default).clone()
    }

    /// Applies a partial update and returns the post-update snapshot.
    ///
    /// Absent fields keep their prior value; `last_update` is always
    /// refreshed. Battery values are clamped to [0, 100] on the way in.
    pub fn apply(&self, report: &TelemetryReport) -> AgentStatus {
        let mut guard = self.status.write().unwrap();
        let status = guard.get_or_insert_with(AgentStatus::default);

        if let Some(x) = report.x {
            status.x = x;
        }
        if let Some(y) = report.y {
            status.y = y;
        }
        if let Some(battery) = report.battery {
            status.battery = battery.clamp(BATTERY_MIN, BATTERY_MAX);
        }
        if let Some(is_moving) = report.is_moving {
            status.is_moving = is_moving;
        }
        status.last_update = Utc::now();

        status.clone()
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}
