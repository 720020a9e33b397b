use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod store;

pub use store::{CommandStore, CommandStoreError};

/// Command represents one dispatched instruction for the field agent.
///
/// Commands are immutable after creation except for the single
/// Pending -> Executed transition, which is triggered by the agent's
/// completion report. Commands are never deleted; the full list doubles
/// as an audit trail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Command {
    /// UUIDv7 identifier (time-ordered, globally unique)
    pub id: String,

    /// What the agent should do
    #[serde(rename = "type")]
    pub kind: CommandKind,

    /// Target cell for a move command (absent for drops)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,

    /// Lifecycle state, serialized as the wire boolean `executed`
    #[serde(
        rename = "executed",
        serialize_with = "serialize_status",
        deserialize_with = "deserialize_status"
    )]
    pub status: CommandStatus,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// Set exactly when the command transitions to Executed
    #[serde(rename = "executedAt", skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

/// Command kinds understood by the agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Move,
    Drop,
}

/// Lifecycle state of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Pending,
    Executed,
}

impl Command {
    /// Creates a new pending move command targeting `(x, y)`.
    ///
    /// Bounds checking happens at the API layer, where the workspace
    /// size is known.
    pub fn new_move(x: i64, y: i64) -> Self {
        Self::new(CommandKind::Move, Some(x), Some(y))
    }

    /// Creates a new pending drop command (no target cell).
    pub fn new_drop() -> Self {
        Self::new(CommandKind::Drop, None, None)
    }

    fn new(kind: CommandKind, x: Option<i64>, y: Option<i64>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            kind,
            x,
            y,
            status: CommandStatus::Pending,
            created_at: Utc::now(),
            executed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CommandStatus::Pending
    }
}

fn serialize_status<S>(status: &CommandStatus, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_bool(*status == CommandStatus::Executed)
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<CommandStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let executed = bool::deserialize(deserializer)?;
    Ok(if executed {
        CommandStatus::Executed
    } else {
        CommandStatus::Pending
    })
}
