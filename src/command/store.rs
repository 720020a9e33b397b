//! In-memory command queue.
//!
//! Pending commands are dispensed strictly FIFO by creation time
//! (insertion order breaks ties). Fetching does not claim: the same
//! pending command is returned until a completion report marks it
//! executed, which is the at-least-once delivery contract the agent
//! relies on.

use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{Command, CommandStatus};

/// Errors from command store operations
#[derive(Debug, Clone, PartialEq)]
pub enum CommandStoreError {
    UnknownCommand(String),
}

impl fmt::Display for CommandStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStoreError::UnknownCommand(id) => {
                write!(f, "no command with id '{}'", id)
            }
        }
    }
}

impl std::error::Error for CommandStoreError {}

/// FIFO queue of dispatched commands.
///
/// Commands are appended in submission order and never removed, so the
/// backing vec is simultaneously the pending queue and the command
/// history.
pub struct CommandStore {
    commands: RwLock<Vec<Command>>,
}

impl CommandStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
        }
    }

    /// Appends a command and returns its id.
    pub fn submit(&self, command: Command) -> String {
        let id = command.id.clone();
        self.commands.write().unwrap().push(command);
        id
    }

    /// Returns the oldest pending command, or None if the queue has no
    /// pending entries. Does not mark anything executed (fetch != claim).
    pub fn next_pending(&self) -> Option<Command> {
        self.commands
            .read()
            .unwrap()
            .iter()
            .find(|c| c.is_pending())
            .cloned()
    }

    /// Returns true if a command with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.commands.read().unwrap().iter().any(|c| c.id == id)
    }

    /// Marks a command executed with the given timestamp.
    ///
    /// Marking an already-executed command again is a no-op, not an
    /// error, so repeated completion reports are harmless. Unknown ids
    /// are rejected without mutation.
    pub fn mark_executed(
        &self,
        id: &str,
        executed_at: DateTime<Utc>,
    ) -> Result<(), CommandStoreError> {
        let mut commands = self.commands.write().unwrap();
        let command = commands
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommandStoreError::UnknownCommand(id.to_string()))?;

        if command.status == CommandStatus::Pending {
            command.status = CommandStatus::Executed;
            command.executed_at = Some(executed_at);
        }

        Ok(())
    }

    /// Returns up to `limit` commands, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Command> {
        self.commands
            .read()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Total number of commands ever submitted.
    pub fn len(&self) -> usize {
        self.commands.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().unwrap().is_empty()
    }
}

impl Default for CommandStore {
    fn default() -> Self {
        Self::new()
    }
}
