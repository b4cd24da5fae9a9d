use thiserror::Error;

use crate::quest::types::QuestId;

/// Errors that can arise while loading, binding or persisting quest data.
#[derive(Debug, Error)]
pub enum QuestError {
    /// Wrapper around IO errors (definition file, temp questmaster file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed quest definition record. Always fatal at boot.
    #[error("quest file line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Returned when a stable quest id does not resolve.
    #[error("quest not found: {0}")]
    NotFound(QuestId),

    /// A temporary questmaster already offers the maximum number of quests.
    #[error("temporary quest list full ({0} entries)")]
    TempListFull(usize),

    /// Growing a temporary quest list failed.
    #[error("allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),

    /// The quest cannot be posted by an NPC.
    #[error("quest {0} is not mob-postable")]
    NotPostable(QuestId),
}

impl QuestError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        QuestError::Parse {
            line,
            message: message.into(),
        }
    }
}
