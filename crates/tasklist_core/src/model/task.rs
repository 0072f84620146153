//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record shown by the list screen.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - Storage accepts any `title` value, including the empty string; the
//!   screen discards blank submissions before they reach persistence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every task record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// The sole persisted entity: one to-do row with a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable ID assigned by the persistence layer at create time.
    pub uuid: TaskId,
    /// User-visible title text, stored exactly as typed.
    pub title: String,
}

impl Task {
    /// Creates a new task with a generated stable ID.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by read-back paths where identity already exists in storage.
    pub fn with_id(uuid: TaskId, title: impl Into<String>) -> Self {
        Self {
            uuid,
            title: title.into(),
        }
    }
}
