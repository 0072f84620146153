//! Task persistence gateway.
//!
//! # Responsibility
//! - Own create/rename/delete/fetch operations over the task store.
//! - Assign stable identity to new records.
//!
//! # Invariants
//! - Commit failures are surfaced as explicit `Err` values, never swallowed.
//! - The gateway never filters or reorders what the repository returns.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};

/// Persistence gateway for the task list.
///
/// Constructed explicitly by the caller and injected into the screen; its
/// lifetime is the lifetime of the connection it wraps.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a gateway using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one durable task record with the given title.
    ///
    /// The record's stable id is assigned here, not by the caller. The title
    /// is persisted exactly as given; blank-title rejection happens at the
    /// dialog boundary.
    pub fn create(&self, title: impl Into<String>) -> RepoResult<Task> {
        let task = Task::new(title);
        self.repo.create_task(&task)?;
        Ok(task)
    }

    /// Replaces the title of an existing task and returns the stored record.
    pub fn rename(&self, id: TaskId, title: &str) -> RepoResult<Task> {
        self.repo.update_title(id, title)?;
        self.repo.get_task(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Permanently removes one task record.
    pub fn delete(&self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id)
    }

    /// Fetches every stored task, in repository order.
    pub fn fetch_all(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks()
    }
}
