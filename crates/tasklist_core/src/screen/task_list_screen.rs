//! Task list screen controller.
//!
//! # Responsibility
//! - Own the in-memory ordered task list mirroring the store.
//! - Mediate create/edit/delete gestures through one modal dialog flow.
//! - Drive the table view with incremental row operations.
//!
//! # Invariants
//! - At most one dialog is active at a time; the synchronous prompt call
//!   bounds its whole lifetime.
//! - Blank (empty or whitespace-only) titles never reach the gateway.
//! - The in-memory list is mutated directly after each gateway call, never
//!   rebuilt by re-querying.
//! - Task titles are never written to logs.

use crate::model::task::Task;
use crate::repo::task_repo::TaskRepository;
use crate::service::task_service::TaskService;
use log::{debug, error, info};

/// Which modal dialog the screen is presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// "Save"/"Cancel" dialog with an empty text field.
    Compose,
    /// "Update"/"Cancel" dialog pre-filled with the current title.
    Edit,
}

/// Modal dialog port.
///
/// Presents one dialog and blocks until the user resolves it. `None` means
/// the user cancelled; `Some(text)` is the confirmed field content, returned
/// exactly as typed.
pub trait TitlePrompt {
    fn request_title(&mut self, dialog: DialogKind, current: Option<&str>) -> Option<String>;
}

/// Rendered table port.
///
/// Rows display only the task title. Incremental operations mirror the
/// screen's list mutations; `reload_all` replaces the whole visible table.
pub trait TableView {
    fn reload_all(&mut self, titles: &[&str]);
    fn insert_row(&mut self, index: usize, title: &str);
    fn reload_row(&mut self, index: usize, title: &str);
    fn remove_row(&mut self, index: usize);
}

/// Single-screen list controller over an injected persistence gateway.
pub struct TaskListScreen<R, P, V>
where
    R: TaskRepository,
    P: TitlePrompt,
    V: TableView,
{
    gateway: TaskService<R>,
    prompt: P,
    table: V,
    tasks: Vec<Task>,
}

impl<R, P, V> TaskListScreen<R, P, V>
where
    R: TaskRepository,
    P: TitlePrompt,
    V: TableView,
{
    /// Creates a screen with an empty row cache.
    ///
    /// Callers are expected to invoke [`appear`](Self::appear) before the
    /// first gesture so the cache reflects the store.
    pub fn new(gateway: TaskService<R>, prompt: P, table: V) -> Self {
        Self {
            gateway,
            prompt,
            table,
            tasks: Vec::new(),
        }
    }

    /// Startup fetch: replaces the row cache and reloads the visible table.
    ///
    /// On fetch failure the cache and table are left unchanged; the error is
    /// logged and never shown to the user.
    pub fn appear(&mut self) {
        match self.gateway.fetch_all() {
            Ok(tasks) => {
                self.tasks = tasks;
                self.reload_table();
                info!(
                    "event=screen_appear module=screen status=ok rows={}",
                    self.tasks.len()
                );
            }
            Err(err) => {
                error!("event=screen_appear module=screen status=error error={err}");
            }
        }
    }

    /// "Add" button gesture: presents the compose dialog.
    ///
    /// Cancel and blank confirmations are discarded without side effects.
    /// On successful create the new task is appended and one row inserted at
    /// the end; on gateway failure nothing is appended.
    pub fn add_button_tapped(&mut self) {
        let Some(text) = self.prompt.request_title(DialogKind::Compose, None) else {
            debug!("event=dialog_dismissed module=screen dialog=compose reason=cancelled");
            return;
        };
        if is_blank(&text) {
            debug!("event=dialog_dismissed module=screen dialog=compose reason=blank_title");
            return;
        }

        match self.gateway.create(text) {
            Ok(task) => {
                self.tasks.push(task);
                let index = self.tasks.len() - 1;
                self.table.insert_row(index, &self.tasks[index].title);
                info!(
                    "event=task_create module=screen status=ok uuid={} row={index}",
                    self.tasks[index].uuid
                );
            }
            Err(err) => {
                error!("event=task_create module=screen status=error error={err}");
            }
        }
    }

    /// Row tap gesture: presents the edit dialog for the tapped row.
    ///
    /// The local title is replaced and the row reloaded before the gateway
    /// call; on success the cache entry is replaced with the stored record,
    /// on failure the optimistic local edit stays visible and the error is
    /// logged.
    pub fn row_tapped(&mut self, index: usize) {
        if index >= self.tasks.len() {
            error!(
                "event=row_tap module=screen status=error error_code=row_out_of_range row={index} rows={}",
                self.tasks.len()
            );
            return;
        }

        let current = self.tasks[index].title.clone();
        let Some(text) = self
            .prompt
            .request_title(DialogKind::Edit, Some(current.as_str()))
        else {
            debug!("event=dialog_dismissed module=screen dialog=edit reason=cancelled");
            return;
        };
        if is_blank(&text) {
            debug!("event=dialog_dismissed module=screen dialog=edit reason=blank_title");
            return;
        }

        self.tasks[index].title = text.clone();
        self.table.reload_row(index, &text);

        let id = self.tasks[index].uuid;
        match self.gateway.rename(id, &text) {
            Ok(stored) => {
                self.tasks[index] = stored;
                info!("event=task_rename module=screen status=ok uuid={id} row={index}");
            }
            Err(err) => {
                error!("event=task_rename module=screen status=error uuid={id} error={err}");
            }
        }
    }

    /// Swipe-to-delete gesture: no confirmation dialog.
    ///
    /// The row and cache entry are removed before the gateway call; a delete
    /// failure is logged only.
    pub fn row_swiped(&mut self, index: usize) {
        if index >= self.tasks.len() {
            error!(
                "event=row_swipe module=screen status=error error_code=row_out_of_range row={index} rows={}",
                self.tasks.len()
            );
            return;
        }

        let removed = self.tasks.remove(index);
        self.table.remove_row(index);

        match self.gateway.delete(removed.uuid) {
            Ok(()) => {
                info!(
                    "event=task_delete module=screen status=ok uuid={} row={index}",
                    removed.uuid
                );
            }
            Err(err) => {
                error!(
                    "event=task_delete module=screen status=error uuid={} error={err}",
                    removed.uuid
                );
            }
        }
    }

    /// Re-renders the whole table from the row cache.
    pub fn redraw(&mut self) {
        self.reload_table();
    }

    /// Current row cache, in table order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of visible rows.
    pub fn row_count(&self) -> usize {
        self.tasks.len()
    }

    fn reload_table(&mut self) {
        let titles: Vec<&str> = self.tasks.iter().map(|task| task.title.as_str()).collect();
        self.table.reload_all(&titles);
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
