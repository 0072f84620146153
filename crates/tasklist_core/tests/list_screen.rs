use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rusqlite::Connection;
use tasklist_core::db::open_db_in_memory;
use tasklist_core::{
    DialogKind, RepoError, RepoResult, SqliteTaskRepository, TableView, Task, TaskId,
    TaskListScreen, TaskRepository, TaskService, TitlePrompt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableEvent {
    ReloadAll(Vec<String>),
    Insert(usize, String),
    Reload(usize, String),
    Remove(usize),
}

#[derive(Clone, Default)]
struct RecordingTable {
    events: Rc<RefCell<Vec<TableEvent>>>,
}

impl TableView for RecordingTable {
    fn reload_all(&mut self, titles: &[&str]) {
        self.events.borrow_mut().push(TableEvent::ReloadAll(
            titles.iter().map(|title| title.to_string()).collect(),
        ));
    }

    fn insert_row(&mut self, index: usize, title: &str) {
        self.events
            .borrow_mut()
            .push(TableEvent::Insert(index, title.to_string()));
    }

    fn reload_row(&mut self, index: usize, title: &str) {
        self.events
            .borrow_mut()
            .push(TableEvent::Reload(index, title.to_string()));
    }

    fn remove_row(&mut self, index: usize) {
        self.events.borrow_mut().push(TableEvent::Remove(index));
    }
}

#[derive(Clone, Default)]
struct ScriptedPrompt {
    script: Rc<RefCell<VecDeque<Option<String>>>>,
    seen: Rc<RefCell<Vec<(DialogKind, Option<String>)>>>,
}

impl ScriptedPrompt {
    fn with_script(entries: impl IntoIterator<Item = Option<&'static str>>) -> Self {
        let script = entries
            .into_iter()
            .map(|entry| entry.map(str::to_string))
            .collect();
        Self {
            script: Rc::new(RefCell::new(script)),
            seen: Rc::default(),
        }
    }
}

impl TitlePrompt for ScriptedPrompt {
    fn request_title(&mut self, dialog: DialogKind, current: Option<&str>) -> Option<String> {
        self.seen
            .borrow_mut()
            .push((dialog, current.map(str::to_string)));
        self.script.borrow_mut().pop_front().flatten()
    }
}

fn storage_failure() -> RepoError {
    RepoError::InvalidData("storage rejected the operation".to_string())
}

/// Repository double whose every operation fails.
struct FailingRepo;

impl TaskRepository for FailingRepo {
    fn create_task(&self, _task: &Task) -> RepoResult<TaskId> {
        Err(storage_failure())
    }

    fn update_title(&self, _id: TaskId, _title: &str) -> RepoResult<()> {
        Err(storage_failure())
    }

    fn get_task(&self, _id: TaskId) -> RepoResult<Option<Task>> {
        Err(storage_failure())
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        Err(storage_failure())
    }

    fn delete_task(&self, _id: TaskId) -> RepoResult<()> {
        Err(storage_failure())
    }
}

/// Repository double that serves a fixed task set but rejects all writes.
struct ReadOnlyRepo {
    tasks: Vec<Task>,
}

impl TaskRepository for ReadOnlyRepo {
    fn create_task(&self, _task: &Task) -> RepoResult<TaskId> {
        Err(storage_failure())
    }

    fn update_title(&self, _id: TaskId, _title: &str) -> RepoResult<()> {
        Err(storage_failure())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        Ok(self.tasks.iter().find(|task| task.uuid == id).cloned())
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn delete_task(&self, _id: TaskId) -> RepoResult<()> {
        Err(storage_failure())
    }
}

fn sqlite_screen<'conn>(
    conn: &'conn Connection,
    prompt: &ScriptedPrompt,
    table: &RecordingTable,
) -> TaskListScreen<SqliteTaskRepository<'conn>, ScriptedPrompt, RecordingTable> {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    TaskListScreen::new(TaskService::new(repo), prompt.clone(), table.clone())
}

fn seed_task(conn: &Connection, title: &str) -> Task {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    let task = Task::new(title);
    repo.create_task(&task).unwrap();
    task
}

fn stored_titles(conn: &Connection) -> Vec<String> {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    repo.list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect()
}

fn visible_titles<R, P, V>(screen: &TaskListScreen<R, P, V>) -> Vec<String>
where
    R: TaskRepository,
    P: TitlePrompt,
    V: TableView,
{
    screen
        .tasks()
        .iter()
        .map(|task| task.title.clone())
        .collect()
}

#[test]
fn appear_replaces_rows_and_reloads_the_visible_table() {
    let conn = open_db_in_memory().unwrap();
    seed_task(&conn, "first");
    seed_task(&conn, "second");

    let prompt = ScriptedPrompt::default();
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);

    screen.appear();

    assert_eq!(screen.row_count(), 2);
    assert_eq!(
        *table.events.borrow(),
        vec![TableEvent::ReloadAll(vec![
            "first".to_string(),
            "second".to_string()
        ])]
    );
}

#[test]
fn appear_failure_leaves_rows_and_table_untouched() {
    let prompt = ScriptedPrompt::default();
    let table = RecordingTable::default();
    let mut screen =
        TaskListScreen::new(TaskService::new(FailingRepo), prompt.clone(), table.clone());

    screen.appear();

    assert_eq!(screen.row_count(), 0);
    assert!(table.events.borrow().is_empty());
}

#[test]
fn compose_cancel_has_no_side_effects() {
    let conn = open_db_in_memory().unwrap();
    let prompt = ScriptedPrompt::with_script([None]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);

    screen.add_button_tapped();

    assert_eq!(screen.row_count(), 0);
    assert!(stored_titles(&conn).is_empty());
    assert!(table.events.borrow().is_empty());
    assert_eq!(*prompt.seen.borrow(), vec![(DialogKind::Compose, None)]);
}

#[test]
fn blank_compose_submissions_are_discarded() {
    let conn = open_db_in_memory().unwrap();
    let prompt = ScriptedPrompt::with_script([Some(""), Some("   \t")]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);

    screen.add_button_tapped();
    screen.add_button_tapped();

    assert_eq!(screen.row_count(), 0);
    assert!(stored_titles(&conn).is_empty());
    assert!(table.events.borrow().is_empty());
}

#[test]
fn create_appends_exactly_one_row_at_the_end() {
    let conn = open_db_in_memory().unwrap();
    seed_task(&conn, "first");

    let prompt = ScriptedPrompt::with_script([Some("second")]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);
    screen.appear();

    screen.add_button_tapped();

    assert_eq!(visible_titles(&screen), vec!["first", "second"]);
    assert_eq!(
        table.events.borrow().last(),
        Some(&TableEvent::Insert(1, "second".to_string()))
    );
    assert_eq!(stored_titles(&conn), vec!["first", "second"]);
}

#[test]
fn create_failure_adds_no_row_and_no_entry() {
    let seeded = Task::new("only");
    let prompt = ScriptedPrompt::with_script([Some("new task")]);
    let table = RecordingTable::default();
    let repo = ReadOnlyRepo {
        tasks: vec![seeded],
    };
    let mut screen = TaskListScreen::new(TaskService::new(repo), prompt.clone(), table.clone());
    screen.appear();

    screen.add_button_tapped();

    assert_eq!(visible_titles(&screen), vec!["only"]);
    assert_eq!(table.events.borrow().len(), 1, "only the appear reload");
}

#[test]
fn edit_prefills_current_title_and_persists_the_change() {
    let conn = open_db_in_memory().unwrap();
    seed_task(&conn, "Buy milk");

    let prompt = ScriptedPrompt::with_script([Some("Buy oat milk")]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);
    screen.appear();

    screen.row_tapped(0);

    assert_eq!(
        prompt.seen.borrow().last(),
        Some(&(DialogKind::Edit, Some("Buy milk".to_string())))
    );
    assert_eq!(visible_titles(&screen), vec!["Buy oat milk"]);
    assert_eq!(
        table.events.borrow().last(),
        Some(&TableEvent::Reload(0, "Buy oat milk".to_string()))
    );
    assert_eq!(stored_titles(&conn), vec!["Buy oat milk"]);
}

#[test]
fn edit_cancel_and_blank_confirmation_are_side_effect_free() {
    let conn = open_db_in_memory().unwrap();
    seed_task(&conn, "Buy milk");

    let prompt = ScriptedPrompt::with_script([None, Some("   ")]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);
    screen.appear();

    screen.row_tapped(0);
    screen.row_tapped(0);

    assert_eq!(visible_titles(&screen), vec!["Buy milk"]);
    assert_eq!(stored_titles(&conn), vec!["Buy milk"]);
    assert_eq!(table.events.borrow().len(), 1, "only the appear reload");
}

#[test]
fn edit_failure_keeps_the_optimistic_local_title() {
    let seeded = Task::new("Buy milk");
    let prompt = ScriptedPrompt::with_script([Some("Buy oat milk")]);
    let table = RecordingTable::default();
    let repo = ReadOnlyRepo {
        tasks: vec![seeded],
    };
    let mut screen = TaskListScreen::new(TaskService::new(repo), prompt.clone(), table.clone());
    screen.appear();

    screen.row_tapped(0);

    // Local mutation and row reload happen before the gateway call, so a
    // rejected rename leaves the optimistic title on screen.
    assert_eq!(visible_titles(&screen), vec!["Buy oat milk"]);
    assert_eq!(
        table.events.borrow().last(),
        Some(&TableEvent::Reload(0, "Buy oat milk".to_string()))
    );
}

#[test]
fn swipe_delete_removes_entry_row_and_record() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_task(&conn, "first");
    seed_task(&conn, "second");

    let prompt = ScriptedPrompt::default();
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);
    screen.appear();

    screen.row_swiped(1);

    assert_eq!(visible_titles(&screen), vec!["first"]);
    assert_eq!(table.events.borrow().last(), Some(&TableEvent::Remove(1)));
    assert_eq!(stored_titles(&conn), vec!["first"]);
    assert_eq!(screen.tasks()[0].uuid, first.uuid);
    assert!(prompt.seen.borrow().is_empty(), "delete has no dialog");
}

#[test]
fn out_of_range_gestures_are_ignored() {
    let conn = open_db_in_memory().unwrap();
    let prompt = ScriptedPrompt::with_script([Some("never used")]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);
    screen.appear();

    screen.row_tapped(0);
    screen.row_swiped(3);

    assert_eq!(screen.row_count(), 0);
    assert!(prompt.seen.borrow().is_empty());
    assert_eq!(table.events.borrow().len(), 1, "only the appear reload");
}

#[test]
fn milk_scenario_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let prompt =
        ScriptedPrompt::with_script([Some("Buy milk"), Some("Walk dog"), Some("Buy oat milk")]);
    let table = RecordingTable::default();
    let mut screen = sqlite_screen(&conn, &prompt, &table);
    screen.appear();

    screen.add_button_tapped();
    assert_eq!(visible_titles(&screen), vec!["Buy milk"]);

    screen.add_button_tapped();
    assert_eq!(visible_titles(&screen), vec!["Buy milk", "Walk dog"]);

    screen.row_tapped(0);
    assert_eq!(visible_titles(&screen), vec!["Buy oat milk", "Walk dog"]);

    screen.row_swiped(1);
    assert_eq!(visible_titles(&screen), vec!["Buy oat milk"]);

    assert_eq!(stored_titles(&conn), vec!["Buy oat milk"]);
}
