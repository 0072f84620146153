//! Interactive terminal frontend for the task list.
//!
//! # Responsibility
//! - Wire the core screen component onto stdin/stdout.
//! - Resolve the store location and bootstrap logging.
//!
//! # Invariants
//! - A store that cannot be opened or migrated at startup is fatal.
//! - Everything after startup runs on this one thread.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use log::info;
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version, default_log_level, init_logging, DialogKind, SqliteTaskRepository, TableView,
    TaskListScreen, TaskRepository, TaskService, TitlePrompt,
};

const DB_FILE_NAME: &str = "tasklist.sqlite3";

fn main() -> ExitCode {
    let db_path = resolve_db_path();

    if let Some(data_dir) = db_path.parent() {
        if let Err(err) = std::fs::create_dir_all(data_dir) {
            eprintln!(
                "cannot create data directory {}: {err}",
                data_dir.display()
            );
            return ExitCode::FAILURE;
        }
        let log_dir = data_dir.join("logs");
        if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
            // Logging is diagnostics only; the list still works without it.
            eprintln!("logging disabled: {err}");
        }
    }
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("cannot open task store at {}: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };
    let repo = match SqliteTaskRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("task store at {} is unusable: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut screen = TaskListScreen::new(TaskService::new(repo), StdinPrompt, StdoutTable);
    screen.appear();
    run_gesture_loop(&mut screen);
    ExitCode::SUCCESS
}

/// Resolves the store file location.
///
/// `TASKLIST_DB_PATH` (trimmed, non-empty) wins; otherwise the platform
/// local-data directory is used.
fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var("TASKLIST_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tasklist")
        .join(DB_FILE_NAME)
}

fn run_gesture_loop(
    screen: &mut TaskListScreen<impl TaskRepository, impl TitlePrompt, impl TableView>,
) {
    println!("type `help` for commands");
    let stdin = io::stdin();
    loop {
        print!("tasklist> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            None => {}
            Some("add") => screen.add_button_tapped(),
            Some("edit") => match parse_row(parts.next(), screen.row_count()) {
                Some(index) => screen.row_tapped(index),
                None => println!("usage: edit <row>  (0..{})", screen.row_count()),
            },
            Some("rm") => match parse_row(parts.next(), screen.row_count()) {
                Some(index) => screen.row_swiped(index),
                None => println!("usage: rm <row>  (0..{})", screen.row_count()),
            },
            Some("ls") => screen.redraw(),
            Some("help") => print_help(),
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command `{other}`; type `help`"),
        }
    }
}

fn parse_row(arg: Option<&str>, rows: usize) -> Option<usize> {
    let index: usize = arg?.parse().ok()?;
    (index < rows).then_some(index)
}

fn print_help() {
    println!("  add         create a task (opens the save dialog)");
    println!("  edit <row>  change a task's title (opens the update dialog)");
    println!("  rm <row>    delete a task, no confirmation");
    println!("  ls          redraw the list");
    println!("  quit        leave");
}

/// One-line stdin rendition of the modal dialogs.
///
/// An empty line is Cancel; anything else is the confirmed field content.
struct StdinPrompt;

impl TitlePrompt for StdinPrompt {
    fn request_title(&mut self, dialog: DialogKind, current: Option<&str>) -> Option<String> {
        match dialog {
            DialogKind::Compose => println!("Save a new task (empty line cancels)"),
            DialogKind::Edit => {
                println!("Make your changes (empty line cancels)");
                if let Some(current) = current {
                    println!("  current: {current}");
                }
            }
        }
        print!("title> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }
        let text = line.trim_end_matches(['\n', '\r']);
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

/// Scrollback rendition of the table view: full redraws print the whole
/// list, incremental row operations print one annotated line each.
struct StdoutTable;

impl TableView for StdoutTable {
    fn reload_all(&mut self, titles: &[&str]) {
        println!("== Task List ==");
        if titles.is_empty() {
            println!("  (no tasks)");
            return;
        }
        for (index, title) in titles.iter().enumerate() {
            println!("{index:>3}  {title}");
        }
    }

    fn insert_row(&mut self, index: usize, title: &str) {
        println!("{index:>3}+ {title}");
    }

    fn reload_row(&mut self, index: usize, title: &str) {
        println!("{index:>3}* {title}");
    }

    fn remove_row(&mut self, index: usize) {
        println!("{index:>3}- removed");
    }
}
