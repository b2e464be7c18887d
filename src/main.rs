mod cli;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use rusqlite::Connection;

use gorev::db;
use gorev::model::{Category, CategoryFilter, NoteId, Task};
use gorev::output;
use gorev::store::{TaskStore, Toggled};

use cli::{Cli, Command};

fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".gorev").join("gorev.db"))
}

fn resolve_db_path(cli_db: Option<String>) -> Result<String> {
    match cli_db {
        Some(p) => Ok(p),
        None => {
            let path = default_db_path()?;
            Ok(path
                .to_str()
                .context("default DB path is not valid UTF-8")?
                .to_string())
        }
    }
}

fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn open_db(db_path: &str) -> Result<Connection> {
    let conn = db::open(db_path)?;
    db::init(&conn)?;
    Ok(conn)
}

fn open_store(db_path: &str) -> Result<TaskStore> {
    let conn = open_db(db_path)?;
    Ok(TaskStore::open(conn)?)
}

/// Accept RFC 3339 plus a few naive forms; naive input is read as local time.
fn parse_due(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return local_to_utc(naive);
        }
    }
    bail!("invalid due date '{s}': use YYYY-MM-DD, \"YYYY-MM-DD HH:MM\", or RFC 3339");
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // DST fold: take the earlier reading
        LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => bail!("due date '{naive}' does not exist in the local time zone"),
    }
}

/// Match a full id or an unambiguous prefix against the loaded collection.
/// No match is not an error; the caller reports it and moves on. An empty
/// prefix would match everything, so it is rejected outright.
fn resolve_task(store: &TaskStore, prefix: &str) -> Result<Option<Task>> {
    if prefix.is_empty() {
        bail!("task id must not be empty");
    }
    let prefix = prefix.to_lowercase();
    let matches: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| t.id.to_string().starts_with(&prefix))
        .collect();
    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches[0].clone())),
        n => bail!("ambiguous id prefix '{prefix}' matches {n} tasks"),
    }
}

fn resolve_note_id(task: &Task, prefix: &str) -> Result<Option<NoteId>> {
    if prefix.is_empty() {
        bail!("note id must not be empty");
    }
    let prefix = prefix.to_lowercase();
    let matches: Vec<NoteId> = task
        .notes
        .iter()
        .filter(|n| n.id.to_string().starts_with(&prefix))
        .map(|n| n.id)
        .collect();
    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches[0])),
        n => bail!("ambiguous note id prefix '{prefix}' matches {n} notes"),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db)?;
    ensure_db_dir(&db_path)?;

    match cli.command {
        Command::Init => {
            open_db(&db_path)?;
            eprintln!("Initialized database at {db_path}");
        }

        Command::Add {
            title,
            desc,
            category,
            due,
            json,
        } => {
            let category = Category::parse(&category)?;
            let due = due.as_deref().map(parse_due).transpose()?;
            let mut store = open_store(&db_path)?;
            let task = store.create(title, desc, category, due)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                eprintln!("Added task '{}' ({})", task.title, output::short_id(task.id));
            }
        }

        Command::Edit {
            id,
            title,
            desc,
            category,
            due,
            clear_due,
        } => {
            let category = category.as_deref().map(Category::parse).transpose()?;
            let due = due.as_deref().map(parse_due).transpose()?;
            let mut store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => {
                    // Anything not overridden keeps its current value
                    let new_title = title.unwrap_or_else(|| task.title.clone());
                    let new_desc = desc.unwrap_or_else(|| task.description.clone());
                    let new_category = category.unwrap_or(task.category);
                    let new_due = if clear_due { None } else { due.or(task.due_date) };
                    if store.update(task.id, new_title, new_desc, new_category, new_due)? {
                        eprintln!("Updated task {}", output::short_id(task.id));
                    }
                }
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::Toggle { id } => {
            let mut store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => match store.toggle_complete(task.id)? {
                    Some(Toggled::Completed) => eprintln!("\u{1f389} Completed '{}'", task.title),
                    Some(Toggled::Reopened) => eprintln!("Reopened '{}'", task.title),
                    None => eprintln!("No task matching '{id}' found"),
                },
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::Rm { id } => {
            let mut store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => {
                    if store.delete(task.id)? {
                        eprintln!("Removed task '{}'", task.title);
                    }
                }
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::Show { id, json } => {
            let store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&task)?);
                    } else {
                        print!("{}", output::format_task_detail(&task, Utc::now()));
                    }
                }
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::List {
            search,
            category,
            json,
        } => {
            let filter = CategoryFilter::parse(&category)?;
            let store = open_store(&db_path)?;
            let hits = store.query(&search, filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if store.tasks().is_empty() {
                eprintln!("No tasks yet. Add one with 'gorev add <title>'.");
            } else if hits.is_empty() {
                eprintln!("No tasks match the current filters.");
            } else {
                print!("{}", output::format_task_list(&hits, Utc::now()));
            }
        }

        Command::Note { id, content } => {
            let mut store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => match store.add_note(task.id, content)? {
                    Some(note) => eprintln!(
                        "Added note {} to '{}'",
                        output::short_id(note.id),
                        task.title
                    ),
                    None => eprintln!("Note content must not be empty"),
                },
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::Unnote { id, note_id } => {
            let mut store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => match resolve_note_id(&task, &note_id)? {
                    Some(nid) => {
                        if store.delete_note(task.id, nid)? {
                            eprintln!(
                                "Removed note {} from '{}'",
                                output::short_id(nid),
                                task.title
                            );
                        }
                    }
                    None => eprintln!("No note matching '{note_id}' on '{}'", task.title),
                },
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::Notes { id, json } => {
            let store = open_store(&db_path)?;
            match resolve_task(&store, &id)? {
                Some(task) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&task.notes)?);
                    } else {
                        print!("{}", output::format_notes(&task.notes));
                    }
                }
                None => eprintln!("No task matching '{id}' found"),
            }
        }

        Command::Stats { json } => {
            let store = open_store(&db_path)?;
            let counts = store.counts();
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                print!("{}", output::format_counts(&counts));
            }
        }

        Command::Theme { mode } => {
            let conn = open_db(&db_path)?;
            match mode.as_deref() {
                Some("dark") => {
                    db::save_dark_mode(&conn, true)?;
                    eprintln!("Theme set to dark");
                }
                Some("light") => {
                    db::save_dark_mode(&conn, false)?;
                    eprintln!("Theme set to light");
                }
                Some(other) => bail!("invalid theme '{other}': must be dark or light"),
                None => {
                    let dark = db::load_dark_mode(&conn)?;
                    println!("{}", if dark { "dark" } else { "light" });
                }
            }
        }
    }

    Ok(())
}
