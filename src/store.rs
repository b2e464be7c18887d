use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rusqlite::Connection;
use serde::Serialize;

use crate::db;
use crate::model::{Category, CategoryFilter, Note, NoteId, Task, TaskId};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    EmptyTitle,
    Db(rusqlite::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => f.write_str("task title must not be empty"),
            Self::Db(e) => write!(f, "database error: {e}"),
            Self::Serialize(e) => write!(f, "failed to serialize tasks: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyTitle => None,
            Self::Db(e) => Some(e),
            Self::Serialize(e) => Some(e),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

/// Direction of a completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Completed,
    Reopened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// In-memory task collection backed by the `tasks` key of the store table.
/// Every mutation re-serializes the whole collection; on a failed write the
/// in-memory change is rolled back so memory always matches the last durable
/// state.
pub struct TaskStore {
    conn: Connection,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the collection from the database. An unreadable `tasks` value is
    /// logged and treated as empty rather than failing the open.
    pub fn open(conn: Connection) -> StoreResult<Self> {
        let tasks = match db::get(&conn, db::KEY_TASKS)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!("ignoring unreadable {} value: {e}", db::KEY_TASKS);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { conn, tasks })
    }

    fn flush(&self) -> StoreResult<()> {
        let raw = serde_json::to_string(&self.tasks)?;
        db::set(&self.conn, db::KEY_TASKS, &raw)?;
        debug!("persisted {} tasks", self.tasks.len());
        Ok(())
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn create(
        &mut self,
        title: String,
        description: String,
        category: Category,
        due_date: Option<DateTime<Utc>>,
    ) -> StoreResult<Task> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let task = Task::new(title, description, category, due_date);
        self.tasks.push(task.clone());
        if let Err(e) = self.flush() {
            self.tasks.pop();
            return Err(e);
        }
        Ok(task)
    }

    /// Replace title, description, category, and due date of the matching
    /// task. Returns false without touching anything when the id is unknown.
    pub fn update(
        &mut self,
        id: TaskId,
        title: String,
        description: String,
        category: Category,
        due_date: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let idx = match self.position(id) {
            Some(i) => i,
            None => return Ok(false),
        };
        let prev = self.tasks[idx].clone();
        let task = &mut self.tasks[idx];
        task.title = title;
        task.description = description;
        task.category = category;
        task.due_date = due_date;
        if let Err(e) = self.flush() {
            self.tasks[idx] = prev;
            return Err(e);
        }
        Ok(true)
    }

    /// Remove the matching task and its notes with it.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<bool> {
        let idx = match self.position(id) {
            Some(i) => i,
            None => return Ok(false),
        };
        let removed = self.tasks.remove(idx);
        if let Err(e) = self.flush() {
            self.tasks.insert(idx, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Flip the completed flag, reporting which direction it went. None when
    /// the id is unknown.
    pub fn toggle_complete(&mut self, id: TaskId) -> StoreResult<Option<Toggled>> {
        let idx = match self.position(id) {
            Some(i) => i,
            None => return Ok(None),
        };
        self.tasks[idx].completed = !self.tasks[idx].completed;
        if let Err(e) = self.flush() {
            self.tasks[idx].completed = !self.tasks[idx].completed;
            return Err(e);
        }
        Ok(Some(if self.tasks[idx].completed {
            Toggled::Completed
        } else {
            Toggled::Reopened
        }))
    }

    /// Append a note to the matching task. Blank content and unknown task
    /// ids are no-ops, not errors.
    pub fn add_note(&mut self, task_id: TaskId, content: String) -> StoreResult<Option<Note>> {
        if content.trim().is_empty() {
            return Ok(None);
        }
        let idx = match self.position(task_id) {
            Some(i) => i,
            None => return Ok(None),
        };
        let note = Note::new(task_id, content);
        self.tasks[idx].notes.push(note.clone());
        if let Err(e) = self.flush() {
            self.tasks[idx].notes.pop();
            return Err(e);
        }
        Ok(Some(note))
    }

    pub fn delete_note(&mut self, task_id: TaskId, note_id: NoteId) -> StoreResult<bool> {
        let idx = match self.position(task_id) {
            Some(i) => i,
            None => return Ok(false),
        };
        let note_idx = match self.tasks[idx].notes.iter().position(|n| n.id == note_id) {
            Some(i) => i,
            None => return Ok(false),
        };
        let removed = self.tasks[idx].notes.remove(note_idx);
        if let Err(e) = self.flush() {
            self.tasks[idx].notes.insert(note_idx, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Case-insensitive substring search over title and description, ANDed
    /// with the category filter. Insertion order is preserved.
    pub fn query(&self, search: &str, filter: CategoryFilter) -> Vec<&Task> {
        let needle = search.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| {
                let text_match = needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle);
                text_match && filter.matches(t)
            })
            .collect()
    }

    pub fn counts(&self) -> Counts {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Counts {
            total,
            completed,
            pending: total - completed,
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}
