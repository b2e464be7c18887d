use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::model::{Note, Task};
use crate::store::Counts;

/// First hyphen-free group of the id, enough to paste back as a prefix.
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_task_list(tasks: &[&Task], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for task in tasks {
        let due = match task.due_date {
            Some(d) if task.is_overdue(now) => format!("  due {} (overdue)", format_local(d)),
            Some(d) => format!("  due {}", format_local(d)),
            None => String::new(),
        };
        let notes = match task.notes.len() {
            0 => String::new(),
            1 => "  (1 note)".to_string(),
            n => format!("  ({n} notes)"),
        };
        out.push_str(&format!(
            "{} {}  {}  #{}{}{}\n",
            task.icon(now),
            short_id(task.id),
            task.title,
            task.category,
            due,
            notes
        ));
    }
    out
}

pub fn format_task_detail(task: &Task, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Id:          {}\n", task.id));
    out.push_str(&format!("Title:       {}\n", task.title));
    out.push_str(&format!("Category:    {}\n", task.category));
    out.push_str(&format!(
        "Status:      {}\n",
        if task.completed { "completed" } else { "pending" }
    ));
    if !task.description.is_empty() {
        out.push_str(&format!("Description: {}\n", task.description));
    }
    if let Some(due) = task.due_date {
        let marker = if task.is_overdue(now) { " (overdue)" } else { "" };
        out.push_str(&format!("Due:         {}{}\n", format_local(due), marker));
    }
    out.push_str(&format!("Created:     {}\n", format_local(task.created_at)));

    if !task.notes.is_empty() {
        out.push('\n');
        out.push_str("Notes:\n");
        for note in &task.notes {
            out.push_str(&format!(
                "  [{}] {}  {}\n",
                format_local(note.created_at),
                short_id(note.id),
                note.content
            ));
        }
    }

    out
}

pub fn format_notes(notes: &[Note]) -> String {
    let mut out = String::new();
    for note in notes {
        out.push_str(&format!(
            "[{}] {}  {}\n",
            format_local(note.created_at),
            short_id(note.id),
            note.content
        ));
    }
    out
}

pub fn format_counts(counts: &Counts) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total:     {}\n", counts.total));
    out.push_str(&format!("Completed: {}\n", counts.completed));
    out.push_str(&format!("Pending:   {}\n", counts.pending));
    out
}
