use std::fmt;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type NoteId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Urgent,
    Shopping,
    Health,
}

impl Category {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "urgent" => Ok(Self::Urgent),
            "shopping" => Ok(Self::Shopping),
            "health" => Ok(Self::Health),
            _ => bail!(
                "invalid category '{s}': must be work, personal, urgent, shopping, or health"
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Urgent => "urgent",
            Self::Shopping => "shopping",
            Self::Health => "health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter for query; "all" matches every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Result<Self> {
        if s == "all" {
            Ok(Self::All)
        } else {
            Ok(Self::Only(Category::parse(s)?))
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => task.category == *c,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub task_id: TaskId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        title: String,
        description: String,
        category: Category,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            category,
            due_date,
            completed: false,
            notes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// True when the due date has passed and the task is still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && !self.completed,
            None => false,
        }
    }

    pub fn icon(&self, now: DateTime<Utc>) -> &'static str {
        if self.completed {
            "x"
        } else if self.is_overdue(now) {
            "!"
        } else {
            "."
        }
    }
}

impl Note {
    pub fn new(task_id: TaskId, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            content,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_roundtrip() {
        for s in ["work", "personal", "urgent", "shopping", "health"] {
            assert_eq!(Category::parse(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn invalid_category() {
        assert!(Category::parse("").is_err());
        assert!(Category::parse("Work").is_err());
        assert!(Category::parse("chores").is_err());
    }

    #[test]
    fn filter_all_matches_everything() {
        let task = Task::new("t".to_string(), String::new(), Category::Health, None);
        assert!(CategoryFilter::All.matches(&task));
        assert!(CategoryFilter::Only(Category::Health).matches(&task));
        assert!(!CategoryFilter::Only(Category::Work).matches(&task));
    }

    #[test]
    fn filter_parse() {
        assert_eq!(CategoryFilter::parse("all").unwrap(), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("urgent").unwrap(),
            CategoryFilter::Only(Category::Urgent)
        );
        assert!(CategoryFilter::parse("everything").is_err());
    }

    #[test]
    fn overdue_needs_past_due_and_open() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap();

        let mut task = Task::new("t".to_string(), String::new(), Category::Work, Some(past));
        assert!(task.is_overdue(now));

        task.completed = true;
        assert!(!task.is_overdue(now));

        task.completed = false;
        task.due_date = Some(future);
        assert!(!task.is_overdue(now));

        task.due_date = None;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn icons() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 0).unwrap();

        let mut task = Task::new("t".to_string(), String::new(), Category::Work, None);
        assert_eq!(task.icon(now), ".");

        task.due_date = Some(past);
        assert_eq!(task.icon(now), "!");

        task.completed = true;
        assert_eq!(task.icon(now), "x");
    }

    #[test]
    fn task_serializes_camel_case() {
        let mut task = Task::new(
            "Buy milk".to_string(),
            "2 liters".to_string(),
            Category::Shopping,
            None,
        );
        task.notes.push(Note::new(task.id, "whole milk".to_string()));

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["category"], "shopping");
        assert_eq!(json["completed"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("dueDate").is_none());
        assert_eq!(json["notes"][0]["taskId"], json["id"]);
        assert!(json["notes"][0].get("createdAt").is_some());
    }

    #[test]
    fn task_deserializes_without_notes_key() {
        let json = r#"{
            "id": "5f64a1c2-9f07-4c96-b1f9-17e4a3c0e1aa",
            "title": "Call dentist",
            "description": "",
            "category": "health",
            "completed": false,
            "createdAt": "2025-06-01T09:30:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.notes.is_empty());
        assert!(task.due_date.is_none());
    }
}
