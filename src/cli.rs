use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gorev",
    about = "Task tracker with notes, categories, and due dates",
    version
)]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.gorev/gorev.db]
    #[arg(long, env = "GOREV_DB", global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database (idempotent)
    Init,

    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long, default_value = "")]
        desc: String,
        /// Category (work, personal, urgent, shopping, health)
        #[arg(short, long, default_value = "work")]
        category: String,
        /// Due date, e.g. 2025-07-01 or "2025-07-01 18:00"
        #[arg(long)]
        due: Option<String>,
        /// Output the created task as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a task; fields not given keep their current value
    Edit {
        /// Task id (or unambiguous prefix)
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        desc: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New due date
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Toggle a task between pending and completed
    Toggle {
        /// Task id (or unambiguous prefix)
        id: String,
    },

    /// Remove a task and its notes
    Rm {
        /// Task id (or unambiguous prefix)
        id: String,
    },

    /// Show task details
    Show {
        /// Task id (or unambiguous prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tasks
    List {
        /// Substring to match in title or description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Category to keep, or "all"
        #[arg(short, long, default_value = "all")]
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a note to a task
    Note {
        /// Task id (or unambiguous prefix)
        id: String,
        /// Note content
        content: String,
    },

    /// Remove a note from a task
    Unnote {
        /// Task id (or unambiguous prefix)
        id: String,
        /// Note id (or unambiguous prefix)
        note_id: String,
    },

    /// List a task's notes
    Notes {
        /// Task id (or unambiguous prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show task counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or set the dark-mode preference
    Theme {
        /// "dark" or "light"; omit to print the current setting
        mode: Option<String>,
    },
}
