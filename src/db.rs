use anyhow::Result;
use log::warn;
use rusqlite::{Connection, OptionalExtension};

/// Key holding the serialized task collection.
pub const KEY_TASKS: &str = "tasks";
/// Key holding the dark-mode view preference.
pub const KEY_DARK_MODE: &str = "isDarkMode";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS store (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

fn set_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    set_pragmas(&conn)?;
    Ok(conn)
}

pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    set_pragmas(&conn)?;
    init(&conn)?;
    Ok(conn)
}

pub fn get(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT value FROM store WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
}

pub fn set(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO store (key, value) VALUES (?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// Read the dark-mode preference; unreadable values fall back to false.
pub fn load_dark_mode(conn: &Connection) -> Result<bool> {
    match get(conn, KEY_DARK_MODE)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(enabled) => Ok(enabled),
            Err(e) => {
                warn!("ignoring unreadable {KEY_DARK_MODE} value: {e}");
                Ok(false)
            }
        },
        None => Ok(false),
    }
}

pub fn save_dark_mode(conn: &Connection, enabled: bool) -> Result<()> {
    set(conn, KEY_DARK_MODE, &serde_json::to_string(&enabled)?)?;
    Ok(())
}
