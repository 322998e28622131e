use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, StoreError};

/// Layout version of the SQLite file, independent of the memento record
/// format version carried inside the `mementos` table.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS mementos (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Prepare a connection: pragmas, tables, and the schema version stamp.
/// Safe to call on every open. A file written by a newer schema is refused.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.execute_batch(CREATE_TABLES)?;

    match get_schema_version(conn)? {
        Some(found) if found > SCHEMA_VERSION => {
            return Err(StoreError::InvalidData(format!(
                "database schema {found} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        Some(found) if found == SCHEMA_VERSION => {}
        _ => {
            conn.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
                [SCHEMA_VERSION.to_string()],
            )?;
            tracing::debug!("stamped schema version {SCHEMA_VERSION}");
        }
    }
    Ok(())
}

/// The stamped schema version. An unparsable stamp reads as 0.
pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.map(|v| v.parse().unwrap_or(0)))
}
