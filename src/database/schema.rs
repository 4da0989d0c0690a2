use rusqlite::{Connection, Result};

/// Initialize the app database schema
///
/// The media catalog tables are owned by `media-index` and created here too,
/// so one file holds everything.
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Schema version table for future migrations
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_schema(conn)?;
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
    }

    media_index::init_catalog_schema(conn)?;

    Ok(())
}

/// Create the schema (version 1)
fn create_schema(conn: &Connection) -> Result<()> {
    // Table: preferences (typed key-value store, string sets as JSON arrays)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            kind TEXT CHECK(kind IN ('bool', 'int', 'string', 'set')) NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS update_preferences_timestamp
         AFTER UPDATE ON preferences
         BEGIN
            UPDATE preferences SET updated_at = CURRENT_TIMESTAMP WHERE key = NEW.key;
         END",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        for table in ["preferences", "media", "schema_version", "catalog_schema_version"] {
            assert!(tables.iter().any(|t| t == table), "missing {}", table);
        }
    }
}
