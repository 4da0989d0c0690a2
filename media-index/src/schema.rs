use rusqlite::{Connection, Result};

/// Initialize the media catalog schema
///
/// The `media` table mirrors the columns of the platform media index that the
/// indexer reads: id, absolute path, bucket id and display name, date added,
/// MIME type and whether the row is an image or a video.
pub fn init_catalog_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS catalog_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM catalog_schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_catalog_schema_v1(conn)?;
        conn.execute("INSERT INTO catalog_schema_version (version) VALUES (1)", [])?;
    }

    Ok(())
}

fn create_catalog_schema_v1(conn: &Connection) -> Result<()> {
    // path and bucket columns are nullable on purpose: the platform index can
    // hold rows without them and readers must drop those rows
    conn.execute(
        "CREATE TABLE IF NOT EXISTS media (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            _data TEXT UNIQUE,
            bucket_id TEXT,
            bucket_display_name TEXT,
            date_added INTEGER NOT NULL DEFAULT 0,
            mime_type TEXT,
            media_type TEXT CHECK(media_type IN ('image', 'video')) NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_media_type_date ON media(media_type, date_added DESC)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_media_bucket ON media(bucket_id)",
        [],
    )?;

    Ok(())
}
