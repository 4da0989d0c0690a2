pub mod preferences;
pub mod schema;

use crate::config::GalleryConfig;
use crate::error::AppError;
use rusqlite::Connection;

pub use preferences::SqlitePreferenceStore;

/// Opens the database file named by `config` and makes sure the schema exists
pub fn init_database(config: &GalleryConfig) -> Result<Connection, AppError> {
    let db_path = config.database_path();

    // Make sure the directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&db_path)?;
    schema::init_schema(&conn)?;

    log::debug!("Database ready at {}", db_path.display());
    Ok(conn)
}
