use media_index::{IndexError, IndexResult, PreferenceStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::Mutex;

/// Preference store backed by the `preferences` table
pub struct SqlitePreferenceStore {
    conn: Mutex<Connection>,
}

impl SqlitePreferenceStore {
    /// Takes a connection whose schema is already initialized
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn read(&self, key: &str, kind: &str) -> Option<String> {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(_) => {
                log::error!("Preference connection lock poisoned");
                return None;
            }
        };
        conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1 AND kind = ?2",
            params![key, kind],
            |row| row.get(0),
        )
        .optional()
        .unwrap_or_else(|e| {
            log::warn!("Failed to read preference {}: {}", key, e);
            None
        })
    }

    fn write(&self, key: &str, kind: &str, value: &str) -> IndexResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| IndexError::Preferences("connection lock poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO preferences (key, kind, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET kind = excluded.kind, value = excluded.value",
            params![key, kind, value],
        )?;
        Ok(())
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.read(key, "bool").map(|v| v == "true")
    }

    fn set_bool(&self, key: &str, value: bool) -> IndexResult<()> {
        self.write(key, "bool", if value { "true" } else { "false" })
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.read(key, "int")?.parse().ok()
    }

    fn set_i64(&self, key: &str, value: i64) -> IndexResult<()> {
        self.write(key, "int", &value.to_string())
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.read(key, "string")
    }

    fn set_string(&self, key: &str, value: &str) -> IndexResult<()> {
        self.write(key, "string", value)
    }

    fn get_string_set(&self, key: &str) -> Option<HashSet<String>> {
        let json = self.read(key, "set")?;
        match serde_json::from_str::<Vec<String>>(&json) {
            Ok(values) => Some(values.into_iter().collect()),
            Err(e) => {
                log::warn!("Corrupt string set for {}: {}", key, e);
                None
            }
        }
    }

    fn set_string_set(&self, key: &str, value: &HashSet<String>) -> IndexResult<()> {
        let mut sorted: Vec<&String> = value.iter().collect();
        sorted.sort();
        let json = serde_json::to_string(&sorted)
            .map_err(|e| IndexError::Preferences(e.to_string()))?;
        self.write(key, "set", &json)
    }

    fn remove(&self, key: &str) -> IndexResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| IndexError::Preferences("connection lock poisoned".to_string()))?;
        conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> IndexResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| IndexError::Preferences("connection lock poisoned".to_string()))?;
        conn.execute("DELETE FROM preferences", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_index::{FolderSelection, LastImage};
    use std::sync::Arc;

    fn setup_test_store() -> SqlitePreferenceStore {
        let conn = Connection::open_in_memory().unwrap();
        crate::database::schema::init_schema(&conn).unwrap();
        SqlitePreferenceStore::new(conn)
    }

    #[test]
    fn test_typed_values() {
        let store = setup_test_store();
        store.set_bool("flag", true).unwrap();
        store.set_i64("count", -3).unwrap();
        store.set_string("name", "Camera").unwrap();

        assert_eq!(store.get_bool("flag"), Some(true));
        assert_eq!(store.get_i64("count"), Some(-3));
        assert_eq!(store.get_string("name").as_deref(), Some("Camera"));
        assert_eq!(store.get_string("flag"), None);
        assert_eq!(store.get_bool("missing"), None);
    }

    #[test]
    fn test_string_set_as_json() {
        let store = setup_test_store();
        let set: HashSet<String> = ["/sd/B", "/sd/A"].iter().map(|s| s.to_string()).collect();
        store.set_string_set("folders", &set).unwrap();
        assert_eq!(store.get_string_set("folders"), Some(set));

        let raw: String = store
            .conn
            .lock()
            .unwrap()
            .query_row(
                "SELECT value FROM preferences WHERE key = 'folders'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, r#"["/sd/A","/sd/B"]"#);
    }

    #[test]
    fn test_overwrite_remove_clear() {
        let store = setup_test_store();
        store.set_bool("k", true).unwrap();
        store.set_string("k", "now a string").unwrap();
        assert_eq!(store.get_bool("k"), None);
        assert_eq!(store.get_string("k").as_deref(), Some("now a string"));

        store.remove("k").unwrap();
        assert_eq!(store.get_string("k"), None);

        store.set_i64("a", 1).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get_i64("a"), None);
    }

    #[test]
    fn test_typed_views_over_sqlite() {
        let store: Arc<dyn PreferenceStore> = Arc::new(setup_test_store());
        let folders = FolderSelection::new(store.clone());
        folders.set_show_all(false).unwrap();
        folders.add_folders(["/sd/DCIM".to_string()]).unwrap();
        assert!(folders.visibility().allow_set.contains("/sd/DCIM"));

        let last = LastImage::new(store);
        last.save("/sd/DCIM/a.jpg", 4).unwrap();
        assert_eq!(last.position(), 4);
    }
}
