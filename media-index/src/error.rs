use std::path::PathBuf;

/// Error type for media indexing operations
///
/// Most of these are recovered inside the crate and turned into empty results;
/// they surface only from the lower-level `Result` returning functions.
#[derive(Debug)]
pub enum IndexError {
    /// Catalog query failed or the provider is not reachable
    CatalogUnavailable(String),
    /// A directory could not be listed because of permissions
    AccessDenied(PathBuf),
    /// A catalog row lacked a required column
    MalformedEntry(String),
    /// A referenced folder or file no longer exists
    NotFound(PathBuf),
    /// The pass was cancelled by its caller
    Cancelled,
    IoError(std::io::Error),
    DatabaseError(rusqlite::Error),
    Preferences(String),
    /// A background task panicked or was aborted
    TaskFailed(String),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::CatalogUnavailable(msg) => write!(f, "Catalog unavailable: {}", msg),
            IndexError::AccessDenied(path) => write!(f, "Access denied: {}", path.display()),
            IndexError::MalformedEntry(msg) => write!(f, "Malformed catalog entry: {}", msg),
            IndexError::NotFound(path) => write!(f, "Not found: {}", path.display()),
            IndexError::Cancelled => write!(f, "Operation cancelled"),
            IndexError::IoError(e) => write!(f, "IO error: {}", e),
            IndexError::DatabaseError(e) => write!(f, "Database error: {}", e),
            IndexError::Preferences(msg) => write!(f, "Preference error: {}", msg),
            IndexError::TaskFailed(msg) => write!(f, "Task join error: {}", msg),
        }
    }
}

impl std::error::Error for IndexError {}

impl From<rusqlite::Error> for IndexError {
    fn from(err: rusqlite::Error) -> Self {
        IndexError::DatabaseError(err)
    }
}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        IndexError::IoError(err)
    }
}

impl IndexError {
    /// Classifies an I/O failure on `path` into the recoverable variants.
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => IndexError::AccessDenied(path.into()),
            std::io::ErrorKind::NotFound => IndexError::NotFound(path.into()),
            _ => IndexError::IoError(err),
        }
    }

    /// Whether the condition is one that callers convert to an empty result
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, IndexError::Cancelled)
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
