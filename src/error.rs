use media_index::IndexError;
use std::fmt;

/// Central error types for the gallery app
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Configuration could not be read or parsed
    Config(String),
    /// Media index error that was not recovered inside the library
    Index(IndexError),
    /// Resource not found
    NotFound(String),
    /// General error
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Index(e) => write!(f, "Index error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<IndexError> for AppError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::DatabaseError(e) => AppError::Database(e),
            IndexError::IoError(e) => AppError::Filesystem(e),
            IndexError::NotFound(path) => AppError::NotFound(path.display().to_string()),
            other => AppError::Index(other),
        }
    }
}

/// Empty-state style messages for the UI layer
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check storage permissions.".to_string()
            }
            AppError::Config(msg) => format!("Invalid configuration: {}", msg),
            AppError::Index(IndexError::Cancelled) => "Loading was cancelled.".to_string(),
            AppError::Index(_) => "No media found.".to_string(),
            AppError::NotFound(msg) => format!("{} was not found.", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_index_error_mapping() {
        let err: AppError = IndexError::NotFound(PathBuf::from("/sd/Gone")).into();
        assert!(matches!(err, AppError::NotFound(ref p) if p == "/sd/Gone"));
        assert_eq!(err.user_message(), "/sd/Gone was not found.");

        let err: AppError = IndexError::Cancelled.into();
        assert_eq!(err.user_message(), "Loading was cancelled.");

        let err: AppError = IndexError::CatalogUnavailable("revoked".into()).into();
        assert_eq!(err.user_message(), "No media found.");
    }
}
