use crate::error::AppError;
use media_index::{MediaIndexConfig, PrefixMatch};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "gallery.toml";

/// Which preference set decides album visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Folder paths, subfolders included
    #[default]
    Folders,
    /// Catalog bucket ids
    Buckets,
}

/// App configuration, read from `gallery.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub page_size: usize,
    pub cache_ttl_ms: u64,
    pub slideshow_interval_ms: u64,
    pub search_debounce_ms: u64,
    pub selection_mode: SelectionMode,
    pub prefix_match: PrefixMatch,
    /// Walk `scan_roots` directly when the catalog cannot be queried
    pub filesystem_fallback: bool,
    pub scan_roots: Vec<PathBuf>,
    pub log_level: String,
}

/// Get the data directory based on platform
fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        PathBuf::from("/data/local/tmp/gallery")
    }

    #[cfg(not(target_os = "android"))]
    {
        PathBuf::from("./data")
    }
}

fn default_scan_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "android")]
    {
        vec![PathBuf::from("/storage/emulated/0")]
    }

    #[cfg(not(target_os = "android"))]
    {
        Vec::new()
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: "gallery.db".to_string(),
            page_size: 50,
            cache_ttl_ms: 30_000,
            slideshow_interval_ms: 3_000,
            search_debounce_ms: 300,
            selection_mode: SelectionMode::Folders,
            prefix_match: PrefixMatch::Literal,
            filesystem_fallback: false,
            scan_roots: default_scan_roots(),
            log_level: "info".to_string(),
        }
    }
}

impl GalleryConfig {
    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads `explicit` if given (it must exist), else `<data_dir>/gallery.toml`
    /// when present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::NotFound(path.display().to_string()));
                }
                path.to_path_buf()
            }
            None => {
                let path = default_data_dir().join(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".to_string()));
        }
        if self.slideshow_interval_ms == 0 {
            return Err(AppError::Config(
                "slideshow_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.database_file.is_empty() {
            return Err(AppError::Config("database_file must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow_interval_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn index_config(&self) -> MediaIndexConfig {
        MediaIndexConfig {
            page_size: self.page_size,
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
            prefix_match: self.prefix_match,
            fallback_roots: if self.filesystem_fallback {
                self.scan_roots.clone()
            } else {
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GalleryConfig::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.cache_ttl_ms, 30_000);
        assert_eq!(config.selection_mode, SelectionMode::Folders);
        assert_eq!(config.prefix_match, PrefixMatch::Literal);
        assert!(config.index_config().fallback_roots.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GalleryConfig::from_toml(
            r#"
            page_size = 20
            selection_mode = "buckets"
            prefix_match = "path_segment"
            filesystem_fallback = true
            scan_roots = ["/sdcard/DCIM"]
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.selection_mode, SelectionMode::Buckets);
        assert_eq!(config.search_debounce_ms, 300);

        let index = config.index_config();
        assert_eq!(index.prefix_match, PrefixMatch::PathSegment);
        assert_eq!(index.fallback_roots, vec![PathBuf::from("/sdcard/DCIM")]);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            GalleryConfig::from_toml("page_size = \"many\""),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(CONFIG_FILE_NAME);

        let config = GalleryConfig {
            data_dir: dir.path().to_path_buf(),
            slideshow_interval_ms: 1_500,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = GalleryConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.database_path(), dir.path().join("gallery.db"));

        assert!(matches!(
            GalleryConfig::load(Some(&dir.path().join("missing.toml"))),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_validate() {
        let config = GalleryConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
