use crate::config::GalleryConfig;
use crate::database::{self, SqlitePreferenceStore};
use crate::error::AppError;
use crate::services::AlbumService;
use media_index::{LastImage, MediaCatalog, MediaLibraryService, PreferenceStore, SqliteCatalog};
use std::sync::Arc;

/// Everything a session needs, constructed once at startup and passed down
pub struct Gallery {
    pub config: GalleryConfig,
    pub catalog: Arc<SqliteCatalog>,
    pub library: Arc<MediaLibraryService>,
    pub prefs: Arc<dyn PreferenceStore>,
    pub albums: AlbumService,
}

impl Gallery {
    pub fn open(config: GalleryConfig) -> Result<Self, AppError> {
        config.validate()?;
        let conn = database::init_database(&config)?;
        let prefs: Arc<dyn PreferenceStore> = Arc::new(SqlitePreferenceStore::new(conn));
        let catalog = Arc::new(SqliteCatalog::open(&config.database_path())?);
        Ok(Self::assemble(config, catalog, prefs))
    }

    pub fn assemble(
        config: GalleryConfig,
        catalog: Arc<SqliteCatalog>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        let primary: Box<dyn MediaCatalog> = Box::new(Arc::clone(&catalog));
        let library = Arc::new(MediaLibraryService::new(config.index_config(), primary));
        let albums = AlbumService::new(
            Arc::clone(&library),
            Arc::clone(&prefs),
            config.selection_mode,
        );

        Self {
            config,
            catalog,
            library,
            prefs,
            albums,
        }
    }

    pub fn last_image(&self) -> LastImage {
        LastImage::new(Arc::clone(&self.prefs))
    }
}
