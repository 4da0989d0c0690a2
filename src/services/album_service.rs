use crate::config::SelectionMode;
use crate::error::AppError;
use media_index::{
    migrate_folder_selection, AlbumFolder, AlbumSelection, CancelToken, FolderSelection,
    IndexError, MediaLibraryService, Photo, PreferenceStore, SelectionKind, VisibilityPreference,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Album listing and the user's folder / bucket selection
pub struct AlbumService {
    library: Arc<MediaLibraryService>,
    folders: FolderSelection,
    albums: AlbumSelection,
    mode: SelectionMode,
}

impl AlbumService {
    pub fn new(
        library: Arc<MediaLibraryService>,
        store: Arc<dyn PreferenceStore>,
        mode: SelectionMode,
    ) -> Self {
        Self {
            library,
            folders: FolderSelection::new(Arc::clone(&store)),
            albums: AlbumSelection::new(store),
            mode,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn folders(&self) -> &FolderSelection {
        &self.folders
    }

    pub fn albums(&self) -> &AlbumSelection {
        &self.albums
    }

    /// The visibility preference of the active selection mode
    pub fn visibility(&self) -> VisibilityPreference {
        match self.mode {
            SelectionMode::Folders => self.folders.visibility(),
            SelectionMode::Buckets => self.albums.visibility(),
        }
    }

    /// Lazy cover mode listing
    pub async fn covers(
        &self,
        cancel: CancelToken,
    ) -> Result<BTreeMap<String, Vec<Photo>>, AppError> {
        Ok(self.library.build_covers(self.visibility(), cancel).await?)
    }

    /// Full bucket mode listing
    pub async fn album_folders(&self, cancel: CancelToken) -> Result<Vec<AlbumFolder>, AppError> {
        Ok(self
            .library
            .build_album_folders(self.visibility(), cancel)
            .await?)
    }

    /// Paths of the albums the user currently sees
    pub async fn visible_album_paths(&self, cancel: CancelToken) -> Result<Vec<String>, AppError> {
        match self.mode {
            SelectionMode::Folders => {
                let pref = self.visibility();
                let filter = self.library.filter();
                Ok(self
                    .library
                    .list_all_folders()
                    .await?
                    .into_iter()
                    .filter(|folder| filter.is_visible(folder, &pref))
                    .collect())
            }
            SelectionMode::Buckets => Ok(self
                .album_folders(cancel)
                .await?
                .into_iter()
                .map(|album| album.path)
                .collect()),
        }
    }

    /// Shows `folder` and every folder below it.
    ///
    /// The folder is stored as its canonical absolute path. Returns the number
    /// of folders added to the selection.
    pub async fn select_folder(&self, folder: &Path, cancel: CancelToken) -> Result<usize, AppError> {
        let folder = std::fs::canonicalize(folder).map_err(|e| IndexError::from_io(e, folder))?;
        let folder = folder.as_path();
        let mut selected: Vec<String> = vec![folder.to_string_lossy().into_owned()];
        selected.extend(
            self.library
                .collect_subfolders(folder.to_path_buf(), cancel)
                .await?,
        );
        let added = selected.len();

        self.folders.add_folders(selected)?;
        self.folders.set_show_all(false)?;
        self.folders.complete_first_launch()?;
        self.library.invalidate_cache();

        log::info!("Selected {} with {} subfolder(s)", folder.display(), added - 1);
        Ok(added)
    }

    /// Hides `folder` again; its subfolders stay selected.
    pub fn deselect_folder(&self, folder: &str) -> Result<(), AppError> {
        self.folders.remove_folder(folder)?;
        self.library.invalidate_cache();
        Ok(())
    }

    /// Clears any restriction in both selection sets
    pub fn show_all(&self) -> Result<(), AppError> {
        self.folders.set_show_all(true)?;
        self.albums.set_show_all(true)?;
        self.folders.complete_first_launch()?;
        self.albums.complete_first_launch()?;
        self.library.invalidate_cache();
        Ok(())
    }

    /// Replaces the bucket selection
    pub fn select_buckets<I: IntoIterator<Item = String>>(&self, ids: I) -> Result<(), AppError> {
        let ids: HashSet<String> = ids.into_iter().collect();
        self.albums.set_selected_bucket_ids(&ids)?;
        self.albums.set_show_all(false)?;
        self.albums.complete_first_launch()?;
        self.library.invalidate_cache();
        Ok(())
    }

    /// On the first bucket-mode launch, carries an existing folder selection over.
    pub async fn migrate_if_needed(&self, cancel: CancelToken) -> Result<Option<usize>, AppError> {
        if self.mode != SelectionMode::Buckets || !self.albums.is_first_launch() {
            return Ok(None);
        }

        let all = self
            .library
            .build_album_folders(VisibilityPreference::show_all(SelectionKind::BucketId), cancel)
            .await?;
        let mapping: HashMap<String, String> = all
            .into_iter()
            .map(|album| (album.path, album.bucket_id))
            .collect();

        let migrated = migrate_folder_selection(&self.folders, &self.albums, &mapping)?;
        self.library.invalidate_cache();
        Ok(Some(migrated))
    }
}
