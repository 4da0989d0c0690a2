//! Viewer session: stepping through an album, continuing into the next
//! album, the slideshow timer and resuming at the last viewed image.

use crate::error::AppError;
use media_index::{compare_folders, folder_of, get_images_from_album, LastImage, Photo};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Called whenever the viewer lands on an item
pub trait OnItemSelected: Send + Sync {
    fn on_item_selected(&self, item: &Photo, index: usize);
}

/// Remembers the shown image for the next launch
pub struct LastImageRecorder {
    last: LastImage,
}

impl LastImageRecorder {
    pub fn new(last: LastImage) -> Self {
        Self { last }
    }
}

impl OnItemSelected for LastImageRecorder {
    fn on_item_selected(&self, item: &Photo, index: usize) {
        if !self.last.is_resume_enabled() {
            return;
        }
        if let Err(e) = self.last.save(&item.path, index) {
            log::warn!("Could not remember last image: {}", e);
        }
    }
}

/// A materialised album inside a [`FolderSequence`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumContents {
    pub path: String,
    pub name: String,
    pub photos: Vec<Photo>,
}

/// Visible albums in natural folder order, empty ones left out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSequence {
    albums: Vec<AlbumContents>,
}

impl FolderSequence {
    /// Lists each album from the filesystem. Blocking.
    pub fn build(mut album_paths: Vec<String>) -> Self {
        album_paths.sort_by(|a, b| compare_folders(Path::new(a), Path::new(b)).then_with(|| a.cmp(b)));
        album_paths.dedup();

        let albums = album_paths
            .into_iter()
            .filter_map(|path| {
                let photos: Vec<Photo> = get_images_from_album(Path::new(&path))
                    .into_iter()
                    .enumerate()
                    .map(|(idx, photo)| Photo { position: idx, ..photo })
                    .collect();
                if photos.is_empty() {
                    log::debug!("Skipping empty album {}", path);
                    return None;
                }
                let name = Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone());
                Some(AlbumContents { path, name, photos })
            })
            .collect();

        Self { albums }
    }

    pub async fn build_async(album_paths: Vec<String>) -> Result<Self, AppError> {
        tokio::task::spawn_blocking(move || Self::build(album_paths))
            .await
            .map_err(|e| AppError::Other(format!("Task join error: {}", e)))
    }

    pub fn albums(&self) -> &[AlbumContents] {
        &self.albums
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn is_cross_folder(&self) -> bool {
        self.albums.len() > 1
    }

    pub fn index_of(&self, album: &str) -> Option<usize> {
        let wanted = Path::new(album);
        self.albums.iter().position(|a| Path::new(&a.path) == wanted)
    }
}

/// Result of stepping forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Next item in the same album
    Moved(usize),
    /// First item of the next album
    NextFolder { name: String },
    /// Nothing left
    End,
}

pub struct ViewerSession {
    sequence: FolderSequence,
    album: usize,
    position: usize,
    listener: Option<Arc<dyn OnItemSelected>>,
}

impl ViewerSession {
    /// Opens `album` at `position`; out-of-range positions start at 0.
    pub fn open(sequence: FolderSequence, album: &str, position: usize) -> Result<Self, AppError> {
        let index = sequence
            .index_of(album)
            .ok_or_else(|| AppError::NotFound(format!("Album {}", album)))?;
        let len = sequence.albums[index].photos.len();
        let position = if position < len { position } else { 0 };

        Ok(Self {
            sequence,
            album: index,
            position,
            listener: None,
        })
    }

    pub fn with_listener(mut self, listener: Arc<dyn OnItemSelected>) -> Self {
        self.listener = Some(listener);
        self.notify();
        self
    }

    fn notify(&self) {
        if let (Some(listener), Some(item)) = (&self.listener, self.current()) {
            listener.on_item_selected(item, self.position);
        }
    }

    fn current_album(&self) -> &AlbumContents {
        &self.sequence.albums[self.album]
    }

    pub fn current(&self) -> Option<&Photo> {
        self.current_album().photos.get(self.position)
    }

    pub fn album_path(&self) -> &str {
        &self.current_album().path
    }

    pub fn album_name(&self) -> &str {
        &self.current_album().name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn album_len(&self) -> usize {
        self.current_album().photos.len()
    }

    /// Total items across every album of the sequence
    pub fn total_items(&self) -> usize {
        self.sequence.albums.iter().map(|a| a.photos.len()).sum()
    }

    /// Name of the album a forward step at the last item would open
    pub fn next_folder_name(&self) -> Option<&str> {
        self.sequence
            .albums
            .get(self.album + 1)
            .map(|a| a.name.as_str())
    }

    pub fn jump_to(&mut self, position: usize) -> bool {
        if position >= self.album_len() {
            return false;
        }
        self.position = position;
        self.notify();
        true
    }

    pub fn advance(&mut self) -> Advance {
        if self.position + 1 < self.album_len() {
            self.position += 1;
            self.notify();
            return Advance::Moved(self.position);
        }

        if self.album + 1 < self.sequence.albums.len() {
            self.album += 1;
            self.position = 0;
            self.notify();
            return Advance::NextFolder {
                name: self.album_name().to_string(),
            };
        }

        Advance::End
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideshowState {
    Idle,
    Playing,
    Paused,
}

/// Timer-driven advancing of a shared [`ViewerSession`].
///
/// The ticker task owns the only sender of the step stream, so the stream
/// closes once the task ends.
pub struct Slideshow {
    session: Arc<Mutex<ViewerSession>>,
    interval: Duration,
    state: Arc<Mutex<SlideshowState>>,
    task: Option<JoinHandle<()>>,
}

impl Slideshow {
    pub fn new(session: Arc<Mutex<ViewerSession>>, interval: Duration) -> Self {
        Self {
            session,
            interval,
            state: Arc::new(Mutex::new(SlideshowState::Idle)),
            task: None,
        }
    }

    pub fn state(&self) -> SlideshowState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(SlideshowState::Idle)
    }

    fn set_state(&self, state: SlideshowState) {
        if let Ok(mut s) = self.state.lock() {
            *s = state;
        }
    }

    /// Starts ticking. Returns the stream of steps taken; it closes after
    /// [`Advance::End`] or when the slideshow is stopped.
    ///
    /// Needs more than one item and a running tokio runtime.
    pub fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Advance>, AppError> {
        let total = self
            .session
            .lock()
            .map_err(|_| AppError::Other("viewer session lock poisoned".to_string()))?
            .total_items();
        if total < 2 {
            return Err(AppError::Other(
                "Slideshow needs at least two items".to_string(),
            ));
        }

        self.abort_task();
        let (tx, rx) = mpsc::unbounded_channel();
        self.spawn_ticker(tx);
        Ok(rx)
    }

    fn spawn_ticker(&mut self, tx: mpsc::UnboundedSender<Advance>) {
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);
        let interval = self.interval;

        self.set_state(SlideshowState::Playing);
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match state.lock().map(|s| *s) {
                    Ok(SlideshowState::Paused) => continue,
                    Ok(_) => {}
                    Err(_) => break,
                }
                let step = match session.lock() {
                    Ok(mut session) => session.advance(),
                    Err(_) => Advance::End,
                };
                let done = step == Advance::End;
                if tx.send(step).is_err() || done {
                    break;
                }
            }
            if let Ok(mut s) = state.lock() {
                *s = SlideshowState::Idle;
            }
        }));
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Holds the current item; ticks are skipped until [`Slideshow::resume`].
    pub fn pause(&mut self) {
        if self.state() == SlideshowState::Playing {
            self.set_state(SlideshowState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state() != SlideshowState::Paused {
            return;
        }
        let running = self.task.as_ref().is_some_and(|t| !t.is_finished());
        if running {
            self.set_state(SlideshowState::Playing);
        } else {
            self.set_state(SlideshowState::Idle);
        }
    }

    pub fn stop(&mut self) {
        self.abort_task();
        self.set_state(SlideshowState::Idle);
    }
}

impl Drop for Slideshow {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// Where to reopen the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeTarget {
    pub album: String,
    pub path: String,
    pub position: usize,
}

/// Finds the last viewed image in its album, clearing the stored image when
/// it no longer exists. Blocking.
pub fn resume_target(last: &LastImage) -> Result<Option<ResumeTarget>, AppError> {
    if !last.is_resume_enabled() {
        return Ok(None);
    }
    let Some(path) = last.path() else {
        return Ok(None);
    };

    let album = folder_of(&path).filter(|_| last.has_last_image());
    let Some(album) = album else {
        log::info!("Last image {} is gone, forgetting it", path);
        last.clear()?;
        return Ok(None);
    };

    let photos = get_images_from_album(Path::new(&album));
    match photos.iter().position(|p| p.path == path) {
        Some(position) => Ok(Some(ResumeTarget {
            album,
            path,
            position,
        })),
        None => {
            log::info!("Last image {} is no longer listed, forgetting it", path);
            last.clear()?;
            Ok(None)
        }
    }
}
