pub mod album_service;
pub mod scan_service;
pub mod search_service;
pub mod viewer_service;

pub use album_service::AlbumService;
pub use search_service::{SearchDebouncer, SearchListener};
pub use viewer_service::{
    resume_target, Advance, FolderSequence, LastImageRecorder, Slideshow, ViewerSession,
};
