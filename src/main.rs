mod app;
mod cli;
mod config;
mod database;
mod error;
mod logging;
mod services;

use app::Gallery;
use clap::Parser;
use cli::{Cli, Commands};
use config::GalleryConfig;
use error::AppError;
use media_index::{CancelToken, Photo, SearchScope};
use services::{
    resume_target, scan_service, Advance, FolderSequence, LastImageRecorder, SearchDebouncer,
    SearchListener, Slideshow, ViewerSession,
};
use std::sync::{Arc, Mutex};

fn main() {
    let cli = Cli::parse();

    let config = match GalleryConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(2);
        }
    };
    logging::init_logging(&config.log_level);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli.command, config)) {
        log::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

/// Prints search results as they arrive
struct PrintResults;

impl SearchListener for PrintResults {
    fn on_results(&self, query: &str, results: Vec<Photo>) {
        if results.is_empty() {
            println!("No matches for '{}'", query);
        }
        for photo in results {
            println!("{}", photo.path);
        }
    }
}

async fn run(command: Commands, config: GalleryConfig) -> Result<(), AppError> {
    let gallery = Gallery::open(config)?;
    let cancel = CancelToken::new();
    gallery.albums.migrate_if_needed(cancel.clone()).await?;

    match command {
        Commands::Scan { roots } => {
            let roots = if roots.is_empty() {
                gallery.config.scan_roots.clone()
            } else {
                roots
            };
            if roots.is_empty() {
                return Err(AppError::Config(
                    "no scan roots given or configured".to_string(),
                ));
            }
            let report = scan_service::scan(Arc::clone(&gallery.catalog), roots, cancel).await?;
            gallery.library.invalidate_cache();
            println!("Indexed {} file(s), removed {}", report.indexed, report.removed);
        }
        Commands::Albums => {
            for album in gallery.albums.album_folders(cancel).await? {
                println!(
                    "{}\t{}\t{} item(s)\t{}",
                    album.bucket_id, album.name, album.item_count, album.cover_path
                );
            }
        }
        Commands::Covers => {
            for (folder, cover) in gallery.albums.covers(cancel).await? {
                let cover = cover.first().map(|p| p.path.as_str()).unwrap_or_default();
                println!("{}\t{}", folder, cover);
            }
        }
        Commands::Folders => {
            for folder in gallery.library.list_all_folders().await? {
                println!("{}", folder);
            }
        }
        Commands::Open { album, page } => {
            let page = gallery.library.load_page(album, page).await?;
            for photo in &page.items {
                println!("{}\t{}", photo.position, photo.path);
            }
            println!(
                "page {} (prev: {}, next: {})",
                page.page,
                page.prev_key().map_or("-".to_string(), |p| p.to_string()),
                page.next_key().map_or("-".to_string(), |p| p.to_string()),
            );
        }
        Commands::Search { query, album } => {
            let scope = album.map_or(SearchScope::Global, SearchScope::Album);
            let debouncer = SearchDebouncer::new(
                Arc::clone(&gallery.library),
                Arc::new(PrintResults),
                gallery.config.search_debounce(),
            );
            debouncer.submit(query, scope, gallery.albums.visibility());
            debouncer.flush().await;
        }
        Commands::Select { folder } => {
            let added = gallery.albums.select_folder(&folder, cancel).await?;
            println!("Selected {} folder(s)", added);
        }
        Commands::Deselect { folder } => {
            gallery.albums.deselect_folder(&folder)?;
            println!("Deselected {}", folder);
        }
        Commands::ShowAll => {
            gallery.albums.show_all()?;
            println!("Showing all folders");
        }
        Commands::SelectBuckets { ids } => {
            let count = ids.len();
            gallery.albums.select_buckets(ids)?;
            println!("Selected {} bucket(s)", count);
        }
        Commands::Slideshow { album, position } => {
            let mut paths = gallery.albums.visible_album_paths(cancel).await?;
            if !paths.iter().any(|p| p == &album) {
                paths.push(album.clone());
            }
            let sequence = FolderSequence::build_async(paths).await?;
            let recorder = Arc::new(LastImageRecorder::new(gallery.last_image()));
            let session = ViewerSession::open(sequence, &album, position)?.with_listener(recorder);
            if let Some(photo) = session.current() {
                println!("{}", photo.path);
            }

            let session = Arc::new(Mutex::new(session));
            let mut slideshow = Slideshow::new(Arc::clone(&session), gallery.config.slideshow_interval());
            let mut steps = slideshow.start()?;
            while let Some(step) = steps.recv().await {
                match step {
                    Advance::Moved(_) => {}
                    Advance::NextFolder { name } => println!("-- {}", name),
                    Advance::End => break,
                }
                if let Some(photo) = session.lock().ok().and_then(|s| s.current().cloned()) {
                    println!("{}", photo.path);
                }
            }
            slideshow.stop();
        }
        Commands::Resume => {
            let last = gallery.last_image();
            let target = tokio::task::spawn_blocking(move || resume_target(&last))
                .await
                .map_err(|e| AppError::Other(format!("Task join error: {}", e)))??;
            match target {
                Some(target) => println!("{}\t{}\t{}", target.album, target.position, target.path),
                None => println!("No image to resume"),
            }
        }
    }

    Ok(())
}
