use crate::{
    config::Config,
    error::{Error, Result},
    filter::ArticleFilter,
};
use ignore::{WalkBuilder, WalkState};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::{debug, trace, warn};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScanStats {
    /// Regular files visited
    pub total_files: usize,

    /// Files accepted as articles
    pub articles: usize,

    /// Files rejected by the article filter
    pub skipped_files: usize,

    /// Walk errors encountered
    pub errors: usize,
}

/// Discovers article files under the input root.
pub(crate) struct Scanner {
    input_dir: PathBuf,
    output_dir: PathBuf,
    filter: ArticleFilter,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the article filter patterns are invalid.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            filter: ArticleFilter::new(&config.article_filter)?,
        })
    }

    /// Walks the input root and returns every article path, sorted.
    ///
    /// Hidden entries are skipped, and so is the output tree when it sits
    /// inside the input root.
    ///
    /// # Errors
    ///
    /// Returns an error if no article is found.
    pub(crate) fn scan(&self) -> Result<Vec<PathBuf>> {
        let files = Arc::new(Mutex::new(Vec::new()));
        let stats = Arc::new(Mutex::new(ScanStats::default()));

        debug!("Starting parallel scan of {}", self.input_dir.display());

        let output_dir = self.output_dir.clone();
        let walker = WalkBuilder::new(&self.input_dir)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .filter_entry(move |entry| entry.path() != output_dir)
            .threads(num_cpus::get())
            .build_parallel();

        walker.run(|| {
            let files = Arc::clone(&files);
            let stats = Arc::clone(&stats);
            let filter = self.filter.clone();
            Box::new(move |result| {
                match result {
                    Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                        let mut stats = lock(&stats);
                        stats.total_files += 1;

                        if filter.is_article(entry.path()) {
                            trace!("Found article: {}", entry.path().display());
                            stats.articles += 1;
                            lock(&files).push(entry.into_path());
                        } else {
                            stats.skipped_files += 1;
                        }
                    }
                    Err(e) => {
                        warn!("Walk error: {}", e);
                        lock(&stats).errors += 1;
                    }
                    _ => {}
                }
                WalkState::Continue
            })
        });

        let mut files = std::mem::take(&mut *lock(&files));
        let stats = lock(&stats).clone();

        debug!(
            "Scan complete: {} files, {} articles, {} skipped, {} errors",
            stats.total_files, stats.articles, stats.skipped_files, stats.errors
        );

        if files.is_empty() {
            return Err(Error::no_files(&self.input_dir));
        }

        // Walk order differs between runs; planning should not.
        files.sort();

        Ok(files)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
