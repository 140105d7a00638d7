//! Glob rules deciding which discovered files are articles.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Base name of section landing pages, which are never converted.
pub const SECTION_INDEX: &str = "_index.md";

/// Glob patterns selecting article files.
///
/// Patterns are matched against file base names.
#[derive(Debug, Clone)]
pub struct ArticleFilterConfig {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Default for ArticleFilterConfig {
    fn default() -> Self {
        Self {
            include: vec!["*.md".to_string()],
            exclude: vec![SECTION_INDEX.to_string()],
        }
    }
}

impl ArticleFilterConfig {
    /// Replaces the include patterns.
    #[must_use]
    pub fn include(mut self, patterns: Vec<String>) -> Self {
        self.include = patterns;
        self
    }

    /// Adds an exclude pattern. `_index.md` stays excluded.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }
}

/// Compiled form of [`ArticleFilterConfig`].
#[derive(Debug, Clone)]
pub(crate) struct ArticleFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl ArticleFilter {
    /// Compiles the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub(crate) fn new(config: &ArticleFilterConfig) -> Result<Self> {
        Ok(Self {
            include: Self::build_globset(&config.include)?,
            exclude: Self::build_globset(&config.exclude)?,
        })
    }

    fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                Error::config(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }

        builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build glob set: {}", e)))
    }

    /// Returns true if `path` names an article to convert.
    pub(crate) fn is_article(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };

        if name == SECTION_INDEX {
            return false;
        }

        self.include.is_match(name) && !self.exclude.is_match(name)
    }
}
