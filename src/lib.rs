//! # mdport
//!
//! Restructures a tree of Markdown articles into one directory per article,
//! with normalized frontmatter and the article's sibling assets copied along.
//!
//! ## Features
//!
//! - Directory names from the frontmatter `slug` or the article's folder,
//!   with a random `untitled-*` fallback for names that slugify to nothing
//! - Two frontmatter policies (simple and legacy)
//! - Plan/execute workflow through a reviewable JSON task manifest
//! - Parallel execution with per-article error capture
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdport::{Config, Mode, Pipeline, TransformPolicy};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .input_dir("./articles")
//!     .output_dir("./output")
//!     .policy(TransformPolicy::Simple)
//!     .build()?;
//!
//! let stats = Pipeline::new(config)?.run(Mode::OneShot)?;
//! stats.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Scanner**: finds `*.md` files, never `_index.md`
//! 2. **Planner**: resolves each article's output directory into a [`Task`]
//! 3. **Manifest**: optionally persists the tasks between the two phases
//! 4. **Executor**: rewrites frontmatter and copies sibling assets

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod executor;
mod filter;
mod frontmatter;
mod manifest;
mod pipeline;
mod planner;
mod resolver;
mod scanner;
mod slug;
mod task;
mod transform;
mod writer;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{ExecutionReport, Executor, TaskOutcome};
pub use filter::{ArticleFilterConfig, SECTION_INDEX};
pub use frontmatter::{Document, FrontmatterError, RawFrontmatter, parse_document, render_document};
pub use manifest::{read_manifest, write_manifest};
pub use pipeline::{Mode, Pipeline, PipelineStats};
pub use planner::{Plan, Planner, SkippedFile};
pub use resolver::OutputResolver;
pub use slug::{FALLBACK_PREFIX, FixedSuffix, RandomSuffix, SuffixGenerator, fallback_name, slugify};
pub use task::Task;
pub use transform::{DESCRIPTION_PLACEHOLDER, NormalizedFrontmatter, TransformPolicy, transform};

/// Runs one driver of the conversion pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The input tree holds no article
/// - The manifest cannot be written or read
///
/// # Examples
///
/// ```no_run
/// use mdport::{Config, Mode, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder().base_dir(".").build()?;
///
/// run(config.clone(), Mode::Plan)?;
/// run(config, Mode::Execute)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config, mode: Mode) -> Result<PipelineStats> {
    Pipeline::new(config)?.run(mode)
}
