use crate::{
    config::Config,
    error::{Error, Result},
    frontmatter::{parse_document, render_document},
    task::Task,
    transform::{TransformPolicy, transform},
    writer::{copy_sibling_assets, sibling_assets, write_file_atomic},
};
use rayon::prelude::*;
use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// What happened to a single task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Source document
    pub source: PathBuf,

    /// Converted document path
    pub output: PathBuf,

    /// Sibling assets copied (or that would be copied in dry-run mode)
    pub assets: Vec<PathBuf>,

    /// Failure message, `None` on success
    pub error: Option<String>,
}

impl TaskOutcome {
    /// Returns true if the task completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-task outcomes and totals for one execution.
///
/// In dry-run mode nothing is written: successful tasks count as
/// `previewed` and both `converted` and `assets_copied` stay at zero.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// One entry per task, in task order
    pub outcomes: Vec<TaskOutcome>,

    /// Documents written
    pub converted: usize,

    /// Documents that would have been written (dry run)
    pub previewed: usize,

    /// Sibling assets copied
    pub assets_copied: usize,

    /// Tasks that failed
    pub failed: usize,

    /// Wall time for the whole batch
    pub duration: Duration,
}

impl ExecutionReport {
    /// Outcomes of the tasks that failed.
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Runs tasks: rewrites each document and copies its sibling assets.
pub struct Executor {
    policy: TransformPolicy,
    jobs: Option<usize>,
    dry_run: bool,
}

impl Executor {
    /// Creates an executor from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            policy: config.policy,
            jobs: config.jobs,
            dry_run: config.dry_run,
        }
    }

    /// Executes every task in parallel, in no particular order.
    ///
    /// A failing task never stops the others; its error is recorded in the
    /// returned report.
    pub fn execute(&self, tasks: &[Task]) -> ExecutionReport {
        let start = Instant::now();
        let converted = AtomicUsize::new(0);
        let previewed = AtomicUsize::new(0);
        let assets_copied = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        let run_task = |task: &Task| -> TaskOutcome {
            match self.execute_task(task) {
                Ok(assets) => {
                    if self.dry_run {
                        previewed.fetch_add(1, Ordering::Relaxed);
                    } else {
                        converted.fetch_add(1, Ordering::Relaxed);
                        assets_copied.fetch_add(assets.len(), Ordering::Relaxed);
                    }
                    TaskOutcome {
                        source: task.file_path.clone(),
                        output: task.output_path(),
                        assets,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("Failed to convert {}: {}", task.file_path.display(), e);
                    failed.fetch_add(1, Ordering::Relaxed);
                    TaskOutcome {
                        source: task.file_path.clone(),
                        output: task.output_path(),
                        assets: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            }
        };

        let pool = self.jobs.and_then(|jobs| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| warn!("Falling back to the global thread pool: {}", e))
                .ok()
        });

        let outcomes: Vec<TaskOutcome> = match pool {
            Some(pool) => pool.install(|| tasks.par_iter().map(run_task).collect()),
            None => tasks.par_iter().map(run_task).collect(),
        };

        ExecutionReport {
            outcomes,
            converted: converted.into_inner(),
            previewed: previewed.into_inner(),
            assets_copied: assets_copied.into_inner(),
            failed: failed.into_inner(),
            duration: start.elapsed(),
        }
    }

    /// Converts one document and copies its assets, returning the asset paths.
    fn execute_task(&self, task: &Task) -> Result<Vec<PathBuf>> {
        let source = &task.file_path;
        let content = fs::read_to_string(source).map_err(|e| Error::io(source, e))?;
        let document = parse_document(&content).map_err(|e| Error::frontmatter(source, e))?;
        let frontmatter = transform(&document.frontmatter, self.policy);
        let rendered = render_document(&document.body, &frontmatter)?;
        let output = task.output_path();

        if self.dry_run {
            let assets = sibling_assets(&task.src_dir, &task.file_name)?;
            debug!(
                "Would convert {} -> {} ({} assets)",
                source.display(),
                output.display(),
                assets.len()
            );
            return Ok(assets);
        }

        fs::create_dir_all(&task.out_dir).map_err(|e| Error::io(&task.out_dir, e))?;
        write_file_atomic(&output, rendered.as_bytes())?;
        info!("Converted {} -> {}", source.display(), output.display());

        let assets = copy_sibling_assets(&task.src_dir, &task.out_dir, &task.file_name)?;
        for asset in &assets {
            info!("Copied asset {}", asset.display());
        }

        Ok(assets)
    }
}
