use crate::{
    config::Config,
    error::Result,
    executor::{ExecutionReport, Executor},
    manifest::read_manifest,
    planner::{Plan, Planner},
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// How a run is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Discover, transform and write in a single pass.
    OneShot,
    /// Discover and write the task manifest for review.
    Plan,
    /// Execute the tasks listed in an existing manifest.
    Execute,
}

/// Statistics collected during a run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Driver that produced these statistics
    pub mode: Mode,

    /// Tasks planned or loaded from the manifest
    pub tasks: usize,

    /// Articles skipped during planning
    pub skipped: usize,

    /// Documents converted
    pub converted: usize,

    /// Documents that would have been converted (dry run)
    pub previewed: usize,

    /// Sibling assets copied
    pub assets_copied: usize,

    /// Tasks that failed during execution
    pub failed: usize,

    /// Total execution time
    pub duration: Duration,

    /// Output directory path
    pub output_directory: String,

    /// Manifest path, for the plan and execute drivers
    pub manifest: Option<String>,

    /// Failure messages, one per skipped article or failed task
    pub errors: Vec<String>,

    /// Whether anything was written
    pub dry_run: bool,
}

impl PipelineStats {
    fn new(mode: Mode, config: &Config) -> Self {
        Self {
            mode,
            tasks: 0,
            skipped: 0,
            converted: 0,
            previewed: 0,
            assets_copied: 0,
            failed: 0,
            duration: Duration::ZERO,
            output_directory: config.output_dir.display().to_string(),
            manifest: match mode {
                Mode::OneShot => None,
                Mode::Plan | Mode::Execute => Some(config.manifest_path.display().to_string()),
            },
            errors: Vec::new(),
            dry_run: config.dry_run,
        }
    }

    fn record_plan(&mut self, plan: &Plan) {
        self.tasks = plan.tasks.len();
        self.skipped = plan.skipped.len();
        self.errors.extend(
            plan.skipped
                .iter()
                .map(|s| format!("{}: {}", s.path.display(), s.reason)),
        );
    }

    fn record_execution(&mut self, report: &ExecutionReport) {
        self.converted = report.converted;
        self.previewed = report.previewed;
        self.assets_copied = report.assets_copied;
        self.failed = report.failed;
        self.errors.extend(report.failures().map(|o| {
            format!(
                "{}: {}",
                o.source.display(),
                o.error.as_deref().unwrap_or_default()
            )
        }));
    }

    /// Returns true if no article was skipped and no task failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║                  Conversion Summary                   ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!("║ Mode:                 {:>8}                        ║", self.mode_label());
        println!("║ Tasks:                {:>8}                        ║", self.tasks);
        println!("║ Skipped articles:     {:>8}                        ║", self.skipped);
        println!("║ Converted:            {:>8}                        ║", self.converted);
        if self.dry_run {
            println!("║ Previewed:            {:>8}                        ║", self.previewed);
        }
        println!("║ Assets copied:        {:>8}                        ║", self.assets_copied);
        println!("║ Failed:               {:>8}                        ║", self.failed);
        println!("║                                                       ║");
        println!("║ Output Directory:                                     ║");
        println!("║   {}", self.output_directory);
        if let Some(manifest) = &self.manifest {
            println!("║ Manifest:                                             ║");
            println!("║   {}", manifest);
        }
        println!("║                                                       ║");
        println!(
            "║ Total time:           {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        if self.dry_run {
            println!("║ ⚠ No files were written (dry run mode)               ║");
        }
        println!("╚═══════════════════════════════════════════════════════╝");

        if !self.errors.is_empty() {
            println!("\nProblems:");
            for error in &self.errors {
                println!("  ✗ {error}");
            }
        }
        println!();
    }

    const fn mode_label(&self) -> &'static str {
        match self.mode {
            Mode::OneShot => "one-shot",
            Mode::Plan => "plan",
            Mode::Execute => "execute",
        }
    }
}

/// Orchestrates planning and execution.
///
/// The three drivers share one planner and one executor; they differ only in
/// whether the plan goes through the manifest on disk.
pub struct Pipeline {
    config: Config,
    planner: Planner,
    executor: Executor,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails or the article
    /// filter patterns are invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let planner = Planner::new(&config)?;
        let executor = Executor::new(&config);

        Ok(Self {
            config,
            planner,
            executor,
        })
    }

    /// Runs the driver selected by `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if planning finds nothing to do or the manifest
    /// cannot be written or read. Per-article failures are reported in the
    /// returned statistics instead.
    pub fn run(&self, mode: Mode) -> Result<PipelineStats> {
        match mode {
            Mode::OneShot => self.run_one_shot(),
            Mode::Plan => self.plan_to_manifest(),
            Mode::Execute => self.execute_manifest(),
        }
    }

    /// Plans and executes in one pass, without touching the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the input tree holds no article.
    #[instrument(skip(self), fields(input = %self.config.input_dir.display()))]
    pub fn run_one_shot(&self) -> Result<PipelineStats> {
        let start = Instant::now();
        let mut stats = PipelineStats::new(Mode::OneShot, &self.config);

        info!("Stage 1/2: Planning...");
        let plan = self.planner.plan()?;
        stats.record_plan(&plan);

        info!("Stage 2/2: Converting {} articles...", plan.tasks.len());
        let report = self.execute(&plan);
        stats.record_execution(&report);

        stats.duration = start.elapsed();
        self.log_completion(&stats);
        Ok(stats)
    }

    /// Plans and writes the task manifest so it can be reviewed before execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the input tree holds no article or the manifest
    /// cannot be written.
    #[instrument(skip(self), fields(input = %self.config.input_dir.display()))]
    pub fn plan_to_manifest(&self) -> Result<PipelineStats> {
        let start = Instant::now();
        let mut stats = PipelineStats::new(Mode::Plan, &self.config);

        let plan = self.planner.plan()?;
        stats.record_plan(&plan);

        if self.config.dry_run {
            warn!("Dry run mode enabled - not writing the manifest");
        } else {
            Planner::write_manifest(&plan, &self.config.manifest_path)?;
            info!(
                "Review {} and re-run with --run to execute it",
                self.config.manifest_path.display()
            );
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// Executes the tasks stored in the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    #[instrument(skip(self), fields(manifest = %self.config.manifest_path.display()))]
    pub fn execute_manifest(&self) -> Result<PipelineStats> {
        let start = Instant::now();
        let mut stats = PipelineStats::new(Mode::Execute, &self.config);

        let tasks = read_manifest(&self.config.manifest_path)?;
        stats.tasks = tasks.len();

        info!("Converting {} articles from the manifest...", tasks.len());
        let report = self.executor.execute(&tasks);
        stats.record_execution(&report);

        stats.duration = start.elapsed();
        self.log_completion(&stats);
        Ok(stats)
    }

    fn execute(&self, plan: &Plan) -> ExecutionReport {
        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
        }
        self.executor.execute(&plan.tasks)
    }

    fn log_completion(&self, stats: &PipelineStats) {
        if stats.is_clean() && stats.dry_run {
            info!(
                "✓ Previewed {} articles in {:.2}s, nothing written",
                stats.previewed,
                stats.duration.as_secs_f64()
            );
        } else if stats.is_clean() {
            info!(
                "✓ Converted {} articles and copied {} assets in {:.2}s",
                stats.converted,
                stats.assets_copied,
                stats.duration.as_secs_f64()
            );
        } else {
            warn!(
                "Finished with problems: {} converted, {} skipped, {} failed",
                stats.converted, stats.skipped, stats.failed
            );
        }
    }
}
