use anyhow::Context;
use clap::Parser;
use mdport::{ArticleFilterConfig, Config, Mode, Pipeline, TransformPolicy};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "mdport",
    version,
    author,
    about = "Restructure Markdown articles into one directory per slug",
    long_about = "Restructure a tree of Markdown articles into one directory per article.\n\n\
    Each article is written to <output>/<slug>/ with normalized frontmatter, and the \
    non-Markdown files next to it are copied along. Files named _index.md are never \
    converted.\n\n\
    By default the tool only plans: it writes a task manifest you can review. \
    Re-run with --run to execute it, or use --one-shot to do both at once.\n\n\
    USAGE EXAMPLES:\n  \
      # Write tasks.json for review\n  \
      mdport --input ./articles --output ./output\n\n  \
      # Execute the reviewed manifest\n  \
      mdport --input ./articles --output ./output --run\n\n  \
      # Convert in a single pass\n  \
      mdport --one-shot"
)]
struct Cli {
    /// Directory holding the source articles
    #[arg(short, long, default_value = "articles", value_name = "PATH")]
    input: PathBuf,

    /// Root of the restructured output tree
    #[arg(short, long, default_value = "output", value_name = "PATH")]
    output: PathBuf,

    /// Base for relative paths (defaults to the directory of this executable)
    #[arg(long, value_name = "PATH", env = "MDPORT_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Execute the tasks stored in the manifest
    #[arg(long, conflicts_with = "one_shot")]
    run: bool,

    /// Plan and execute in a single pass, without a manifest
    #[arg(long)]
    one_shot: bool,

    /// Task manifest location
    #[arg(long, default_value = "tasks.json", value_name = "FILE")]
    manifest: PathBuf,

    /// Frontmatter policy (default: simple for --one-shot, legacy otherwise)
    #[arg(long, value_enum)]
    policy: Option<CliPolicy>,

    /// Directory name no article may be written to
    #[arg(long, default_value = "output", value_name = "NAME")]
    reserved_name: String,

    /// File name patterns that count as articles, replacing `*.md` (can be used multiple times)
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Additional file name patterns to leave out (can be used multiple times)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Maximum worker threads
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Dry run (don't write files)
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliPolicy {
    /// Placeholder description, tags as-is
    Simple,
    /// Empty description, tags merged with categories, legacy flag
    Legacy,
}

impl From<CliPolicy> for TransformPolicy {
    fn from(p: CliPolicy) -> Self {
        match p {
            CliPolicy::Simple => Self::Simple,
            CliPolicy::Legacy => Self::Legacy,
        }
    }
}

impl Cli {
    const fn mode(&self) -> Mode {
        if self.one_shot {
            Mode::OneShot
        } else if self.run {
            Mode::Execute
        } else {
            Mode::Plan
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mode = cli.mode();
    let policy = cli.policy.map_or_else(
        || match mode {
            Mode::OneShot => TransformPolicy::Simple,
            Mode::Plan | Mode::Execute => TransformPolicy::Legacy,
        },
        TransformPolicy::from,
    );

    let base_dir = match cli.base_dir {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("Failed to resolve base directory {}", dir.display()))?,
        None => executable_dir()?,
    };

    let mut article_filter = ArticleFilterConfig::default();
    if !cli.include.is_empty() {
        article_filter = article_filter.include(cli.include);
    }
    let article_filter = cli
        .exclude
        .into_iter()
        .fold(article_filter, |filter, pattern| filter.exclude(pattern));

    let mut builder = Config::builder()
        .base_dir(base_dir)
        .input_dir(cli.input)
        .output_dir(cli.output)
        .manifest_path(cli.manifest)
        .policy(policy)
        .reserved_name(cli.reserved_name)
        .article_filter(article_filter)
        .dry_run(cli.dry_run);

    if let Some(jobs) = cli.jobs {
        builder = builder.jobs(jobs);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run(mode)
        .context("Pipeline execution failed")?;

    stats.print_summary();

    if stats.failed > 0 {
        anyhow::bail!("{} of {} tasks failed", stats.failed, stats.tasks);
    }
    if stats.skipped > 0 {
        anyhow::bail!("{} articles could not be planned", stats.skipped);
    }

    Ok(())
}

/// Directory containing the running executable.
fn executable_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(PathBuf::from)
        .context("Executable path has no parent directory")
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("mdport=info"),
        1 => EnvFilter::new("mdport=debug"),
        _ => EnvFilter::new("mdport=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
