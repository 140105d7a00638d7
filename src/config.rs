use crate::error::{Error, Result};
use crate::filter::ArticleFilterConfig;
use crate::slug::{RandomSuffix, SuffixGenerator, slugify};
use crate::transform::TransformPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_INPUT_DIR: &str = "articles";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_MANIFEST: &str = "tasks.json";
const DEFAULT_RESERVED_NAME: &str = "output";

/// Configuration shared by the planner and the executor.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Directory tree holding the source articles
    pub input_dir: PathBuf,

    /// Root of the restructured output tree
    pub output_dir: PathBuf,

    /// Location of the task manifest between planning and execution
    pub manifest_path: PathBuf,

    /// Frontmatter normalization rules
    pub policy: TransformPolicy,

    /// Directory name that an article may never be written to
    pub reserved_name: String,

    /// Maximum worker threads for execution (`None` uses every core)
    pub jobs: Option<usize>,

    /// Dry run mode (no file writes)
    pub dry_run: bool,

    /// Which discovered files count as articles
    pub article_filter: ArticleFilterConfig,

    /// Source of random suffixes for fallback directory names
    pub suffix_generator: Arc<dyn SuffixGenerator>,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mdport::{Config, TransformPolicy};
    ///
    /// let config = Config::builder()
    ///     .input_dir("./articles")
    ///     .output_dir("./output")
    ///     .policy(TransformPolicy::Legacy)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Input directory doesn't exist or is not a directory
    /// - Output directory is the input directory
    /// - Reserved name slugifies to nothing
    /// - `jobs` is zero
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.exists() {
            return Err(Error::config(format!(
                "Input directory does not exist: {}",
                self.input_dir.display()
            )));
        }

        if !self.input_dir.is_dir() {
            return Err(Error::config(format!(
                "Input path is not a directory: {}",
                self.input_dir.display()
            )));
        }

        if self.output_dir == self.input_dir {
            return Err(Error::config(format!(
                "Output directory must differ from the input directory: {}",
                self.output_dir.display()
            )));
        }

        if slugify(&self.reserved_name).is_empty() {
            return Err(Error::config(format!(
                "reserved_name must contain ASCII letters or digits: {:?}",
                self.reserved_name
            )));
        }

        if self.jobs == Some(0) {
            return Err(Error::config("jobs must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            policy: TransformPolicy::default(),
            reserved_name: DEFAULT_RESERVED_NAME.to_string(),
            jobs: None,
            dry_run: false,
            article_filter: ArticleFilterConfig::default(),
            suffix_generator: Arc::new(RandomSuffix),
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base_dir: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    policy: Option<TransformPolicy>,
    reserved_name: Option<String>,
    jobs: Option<usize>,
    dry_run: bool,
    article_filter: Option<ArticleFilterConfig>,
    suffix_generator: Option<Arc<dyn SuffixGenerator>>,
}

impl ConfigBuilder {
    /// Sets the directory relative paths are resolved against.
    ///
    /// Without a base directory, relative paths are used as given.
    #[must_use]
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Sets the directory holding the source articles.
    #[must_use]
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }

    /// Sets the root of the output tree.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the task manifest location.
    #[must_use]
    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    /// Sets the frontmatter normalization policy.
    #[must_use]
    pub fn policy(mut self, policy: TransformPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the reserved output-root name.
    #[must_use]
    pub fn reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved_name = Some(name.into());
        self
    }

    /// Caps the number of worker threads used during execution.
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Sets the article file patterns.
    #[must_use]
    pub fn article_filter(mut self, config: ArticleFilterConfig) -> Self {
        self.article_filter = Some(config);
        self
    }

    /// Replaces the random suffix source for fallback directory names.
    #[must_use]
    pub fn suffix_generator(mut self, generator: impl SuffixGenerator + 'static) -> Self {
        self.suffix_generator = Some(Arc::new(generator));
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let base = self.base_dir.as_deref();
        let resolve = |path: Option<PathBuf>, default: &str| {
            resolve_against(base, path.unwrap_or_else(|| PathBuf::from(default)))
        };

        let config = Config {
            input_dir: resolve(self.input_dir, DEFAULT_INPUT_DIR),
            output_dir: resolve(self.output_dir, DEFAULT_OUTPUT_DIR),
            manifest_path: resolve(self.manifest_path, DEFAULT_MANIFEST),
            policy: self.policy.unwrap_or_default(),
            reserved_name: self
                .reserved_name
                .unwrap_or_else(|| DEFAULT_RESERVED_NAME.to_string()),
            jobs: self.jobs,
            dry_run: self.dry_run,
            article_filter: self.article_filter.unwrap_or_default(),
            suffix_generator: self
                .suffix_generator
                .unwrap_or_else(|| Arc::new(RandomSuffix)),
        };

        config.validate()?;
        Ok(config)
    }
}

fn resolve_against(base: Option<&Path>, path: PathBuf) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}
