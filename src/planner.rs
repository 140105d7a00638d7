use crate::{
    config::Config,
    error::{Error, Result},
    frontmatter::parse_document,
    manifest::write_manifest,
    resolver::OutputResolver,
    scanner::Scanner,
    task::Task,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// An article left out of the plan, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Source path
    pub path: PathBuf,

    /// Why it was skipped
    pub reason: String,
}

/// Result of planning: the tasks to run and the articles that could not be planned.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// One task per plannable article, sorted by source path
    pub tasks: Vec<Task>,

    /// Articles that failed to read or parse
    pub skipped: Vec<SkippedFile>,
}

/// Turns an input tree into a list of [`Task`]s.
pub struct Planner {
    input_dir: PathBuf,
    scanner: Scanner,
    resolver: OutputResolver,
}

impl Planner {
    /// Creates a planner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the article filter patterns are invalid.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            input_dir: config.input_dir.clone(),
            scanner: Scanner::new(config)?,
            resolver: OutputResolver::new(config),
        })
    }

    /// Discovers every article and resolves its output directory.
    ///
    /// Articles that cannot be read or whose frontmatter is malformed are
    /// logged and listed in [`Plan::skipped`]; planning carries on.
    ///
    /// # Errors
    ///
    /// Returns an error if the input tree holds no article at all.
    pub fn plan(&self) -> Result<Plan> {
        let files = self.scanner.scan()?;
        let mut plan = Plan::default();

        for path in files {
            match self.plan_file(&path) {
                Ok(task) => {
                    debug!(
                        "Planned {} -> {}",
                        self.display_relative(&path),
                        task.out_dir.display()
                    );
                    plan.tasks.push(task);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", self.display_relative(&path), e);
                    plan.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        warn_on_shared_out_dirs(&plan.tasks);

        info!(
            "Planned {} tasks ({} skipped)",
            plan.tasks.len(),
            plan.skipped.len()
        );
        Ok(plan)
    }

    /// Persists the planned tasks as a manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written.
    pub fn write_manifest(plan: &Plan, path: &Path) -> Result<()> {
        write_manifest(path, &plan.tasks)
    }

    fn plan_file(&self, path: &Path) -> Result<Task> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let document = parse_document(&content).map_err(|e| Error::frontmatter(path, e))?;
        let out_dir = self
            .resolver
            .resolve(document.frontmatter.slug.as_deref(), path);

        Ok(Task::new(path, out_dir))
    }

    fn display_relative(&self, path: &Path) -> String {
        pathdiff::diff_paths(path, &self.input_dir)
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

/// Tasks sharing an output directory overwrite each other's files.
fn warn_on_shared_out_dirs(tasks: &[Task]) {
    for (dir, sources) in shared_out_dirs(tasks) {
        warn!(
            "{} articles resolve to {}: {}",
            sources.len(),
            dir.display(),
            sources
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

/// Output directories claimed by more than one task, with their sources.
fn shared_out_dirs(tasks: &[Task]) -> Vec<(&Path, Vec<&Path>)> {
    let mut by_dir: HashMap<&Path, Vec<&Path>> = HashMap::new();
    for task in tasks {
        by_dir
            .entry(task.out_dir.as_path())
            .or_default()
            .push(task.file_path.as_path());
    }

    let mut shared: Vec<_> = by_dir
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .collect();
    shared.sort();
    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::read_manifest;
    use crate::slug::FixedSuffix;
    use crate::transform::TransformPolicy;
    use assert_fs::prelude::*;

    fn create_test_config(root: &Path, policy: TransformPolicy) -> Config {
        Config::builder()
            .input_dir(root.join("articles"))
            .output_dir(root.join("output"))
            .policy(policy)
            .suffix_generator(FixedSuffix("xyz789".to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_plan_uses_slug_or_folder() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/post1/index.md")
            .write_str("---\nslug: \"\"\n---\nhello")
            .unwrap();
        temp.child("articles/post2/index.md")
            .write_str("---\nslug: Custom Slug\n---\nworld")
            .unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Simple);
        let plan = Planner::new(&config).unwrap().plan().unwrap();

        assert!(plan.skipped.is_empty());
        assert_eq!(
            plan.tasks,
            vec![
                Task::new(
                    temp.path().join("articles/post1/index.md"),
                    temp.path().join("output/post1")
                ),
                Task::new(
                    temp.path().join("articles/post2/index.md"),
                    temp.path().join("output/custom-slug")
                ),
            ]
        );
    }

    #[test]
    fn test_plan_skips_section_index() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/_index.md").write_str("# landing").unwrap();
        temp.child("articles/post/index.md").write_str("# post").unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Simple);
        let plan = Planner::new(&config).unwrap().plan().unwrap();

        assert_eq!(plan.tasks.len(), 1);
        assert!(plan.tasks.iter().all(|t| t.file_name != "_index.md"));
    }

    #[test]
    fn test_plan_skips_malformed_documents() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/broken/index.md")
            .write_str("---\ntitle: [unterminated\n---\n")
            .unwrap();
        temp.child("articles/good/index.md").write_str("# fine").unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Simple);
        let plan = Planner::new(&config).unwrap().plan().unwrap();

        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].out_dir, temp.path().join("output/good"));
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(
            plan.skipped[0].path,
            temp.path().join("articles/broken/index.md")
        );
    }

    #[test]
    fn test_plan_legacy_ignores_index_slug() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/hello/index.md")
            .write_str("---\nslug: index\n---\n")
            .unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Legacy);
        let plan = Planner::new(&config).unwrap().plan().unwrap();

        assert_eq!(plan.tasks[0].out_dir, temp.path().join("output/hello"));
    }

    #[test]
    fn test_plan_reserved_folder_falls_back() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/Output/index.md").write_str("# x").unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Simple);
        let plan = Planner::new(&config).unwrap().plan().unwrap();

        assert_eq!(
            plan.tasks[0].out_dir,
            temp.path().join("output/untitled-xyz789")
        );
    }

    #[test]
    fn test_write_manifest() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/post/index.md").write_str("# post").unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Legacy);
        let plan = Planner::new(&config).unwrap().plan().unwrap();
        let manifest = temp.child("tasks.json");

        Planner::write_manifest(&plan, manifest.path()).unwrap();

        assert_eq!(read_manifest(manifest.path()).unwrap(), plan.tasks);
    }

    #[test]
    fn test_plan_empty_tree() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles").create_dir_all().unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Simple);
        let err = Planner::new(&config).unwrap().plan().unwrap_err();

        assert!(matches!(err, Error::NoFiles { .. }));
    }

    #[test]
    fn test_plan_keeps_tasks_sharing_an_out_dir() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("articles/2023/hello/index.md").write_str("# old").unwrap();
        temp.child("articles/2024/hello/index.md").write_str("# new").unwrap();
        temp.child("articles/2024/other/index.md").write_str("# other").unwrap();

        let config = create_test_config(temp.path(), TransformPolicy::Simple);
        let plan = Planner::new(&config).unwrap().plan().unwrap();

        assert_eq!(plan.tasks.len(), 3);
        let hello = temp.path().join("output/hello");
        assert_eq!(plan.tasks.iter().filter(|t| t.out_dir == hello).count(), 2);

        let first = temp.path().join("articles/2023/hello/index.md");
        let second = temp.path().join("articles/2024/hello/index.md");
        assert_eq!(
            shared_out_dirs(&plan.tasks),
            vec![(hello.as_path(), vec![first.as_path(), second.as_path()])]
        );
    }

    #[test]
    fn test_shared_out_dirs_empty_without_collisions() {
        let tasks = vec![
            Task::new("/in/a/index.md", "/out/a"),
            Task::new("/in/b/index.md", "/out/b"),
        ];
        assert!(shared_out_dirs(&tasks).is_empty());
    }
}
