use crate::config::Config;
use crate::slug::{SuffixGenerator, fallback_name, slugify};
use crate::transform::TransformPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Slug every article is allowed to carry but which never names a directory
/// under the legacy policy.
const INDEX_SLUG: &str = "index";

/// Derives the destination directory of an article.
#[derive(Debug, Clone)]
pub struct OutputResolver {
    output_dir: PathBuf,
    reserved_name: String,
    policy: TransformPolicy,
    suffix_generator: Arc<dyn SuffixGenerator>,
}

impl OutputResolver {
    /// Creates a resolver from configuration.
    ///
    /// The reserved name is slugified so it compares against resolved names.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            reserved_name: slugify(&config.reserved_name),
            policy: config.policy,
            suffix_generator: Arc::clone(&config.suffix_generator),
        }
    }

    /// Resolves the output directory for `source_file`.
    ///
    /// The frontmatter `slug` wins when usable; otherwise the name of the
    /// file's parent directory is used. A name that slugifies to nothing, or
    /// to the reserved output-root name, is replaced by `untitled-<suffix>`.
    #[must_use]
    pub fn resolve(&self, slug: Option<&str>, source_file: &Path) -> PathBuf {
        self.output_dir.join(self.dir_name(slug, source_file))
    }

    /// Directory name (without the output root) for `source_file`.
    #[must_use]
    pub fn dir_name(&self, slug: Option<&str>, source_file: &Path) -> String {
        let candidate = match slug {
            Some(slug) if self.is_usable_slug(slug) => slug.to_string(),
            _ => parent_name(source_file),
        };

        let name = slugify(&candidate);
        if name.is_empty() || name.eq_ignore_ascii_case(&self.reserved_name) {
            let fallback = fallback_name(self.suffix_generator.as_ref());
            debug!(
                "No usable directory name for {} (candidate {:?}), using {}",
                source_file.display(),
                candidate,
                fallback
            );
            return fallback;
        }

        name
    }

    fn is_usable_slug(&self, slug: &str) -> bool {
        !slug.is_empty() && !(self.policy.rejects_index_slug() && slug == INDEX_SLUG)
    }
}

fn parent_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::FixedSuffix;

    fn resolver(output: &Path, policy: TransformPolicy) -> OutputResolver {
        OutputResolver {
            output_dir: output.to_path_buf(),
            reserved_name: "output".to_string(),
            policy,
            suffix_generator: Arc::new(FixedSuffix("a1b2c3".to_string())),
        }
    }

    fn is_fallback(name: &str) -> bool {
        name.strip_prefix("untitled-").is_some_and(|suffix| {
            suffix.len() == 6
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
    }

    #[test]
    fn test_slug_is_slugified() {
        let r = resolver(Path::new("/out"), TransformPolicy::Simple);
        let dir = r.resolve(Some("My Post!"), Path::new("/in/post1/index.md"));
        assert_eq!(dir, PathBuf::from("/out/my-post"));
    }

    #[test]
    fn test_missing_slug_uses_parent_folder() {
        let r = resolver(Path::new("/out"), TransformPolicy::Simple);
        assert_eq!(
            r.resolve(None, Path::new("/in/Hello World/index.md")),
            PathBuf::from("/out/hello-world")
        );
        assert_eq!(
            r.resolve(Some(""), Path::new("/in/post1/index.md")),
            PathBuf::from("/out/post1")
        );
    }

    #[test]
    fn test_reserved_parent_folder_falls_back() {
        let r = resolver(Path::new("/out"), TransformPolicy::Simple);
        let dir = r.resolve(Some(""), Path::new("/in/output/index.md"));
        assert_eq!(dir, PathBuf::from("/out/untitled-a1b2c3"));
    }

    #[test]
    fn test_reserved_slug_falls_back_ignoring_case() {
        let r = resolver(Path::new("/out"), TransformPolicy::Simple);
        let name = r.dir_name(Some("output"), Path::new("/in/post/index.md"));
        assert!(is_fallback(&name), "{name}");

        let name = r.dir_name(Some("OUTPUT"), Path::new("/in/post/index.md"));
        assert!(is_fallback(&name), "{name}");
    }

    #[test]
    fn test_unsluggable_name_falls_back() {
        let r = resolver(Path::new("/out"), TransformPolicy::Simple);
        let name = r.dir_name(Some("日本語"), Path::new("/in/記事/index.md"));
        assert_eq!(name, "untitled-a1b2c3");
    }

    #[test]
    fn test_random_fallback_shape() {
        let r = OutputResolver {
            suffix_generator: Arc::new(crate::slug::RandomSuffix),
            ..resolver(Path::new("/out"), TransformPolicy::Simple)
        };
        let name = r.dir_name(None, Path::new("index.md"));
        assert!(is_fallback(&name), "{name}");
    }

    #[test]
    fn test_index_slug_depends_on_policy() {
        let source = Path::new("/in/first-post/index.md");

        let simple = resolver(Path::new("/out"), TransformPolicy::Simple);
        assert_eq!(simple.dir_name(Some("index"), source), "index");

        let legacy = resolver(Path::new("/out"), TransformPolicy::Legacy);
        assert_eq!(legacy.dir_name(Some("index"), source), "first-post");
        assert_eq!(legacy.dir_name(Some("Index"), source), "index");
    }

    #[test]
    fn test_reserved_name_is_slugified() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .input_dir(temp.path())
            .output_dir(temp.path().join("out"))
            .reserved_name("My Ausgabe Ü")
            .suffix_generator(FixedSuffix("r3s3rv".to_string()))
            .build()
            .unwrap();
        let r = OutputResolver::new(&config);

        assert_eq!(
            r.dir_name(None, Path::new("/in/my ausgabe u/index.md")),
            "untitled-r3s3rv"
        );
        assert_eq!(r.dir_name(Some("MY-AUSGABE-Ü"), Path::new("/in/x/index.md")), "untitled-r3s3rv");
        assert_eq!(r.dir_name(Some("output"), Path::new("/in/x/index.md")), "output");
    }
}
