//! Frontmatter normalization.

use crate::frontmatter::RawFrontmatter;
use serde::Serialize;
use std::collections::HashSet;

/// Description written by the simple policy, prompting the author for a summary.
pub const DESCRIPTION_PLACEHOLDER: &str = "Write a short summary of this article here.";

/// Which normalization rules apply to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformPolicy {
    /// Placeholder description, tags passed through, no `legacy` flag.
    #[default]
    Simple,
    /// Empty description, tags merged with categories, `legacy: true`.
    Legacy,
}

impl TransformPolicy {
    /// Returns true if `index` is rejected as a slug under this policy.
    #[must_use]
    pub const fn rejects_index_slug(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// Frontmatter as written to the output tree.
///
/// Field order here is the key order of the emitted YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedFrontmatter {
    /// Article title, empty when absent
    pub title: String,

    /// `YYYY-MM-DD` part of the source date, empty when absent
    #[serde(rename = "publishDate")]
    pub publish_date: String,

    /// Summary placeholder or empty, depending on policy
    pub description: String,

    /// Tags (merged with categories under the legacy policy)
    pub tags: Vec<String>,

    /// Always `Some(true)` under the legacy policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy: Option<bool>,
}

/// Maps source frontmatter onto the output schema.
///
/// The source is never modified; every missing field gets a default.
#[must_use]
pub fn transform(raw: &RawFrontmatter, policy: TransformPolicy) -> NormalizedFrontmatter {
    let title = raw.title.clone().unwrap_or_default();
    let publish_date = raw.date.as_deref().map(date_part).unwrap_or_default();
    let raw_tags = raw.tags.as_deref().unwrap_or_default();

    match policy {
        TransformPolicy::Simple => NormalizedFrontmatter {
            title,
            publish_date,
            description: DESCRIPTION_PLACEHOLDER.to_string(),
            tags: raw_tags.to_vec(),
            legacy: None,
        },
        TransformPolicy::Legacy => {
            let categories = raw.categories.as_deref().unwrap_or_default();
            NormalizedFrontmatter {
                title,
                publish_date,
                description: String::new(),
                tags: merge_unique(raw_tags, categories),
                legacy: Some(true),
            }
        }
    }
}

/// Everything before the first `T` of an ISO-8601 timestamp.
fn date_part(date: &str) -> String {
    date.split('T').next().unwrap_or_default().to_string()
}

/// Union of both lists, keeping the first occurrence of each value.
fn merge_unique(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_simple_policy() {
        let raw = RawFrontmatter {
            title: Some("Hi".to_string()),
            date: Some("2024-01-02T10:00:00Z".to_string()),
            tags: Some(strings(&["a", "b"])),
            ..Default::default()
        };

        let out = transform(&raw, TransformPolicy::Simple);

        assert_eq!(
            out,
            NormalizedFrontmatter {
                title: "Hi".to_string(),
                publish_date: "2024-01-02".to_string(),
                description: DESCRIPTION_PLACEHOLDER.to_string(),
                tags: strings(&["a", "b"]),
                legacy: None,
            }
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let out = transform(&RawFrontmatter::default(), TransformPolicy::Simple);

        assert_eq!(out.title, "");
        assert_eq!(out.publish_date, "");
        assert!(out.tags.is_empty());
    }

    #[test]
    fn test_date_without_time_part() {
        let raw = RawFrontmatter {
            date: Some("2023-12-31".to_string()),
            ..Default::default()
        };

        assert_eq!(transform(&raw, TransformPolicy::Simple).publish_date, "2023-12-31");
    }

    #[test]
    fn test_legacy_policy_merges_categories() {
        let raw = RawFrontmatter {
            tags: Some(strings(&["a", "b"])),
            categories: Some(strings(&["b", "c"])),
            ..Default::default()
        };

        let out = transform(&raw, TransformPolicy::Legacy);

        let tags: HashSet<_> = out.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, HashSet::from(["a", "b", "c"]));
        assert_eq!(out.tags.len(), 3);
        assert_eq!(out.description, "");
        assert_eq!(out.legacy, Some(true));
    }

    #[test]
    fn test_legacy_policy_keeps_last_category() {
        let raw = RawFrontmatter {
            categories: Some(strings(&["x", "y", "z"])),
            ..Default::default()
        };

        let out = transform(&raw, TransformPolicy::Legacy);

        assert_eq!(out.tags, strings(&["x", "y", "z"]));
        assert_eq!(raw.categories, Some(strings(&["x", "y", "z"])));
    }

    #[test]
    fn test_legacy_policy_dedups_within_a_list() {
        let raw = RawFrontmatter {
            tags: Some(strings(&["rust", "rust", "cli"])),
            ..Default::default()
        };

        assert_eq!(
            transform(&raw, TransformPolicy::Legacy).tags,
            strings(&["rust", "cli"])
        );
    }

    #[test]
    fn test_serialized_key_order() {
        let out = NormalizedFrontmatter {
            title: "Hi".to_string(),
            publish_date: "2024-01-02".to_string(),
            description: String::new(),
            tags: vec![],
            legacy: Some(true),
        };

        let yaml = serde_yaml::to_string(&out).unwrap();
        let keys: Vec<_> = yaml
            .lines()
            .filter_map(|line| line.split_once(':').map(|(key, _)| key))
            .collect();

        assert_eq!(keys, ["title", "publishDate", "description", "tags", "legacy"]);
        assert!(yaml.contains("legacy: true"));
    }

    #[test]
    fn test_simple_policy_omits_legacy_key() {
        let out = transform(&RawFrontmatter::default(), TransformPolicy::Simple);
        let yaml = serde_yaml::to_string(&out).unwrap();
        assert!(!yaml.contains("legacy"));
    }

    #[test]
    fn test_index_slug_rejection() {
        assert!(TransformPolicy::Legacy.rejects_index_slug());
        assert!(!TransformPolicy::Simple.rejects_index_slug());
    }
}
