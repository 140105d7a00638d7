//! Splitting Markdown documents into YAML frontmatter and body, and joining
//! them back together.

use crate::error::Result;
use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;

const FENCE: &str = "---";

/// Errors emitted while extracting frontmatter from a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Opening `---` without a closing one.
    #[error("unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Frontmatter fields read from a source article.
///
/// Every field is optional. Non-string scalars are kept in their string form
/// and a lone string where a list is expected becomes a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrontmatter {
    /// `title`
    pub title: Option<String>,
    /// `date`, usually an ISO-8601 timestamp
    pub date: Option<String>,
    /// `tags`
    pub tags: Option<Vec<String>>,
    /// `categories`
    pub categories: Option<Vec<String>>,
    /// `slug`
    pub slug: Option<String>,
}

impl RawFrontmatter {
    fn from_value(value: &Value) -> Self {
        Self {
            title: value.get("title").and_then(scalar_string),
            date: value.get("date").and_then(scalar_string),
            tags: value.get("tags").and_then(string_list),
            categories: value.get("categories").and_then(string_list),
            slug: value.get("slug").and_then(scalar_string),
        }
    }
}

/// A parsed article: frontmatter plus the untouched body text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Parsed metadata block (empty when the document has none)
    pub frontmatter: RawFrontmatter,
    /// Everything after the closing fence line, byte for byte
    pub body: String,
}

/// Parses a Markdown document with an optional leading `---` YAML block.
///
/// A UTF-8 BOM and blank lines may precede the opening fence. Documents
/// without a fence have empty frontmatter and the whole input as body.
///
/// # Errors
///
/// Returns an error if the block is never closed, is not valid YAML, or is
/// not a mapping.
pub fn parse_document(input: &str) -> std::result::Result<Document, FrontmatterError> {
    match find_yaml_block(input)? {
        Some((block, body_start)) => {
            let value = parse_yaml_block(block)?;
            Ok(Document {
                frontmatter: RawFrontmatter::from_value(&value),
                body: input[body_start..].to_string(),
            })
        }
        None => Ok(Document {
            frontmatter: RawFrontmatter::default(),
            body: input.to_string(),
        }),
    }
}

/// Renders `frontmatter` as a fenced YAML block followed by `body`.
///
/// Long values are never folded across lines. A trailing newline is added
/// to the body when it lacks one.
///
/// # Errors
///
/// Returns an error if the frontmatter cannot be serialized to YAML.
pub fn render_document<T: Serialize>(body: &str, frontmatter: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(frontmatter)?;

    let mut out = String::with_capacity(yaml.len() + body.len() + 2 * FENCE.len() + 3);
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }

    Ok(out)
}

fn parse_yaml_block(block: &str) -> std::result::Result<Value, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Value::Mapping(serde_yaml::Mapping::new()));
    }

    let value: Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match value {
        Value::Null => Ok(Value::Mapping(serde_yaml::Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Locates the YAML block; returns it with the byte offset where the body starts.
fn find_yaml_block(input: &str) -> std::result::Result<Option<(&str, usize)>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    let mut cursor = bom_len;

    while let Some((line, next)) = next_line(input, cursor) {
        if line.trim().is_empty() {
            cursor = next;
            continue;
        }

        if !is_fence(line) {
            return Ok(None);
        }

        let block_start = next;
        let mut scan = next;
        while let Some((block_line, after)) = next_line(input, scan) {
            if is_fence(block_line) {
                let block = input[block_start..scan].trim_end_matches(['\r', '\n']);
                return Ok(Some((block, after)));
            }
            scan = after;
        }
        return Err(FrontmatterError::Unterminated);
    }

    Ok(None)
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    match memchr::memchr(b'\n', &input.as_bytes()[start..]) {
        Some(pos) => Some((&input[start..start + pos], start + pos + 1)),
        None => Some((&input[start..], input.len())),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r').trim_end() == FENCE
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::Null => None,
        other => scalar_string(other).map(|s| vec![s]),
    }
}
