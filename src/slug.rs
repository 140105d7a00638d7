//! Directory-name slugs and the fallback name used when a slug degenerates.

use rand::Rng;
use std::fmt::Debug;
use unicode_normalization::UnicodeNormalization;

/// Prefix of every fallback directory name.
pub const FALLBACK_PREFIX: &str = "untitled-";

const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Converts arbitrary text into a safe directory name.
///
/// The text is decomposed (NFKD) so accented letters lose their marks, then
/// everything except ASCII word characters, `-` and spaces is dropped.
/// Surrounding spaces are trimmed, inner runs of spaces become a single `-`,
/// and the result is lowercased.
///
/// Text made only of punctuation or non-Latin script yields an empty string.
///
/// # Examples
///
/// ```
/// use mdport::slugify;
///
/// assert_eq!(slugify("Café Déjà"), "cafe-deja");
/// assert_eq!(slugify("  My Post! "), "my-post");
/// assert_eq!(slugify("!!!"), "");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect();

    kept.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Source of the random part of a fallback directory name.
pub trait SuffixGenerator: Debug + Send + Sync {
    /// Returns a fresh suffix.
    fn suffix(&self) -> String;
}

/// Six random lowercase alphanumeric characters per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffix;

impl SuffixGenerator for RandomSuffix {
    fn suffix(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..SUFFIX_LEN)
            .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
            .collect()
    }
}

/// Always returns the same suffix. Useful for reproducible runs and tests.
#[derive(Debug, Clone)]
pub struct FixedSuffix(pub String);

impl SuffixGenerator for FixedSuffix {
    fn suffix(&self) -> String {
        self.0.clone()
    }
}

/// Builds `untitled-<suffix>` from the given generator.
#[must_use]
pub fn fallback_name(generator: &dyn SuffixGenerator) -> String {
    format!("{FALLBACK_PREFIX}{}", generator.suffix())
}
