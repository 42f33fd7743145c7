//! Room slug derivation and validation.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

pub fn is_valid(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LEN && SLUG_RE.is_match(slug)
}

/// Derives a URL-safe slug from a proposed room name.
///
/// Unicode-decomposes, strips combining marks, lowercases, collapses runs of
/// non-alphanumeric characters to single hyphens, trims edge hyphens and
/// truncates to [`MAX_SLUG_LEN`]. Returns `None` when nothing usable is left
/// (e.g. a name made entirely of punctuation).
pub fn normalize(name: &str) -> Option<String> {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    // Truncate on a hyphen-safe boundary.
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if is_valid(&slug) { Some(slug) } else { None }
}
