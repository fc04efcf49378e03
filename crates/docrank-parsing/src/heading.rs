use once_cell::sync::Lazy;
use regex::Regex;

use docrank_core::text_utils::truncate_chars;
use docrank_core::{Config, UNTITLED_SECTION};

/// Where a resolved heading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingSource {
    Outline,
    Layout,
    /// A line of the page text with at least two Title-Case words.
    TitleCaseLine,
    /// The first line of the page text starting with a letter.
    FirstLine,
    Untitled,
}

/// A candidate is valid when, after trimming, it starts with an alphabetic
/// character and has at least `min_words` whitespace-separated tokens.
pub fn is_valid_heading(candidate: &str, min_words: usize) -> bool {
    let trimmed = candidate.trim();
    trimmed.chars().next().is_some_and(char::is_alphabetic)
        && trimmed.split_whitespace().count() >= min_words
}

/// Derive a heading from raw page text, using default limits.
pub fn heading_from_text(text: &str) -> String {
    heading_from_text_with_config(text, &Config::default()).0
}

/// Config-aware version of [`heading_from_text`] that also reports which
/// pass produced the heading.
pub(crate) fn heading_from_text_with_config(
    text: &str,
    config: &Config,
) -> (String, HeadingSource) {
    static TITLE_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\b").unwrap());

    let starts_alpha = |line: &str| line.chars().next().is_some_and(char::is_alphabetic);

    for line in text.lines().map(str::trim) {
        if line.is_empty()
            || line.chars().count() > config.max_heading_chars
            || !starts_alpha(line)
        {
            continue;
        }
        if TITLE_WORD_RE.find_iter(line).take(2).count() >= 2 {
            return (line.to_string(), HeadingSource::TitleCaseLine);
        }
    }

    if let Some(line) = text.lines().map(str::trim).find(|l| starts_alpha(l)) {
        return (
            truncate_chars(line, config.max_heading_chars).to_string(),
            HeadingSource::FirstLine,
        );
    }

    (UNTITLED_SECTION.to_string(), HeadingSource::Untitled)
}

/// Pick exactly one non-empty heading for a page.
///
/// Priority: a valid outline title, then a valid layout span, then the text
/// fallback of [`heading_from_text`].
pub fn resolve_heading(
    outline: Option<&str>,
    layout: Option<&str>,
    text: &str,
    config: &Config,
) -> String {
    resolve_heading_with_source(outline, layout, text, config).0
}

pub(crate) fn resolve_heading_with_source(
    outline: Option<&str>,
    layout: Option<&str>,
    text: &str,
    config: &Config,
) -> (String, HeadingSource) {
    if let Some(title) = outline.filter(|t| is_valid_heading(t, config.min_heading_words)) {
        return (title.trim().to_string(), HeadingSource::Outline);
    }
    if let Some(span) = layout.filter(|t| is_valid_heading(t, config.min_heading_words)) {
        return (span.trim().to_string(), HeadingSource::Layout);
    }
    heading_from_text_with_config(text, config)
}
