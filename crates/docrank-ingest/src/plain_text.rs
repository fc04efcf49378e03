use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use docrank_core::{BackendError, DocumentBackend, PageEntry};

/// Backend for `.txt` and `.md` files.
///
/// Pages are separated by form feeds (`\x0c`); a file without form feeds is a
/// single page. Markdown ATX headings (`# Title`) become outline entries for
/// the page they appear on. Layout entries carry no heading candidate, so page
/// headings fall back to the text heuristic unless the outline supplies one.
#[derive(Debug, Default)]
pub struct PlainTextBackend;

impl PlainTextBackend {
    pub fn new() -> Self {
        Self
    }
}

fn read_pages(path: &Path) -> Result<Vec<String>, BackendError> {
    let content = std::fs::read_to_string(path)?;
    let mut pages: Vec<String> = content.split('\x0c').map(str::to_string).collect();
    // A trailing form feed does not start a new page.
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    Ok(pages)
}

/// ATX heading titles on one page, in order.
fn markdown_headings(page: &str) -> Vec<&str> {
    static ATX_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^ {0,3}#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());
    ATX_RE
        .captures_iter(page)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty())
        .collect()
}

impl DocumentBackend for PlainTextBackend {
    fn extract_outline(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError> {
        let pages = read_pages(path)?;
        let mut entries = Vec::new();
        for (index, text) in pages.iter().enumerate() {
            for title in markdown_headings(text) {
                entries.push(PageEntry::new(index as u32 + 1, title, text.as_str()));
            }
        }
        Ok(entries)
    }

    fn extract_layout(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError> {
        Ok(read_pages(path)?
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageEntry::new(index as u32 + 1, "", text))
            .collect())
    }
}
