use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use mupdf::{Document, Outline, TextPageFlags};

use docrank_core::text_utils::expand_ligatures;
use docrank_core::{BackendError, DocumentBackend, FontSpan, PageEntry, select_heading_span};

/// MuPDF-based implementation of [`DocumentBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// Outline entries come from the document's bookmarks, flattened depth-first.
/// Layout entries carry the largest-font span of each page (topmost on ties).
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Text and font spans of one page.
struct PageContent {
    text: String,
    spans: Vec<FontSpan>,
}

fn open(path: &Path) -> Result<Document, BackendError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
    Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))
}

/// Read every page, or only those in `wanted` (1-based) when given.
fn read_pages(
    document: &Document,
    wanted: Option<&BTreeSet<u32>>,
) -> Result<BTreeMap<u32, PageContent>, BackendError> {
    let mut pages = BTreeMap::new();

    for (index, page_result) in document
        .pages()
        .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        .enumerate()
    {
        let page_number = index as u32 + 1;
        if wanted.is_some_and(|w| !w.contains(&page_number)) {
            continue;
        }
        let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut text = String::new();
        let mut spans = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let chars: Vec<(char, f32)> = line
                    .chars()
                    .map(|c| (c.char().unwrap_or('\u{FFFD}'), c.size()))
                    .collect();
                text.extend(chars.iter().map(|(ch, _)| *ch));
                text.push('\n');
                spans.extend(group_spans(&chars, line.bounds().y0));
            }
        }

        pages.insert(
            page_number,
            PageContent {
                text: expand_ligatures(&text),
                spans,
            },
        );
    }

    Ok(pages)
}

/// Split one line into runs of equal font size.
fn group_spans(chars: &[(char, f32)], y0: f32) -> Vec<FontSpan> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut current_size: Option<f32> = None;

    for &(ch, size) in chars {
        if let Some(s) = current_size
            && (s - size).abs() > f32::EPSILON
        {
            spans.push(FontSpan::new(std::mem::take(&mut current).trim(), s, y0));
        }
        current_size = Some(size);
        current.push(ch);
    }
    if let Some(s) = current_size {
        spans.push(FontSpan::new(current.trim(), s, y0));
    }
    spans.retain(|s| !s.text.is_empty());
    spans
}

/// Page number (1-based) from an internal link URI such as `#page=3` or `#3`.
fn page_from_uri(uri: &str) -> Option<u32> {
    let fragment = uri.strip_prefix('#')?;
    let value = fragment
        .split('&')
        .find_map(|part| part.strip_prefix("page="))
        .unwrap_or(fragment);
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<u32>().ok().filter(|&p| p >= 1)
}

/// Page number (1-based) of a bookmark.
///
/// `dest_page` is the 0-based page MuPDF resolved for the bookmark, which
/// also covers named destinations; the URI is consulted only without it.
fn outline_page(dest_page: Option<u32>, uri: Option<&str>) -> Option<u32> {
    dest_page
        .map(|p| p + 1)
        .or_else(|| uri.and_then(page_from_uri))
}

fn flatten_outline(items: &[Outline], out: &mut Vec<(u32, String)>) {
    for item in items {
        let dest_page = item.dest.as_ref().map(|d| d.loc.page_number);
        match outline_page(dest_page, item.uri.as_deref()) {
            Some(page) => out.push((page, item.title.trim().to_string())),
            None => tracing::debug!(
                title = %item.title,
                uri = ?item.uri,
                "skipping outline entry without page link"
            ),
        }
        flatten_outline(&item.down, out);
    }
}

impl DocumentBackend for MupdfBackend {
    fn extract_outline(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError> {
        let document = open(path)?;
        let outlines = document
            .outlines()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut links = Vec::new();
        flatten_outline(&outlines, &mut links);
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: BTreeSet<u32> = links.iter().map(|(p, _)| *p).collect();
        let pages = read_pages(&document, Some(&wanted))?;

        let entries: Vec<PageEntry> = links
            .into_iter()
            .filter_map(|(page, title)| {
                // Bookmarks pointing past the last page are dropped.
                let content = pages.get(&page)?;
                Some(PageEntry::new(page, title, content.text.clone()))
            })
            .collect();
        tracing::debug!(path = %path.display(), entries = entries.len(), "outline extracted");
        Ok(entries)
    }

    fn extract_layout(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError> {
        let document = open(path)?;
        let pages = read_pages(&document, None)?;

        let entries: Vec<PageEntry> = pages
            .into_iter()
            .map(|(page, content)| {
                let heading = select_heading_span(&content.spans)
                    .map(|s| s.text.clone())
                    .unwrap_or_default();
                PageEntry::new(page, heading, content.text)
            })
            .collect();
        tracing::debug!(path = %path.display(), pages = entries.len(), "layout extracted");
        Ok(entries)
    }
}
