use std::collections::{BTreeMap, HashMap, HashSet};

use docrank_core::{Config, PageEntry, Section};

use crate::heading::{HeadingSource, resolve_heading_with_source};

/// Per-source tally of how headings were resolved, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingStats {
    pub counts: HashMap<HeadingSource, usize>,
}

impl HeadingStats {
    pub fn get(&self, source: HeadingSource) -> usize {
        self.counts.get(&source).copied().unwrap_or(0)
    }

    fn record(&mut self, source: HeadingSource) {
        *self.counts.entry(source).or_default() += 1;
    }
}

/// Merge outline-sourced and layout-sourced page entries into one section per page.
///
/// Outline entries come first in the order given, deduplicated by page
/// (first occurrence wins). Each uses the outline title as its first heading
/// candidate and the same page's layout span as the second. Layout pages not
/// covered by the outline follow in ascending page order.
pub fn assemble_sections(
    document: &str,
    outline: &[PageEntry],
    layout: &[PageEntry],
    config: &Config,
) -> Vec<Section> {
    assemble_sections_with_stats(document, outline, layout, config).0
}

pub fn assemble_sections_with_stats(
    document: &str,
    outline: &[PageEntry],
    layout: &[PageEntry],
    config: &Config,
) -> (Vec<Section>, HeadingStats) {
    // One layout entry per page; the first one seen is kept.
    let mut layout_by_page: BTreeMap<u32, &PageEntry> = BTreeMap::new();
    for entry in layout {
        layout_by_page.entry(entry.page).or_insert(entry);
    }

    let mut sections = Vec::with_capacity(layout_by_page.len().max(outline.len()));
    let mut stats = HeadingStats::default();
    let mut seen: HashSet<u32> = HashSet::new();

    for entry in outline {
        if !seen.insert(entry.page) {
            continue;
        }
        let layout_entry = layout_by_page.get(&entry.page).copied();
        // Outline entries may carry no text when the backend only knows the title.
        let body = if entry.text.trim().is_empty() {
            layout_entry.map_or(entry.text.as_str(), |l| l.text.as_str())
        } else {
            entry.text.as_str()
        };
        let (heading, source) = resolve_heading_with_source(
            Some(&entry.heading),
            layout_entry.map(|l| l.heading.as_str()),
            body,
            config,
        );
        stats.record(source);
        sections.push(Section {
            document: document.to_string(),
            page: entry.page,
            heading,
            body: body.to_string(),
        });
    }

    for (&page, entry) in &layout_by_page {
        if seen.contains(&page) {
            continue;
        }
        let (heading, source) =
            resolve_heading_with_source(None, Some(&entry.heading), &entry.text, config);
        stats.record(source);
        sections.push(Section {
            document: document.to_string(),
            page,
            heading,
            body: entry.text.clone(),
        });
    }

    tracing::debug!(
        document,
        outline_entries = outline.len(),
        layout_entries = layout.len(),
        sections = sections.len(),
        untitled = stats.get(HeadingSource::Untitled),
        "assembled sections"
    );

    (sections, stats)
}
