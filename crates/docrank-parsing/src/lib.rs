use std::path::Path;

use thiserror::Error;

pub mod heading;
pub mod section;

pub use heading::{HeadingSource, heading_from_text, is_valid_heading, resolve_heading};
pub use section::{HeadingStats, assemble_sections, assemble_sections_with_stats};
// Re-export domain types from core (canonical definitions live there)
pub use docrank_core::{BackendError, Config, DocumentBackend, PageEntry, Section};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Extract and assemble the sections of one document.
///
/// Pipeline:
/// 1. Read outline entries (bookmarks) via `backend`
/// 2. Read layout entries (largest-font span per page) via `backend`
/// 3. Resolve one heading per page and merge both lists by page number
///
/// `document` is the identifier stored on every section, normally the file
/// name as listed in the query.
pub fn load_sections(
    path: &Path,
    document: &str,
    backend: &dyn DocumentBackend,
    config: &Config,
) -> Result<Vec<Section>, ParsingError> {
    let outline = backend.extract_outline(path)?;
    let layout = backend.extract_layout(path)?;
    Ok(assemble_sections(document, &outline, &layout, config))
}
