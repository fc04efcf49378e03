use std::path::Path;

use thiserror::Error;

use crate::PageEntry;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document extraction backends.
///
/// Implementors provide the two independent page-level extraction strategies;
/// heading resolution and section assembly live in `docrank_parsing`.
pub trait DocumentBackend: Send + Sync {
    /// Entries sourced from the document's embedded navigation (bookmarks).
    ///
    /// Entries are returned in outline order and may repeat a page. A document
    /// without an outline yields an empty list, not an error.
    fn extract_outline(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError>;

    /// Entries sourced from per-page layout analysis, exactly one per page in
    /// page order. `heading` carries the largest-font span near the top of the
    /// page, or an empty string when the page has no text spans.
    fn extract_layout(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError>;
}
