use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use docrank_core::{
    AnalysisError, Config, DocumentBackend, Embedder, ProgressEvent, Query, Report, Section,
    analyze,
};
use docrank_parsing::ParsingError;

pub mod plain_text;

// Re-export domain types for convenience
pub use docrank_core::PageEntry;
pub use plain_text::PlainTextBackend;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to extract {document}: {source}")]
    Extraction {
        document: String,
        #[source]
        source: ParsingError,
    },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of docrank-ingest)")]
    NoPdfSupport,
}

/// A document left out of the run under the skip-unreadable policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub document: String,
    pub reason: String,
}

/// Sections gathered from a document list, in document order.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub sections: Vec<Section>,
    pub skipped: Vec<SkippedDocument>,
}

/// Pick the extraction backend for a file by extension.
///
/// - `.txt`, `.md`, `.markdown` → plain text backend
/// - anything else → PDF backend (requires `pdf` feature / mupdf)
pub fn backend_for(path: &Path) -> Result<Box<dyn DocumentBackend>, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "txt" | "md" | "markdown" => Ok(Box::new(PlainTextBackend::new())),
        _ => pdf_backend(),
    }
}

#[cfg(feature = "pdf")]
fn pdf_backend() -> Result<Box<dyn DocumentBackend>, IngestError> {
    Ok(Box::new(docrank_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn pdf_backend() -> Result<Box<dyn DocumentBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}

/// Extract the sections of one file with the backend its extension selects.
pub fn load_document(
    path: &Path,
    document: &str,
    config: &Config,
) -> Result<Vec<Section>, IngestError> {
    let backend = backend_for(path)?;
    docrank_parsing::load_sections(path, document, backend.as_ref(), config).map_err(|source| {
        IngestError::Extraction {
            document: document.to_string(),
            source,
        }
    })
}

/// Extract sections for every document in `documents`, resolved against `input_dir`.
pub fn collect_sections(
    input_dir: &Path,
    documents: &[String],
    config: &Config,
) -> Result<Collection, IngestError> {
    collect_sections_with(input_dir, documents, config, |path, document| {
        load_document(path, document, config)
    })
}

/// Like [`collect_sections`], but every document goes through `backend`.
pub fn collect_sections_with_backend(
    input_dir: &Path,
    documents: &[String],
    backend: &dyn DocumentBackend,
    config: &Config,
) -> Result<Collection, IngestError> {
    collect_sections_with(input_dir, documents, config, |path, document| {
        docrank_parsing::load_sections(path, document, backend, config).map_err(|source| {
            IngestError::Extraction {
                document: document.to_string(),
                source,
            }
        })
    })
}

fn collect_sections_with(
    input_dir: &Path,
    documents: &[String],
    config: &Config,
    mut load: impl FnMut(&Path, &str) -> Result<Vec<Section>, IngestError>,
) -> Result<Collection, IngestError> {
    let mut collection = Collection::default();

    for document in documents {
        let path = input_dir.join(document);
        match load(&path, document) {
            Ok(sections) => {
                tracing::debug!(document = %document, sections = sections.len(), "document loaded");
                collection.sections.extend(sections);
            }
            Err(err @ IngestError::Extraction { .. }) if config.skip_unreadable => {
                tracing::warn!(document = %document, error = %err, "skipping unreadable document");
                collection.skipped.push(SkippedDocument {
                    document: document.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(collection)
}

/// Full run over a directory: extract the query's documents, rank, summarize,
/// and assemble the report.
pub fn process_query(
    input_dir: &Path,
    query: &Query,
    embedder: &dyn Embedder,
    config: &Config,
    timestamp: DateTime<Utc>,
    progress: impl Fn(ProgressEvent),
) -> Result<(Report, Collection), IngestError> {
    let collection = collect_sections(input_dir, &query.document_names(), config)?;
    let analysis = analyze(&collection.sections, query, embedder, config, progress)?;
    tracing::info!(
        documents = query.documents.len(),
        skipped = collection.skipped.len(),
        sections = collection.sections.len(),
        selected = analysis.ranked.len(),
        "analysis complete"
    );
    Ok((analysis.into_report(query, timestamp), collection))
}
