pub mod analysis;
pub mod backend;
pub mod config;
pub mod config_file;
pub mod embedding;
pub mod layout;
pub mod query;
pub mod ranker;
pub mod report;
pub mod similarity;
pub mod summarizer;
pub mod text_utils;

// Re-export for convenience
pub use analysis::{Analysis, AnalysisError, Stage, analyze};
pub use backend::{BackendError, DocumentBackend};
pub use config::{Config, ConfigBuilder, ConfigError, EmbedderKind, EmbeddingConfig};
pub use embedding::{EmbedError, Embedder, HashingEmbedder, HttpEmbedder, MockEmbedder};
pub use layout::{FontSpan, select_heading_span};
pub use query::{Query, QueryError};
pub use ranker::{Ranking, extract_job_keywords, rank_sections};
pub use report::Report;
pub use summarizer::{NO_CONTENT_PLACEHOLDER, split_sentences, summarize_extractive};

/// Heading used when neither extraction strategy nor the page text yields one.
pub const UNTITLED_SECTION: &str = "Untitled Section";

/// One page-level record produced by an extraction strategy.
///
/// `heading` is the strategy's raw candidate and may be empty or invalid;
/// the heading resolver decides what the final section heading becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// 1-based page number.
    pub page: u32,
    pub heading: String,
    pub text: String,
}

impl PageEntry {
    pub fn new(page: u32, heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            page,
            heading: heading.into(),
            text: text.into(),
        }
    }
}

/// One page's worth of extracted text plus its resolved heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Document identifier (the file name listed in the query).
    pub document: String,
    /// 1-based page number.
    pub page: u32,
    /// Never empty.
    pub heading: String,
    pub body: String,
}

/// A section selected by the ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection {
    pub section: Section,
    /// 1-based, dense.
    pub rank: usize,
    /// Cosine similarity of the body embedding to the prompt embedding.
    pub similarity: f32,
    /// Number of job keywords found in document id, heading or body.
    pub keyword_hits: usize,
    /// `similarity * (1 + keyword_boost * keyword_hits)`.
    pub score: f32,
}

/// Progress events emitted while analyzing a document set.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Ranking {
        sections: usize,
    },
    Ranked {
        total: usize,
        selected: usize,
    },
    Summarizing {
        index: usize,
        total: usize,
        document: String,
        page: u32,
    },
    Summarized {
        index: usize,
        total: usize,
    },
}
