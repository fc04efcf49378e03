//! Rank-then-summarize over an already assembled section list.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::Config;
use crate::embedding::{EmbedError, Embedder};
use crate::query::Query;
use crate::ranker::rank_sections;
use crate::report::Report;
use crate::summarizer::summarize_extractive;
use crate::{ProgressEvent, RankedSection, Section};

/// Pipeline stage an embedding failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ranking,
    Summarization,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Ranking => write!(f, "ranking"),
            Stage::Summarization => write!(f, "summarization"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("embedding failed during {stage}: {source}")]
    Embedding {
        stage: Stage,
        #[source]
        source: EmbedError,
    },
}

/// Ranked sections and one summary per section, in rank order.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub ranked: Vec<RankedSection>,
    pub summaries: Vec<String>,
}

impl Analysis {
    pub fn into_report(self, query: &Query, timestamp: DateTime<Utc>) -> Report {
        Report::new(query, &self.ranked, &self.summaries, timestamp)
    }
}

/// Rank `sections` for `query` and summarize each selected section.
///
/// An empty section list is not an error: the result is empty and a warning
/// is logged. Any embedder failure aborts the whole analysis.
pub fn analyze(
    sections: &[Section],
    query: &Query,
    embedder: &dyn Embedder,
    config: &Config,
    progress: impl Fn(ProgressEvent),
) -> Result<Analysis, AnalysisError> {
    if sections.is_empty() {
        tracing::warn!("no sections extracted; producing an empty report");
        return Ok(Analysis::default());
    }

    let prompt = query.prompt();
    progress(ProgressEvent::Ranking {
        sections: sections.len(),
    });
    let ranking = rank_sections(sections, &prompt, query.task(), embedder, config).map_err(
        |source| AnalysisError::Embedding {
            stage: Stage::Ranking,
            source,
        },
    )?;
    progress(ProgressEvent::Ranked {
        total: sections.len(),
        selected: ranking.sections.len(),
    });

    let total = ranking.sections.len();
    let mut summaries = Vec::with_capacity(total);
    for (index, ranked) in ranking.sections.iter().enumerate() {
        progress(ProgressEvent::Summarizing {
            index,
            total,
            document: ranked.section.document.clone(),
            page: ranked.section.page,
        });
        let summary = summarize_extractive(
            &ranked.section.body,
            &ranking.prompt_embedding,
            embedder,
            config,
        )
        .map_err(|source| AnalysisError::Embedding {
            stage: Stage::Summarization,
            source,
        })?;
        tracing::debug!(
            rank = ranked.rank,
            document = %ranked.section.document,
            page = ranked.section.page,
            score = ranked.score,
            "summarized section"
        );
        summaries.push(summary);
        progress(ProgressEvent::Summarized { index, total });
    }

    Ok(Analysis {
        ranked: ranking.sections,
        summaries,
    })
}
