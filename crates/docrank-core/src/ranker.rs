//! Relevance ranking: cosine similarity to the prompt, scaled by a keyword boost.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::embedding::{EmbedError, Embedder, embed_batch};
use crate::similarity::cosine_similarity;
use crate::{RankedSection, Section};

/// Output of [`rank_sections`].
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Embedding of the prompt; empty when there was nothing to rank.
    pub prompt_embedding: Vec<f32>,
    /// Selected sections, rank 1 first.
    pub sections: Vec<RankedSection>,
}

/// Distinct lower-cased word tokens of `task` with at least `min_chars` characters.
///
/// Length is the only stop-word filter.
pub fn extract_job_keywords(task: &str, min_chars: usize) -> BTreeSet<String> {
    static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
    let lowered = task.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= min_chars)
        .map(str::to_string)
        .collect()
}

/// Number of `keywords` occurring as substrings of the section's document id,
/// heading and body (lower-cased, space-joined).
pub fn count_keyword_hits(section: &Section, keywords: &BTreeSet<String>) -> usize {
    let haystack =
        format!("{} {} {}", section.document, section.heading, section.body).to_lowercase();
    keywords.iter().filter(|kw| haystack.contains(kw.as_str())).count()
}

/// Score and order `sections` given precomputed embeddings.
///
/// `section_embeddings[i]` belongs to `sections[i]`. Sorting is stable, so
/// equal scores keep their original order; at most `config.top_k` sections are
/// returned, ranked densely from 1.
pub fn rank_by_embeddings(
    sections: &[Section],
    prompt_embedding: &[f32],
    section_embeddings: &[Vec<f32>],
    keywords: &BTreeSet<String>,
    config: &Config,
) -> Vec<RankedSection> {
    let mut scored: Vec<(usize, f32, usize, f32)> = sections
        .iter()
        .zip(section_embeddings)
        .enumerate()
        .map(|(i, (section, embedding))| {
            let similarity = cosine_similarity(embedding, prompt_embedding);
            let hits = count_keyword_hits(section, keywords);
            let boost = 1.0 + config.keyword_boost * hits as f32;
            (i, similarity, hits, similarity * boost)
        })
        .collect();

    scored.sort_by(|a, b| b.3.partial_cmp(&a.3).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(config.top_k)
        .enumerate()
        .map(|(pos, (i, similarity, keyword_hits, score))| RankedSection {
            section: sections[i].clone(),
            rank: pos + 1,
            similarity,
            keyword_hits,
            score,
        })
        .collect()
}

/// Rank `sections` against `prompt`, keeping the top `config.top_k`.
///
/// The prompt and every section body are embedded in a single batch (only the
/// body is embedded; document id and heading feed the keyword boost). An empty
/// section list returns an empty ranking without calling the embedder.
pub fn rank_sections(
    sections: &[Section],
    prompt: &str,
    task: &str,
    embedder: &dyn Embedder,
    config: &Config,
) -> Result<Ranking, EmbedError> {
    if sections.is_empty() {
        return Ok(Ranking::default());
    }

    let keywords = extract_job_keywords(task, config.keyword_min_chars);
    tracing::debug!(keywords = ?keywords, "job keywords");

    let mut texts: Vec<&str> = Vec::with_capacity(sections.len() + 1);
    texts.push(prompt);
    texts.extend(sections.iter().map(|s| s.body.as_str()));

    let mut embeddings = embed_batch(embedder, &texts)?;
    let section_embeddings = embeddings.split_off(1);
    let prompt_embedding = embeddings.pop().unwrap_or_default();

    let ranked = rank_by_embeddings(
        sections,
        &prompt_embedding,
        &section_embeddings,
        &keywords,
        config,
    );
    tracing::debug!(
        candidates = sections.len(),
        selected = ranked.len(),
        "ranked sections"
    );

    Ok(Ranking {
        prompt_embedding,
        sections: ranked,
    })
}
