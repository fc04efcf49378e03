//! Extractive summarization: verbatim sentences, chosen for relevance and diversity.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::embedding::{EmbedError, Embedder, embed_batch};
use crate::similarity::cosine_similarity;

/// Returned for sections whose body is empty or whitespace-only.
pub const NO_CONTENT_PLACEHOLDER: &str = "No content to summarize.";

/// Split text into sentences at whitespace that directly follows `.`, `!` or `?`.
///
/// Fragments are trimmed and empty ones dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    static BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

    let mut sentences = Vec::new();
    let mut start = 0;
    for m in BOUNDARY_RE.find_iter(text) {
        // Terminal punctuation is one byte; keep it with the sentence.
        let end = m.start() + 1;
        let fragment = text[start..end].trim();
        if !fragment.is_empty() {
            sentences.push(fragment);
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Choose up to `num_sentences` sentence indices.
///
/// Candidates are visited in descending similarity to the prompt (ties by
/// position). A candidate is skipped when its cosine similarity to any
/// already accepted sentence exceeds `threshold`. If that leaves the quota
/// unfilled, the remaining slots are backfilled in the same order without the
/// diversity check. The result is sorted into textual order.
pub fn select_sentences(
    prompt_embedding: &[f32],
    sentence_embeddings: &[Vec<f32>],
    num_sentences: usize,
    threshold: f32,
) -> Vec<usize> {
    let sims: Vec<f32> = sentence_embeddings
        .iter()
        .map(|e| cosine_similarity(e, prompt_embedding))
        .collect();

    let mut order: Vec<usize> = (0..sims.len()).collect();
    order.sort_by(|&a, &b| sims[b].partial_cmp(&sims[a]).unwrap_or(Ordering::Equal));

    let mut selected: Vec<usize> = Vec::with_capacity(num_sentences);
    for &idx in &order {
        if selected.len() >= num_sentences {
            break;
        }
        let candidate = &sentence_embeddings[idx];
        let redundant = selected
            .iter()
            .any(|&s| cosine_similarity(&sentence_embeddings[s], candidate) > threshold);
        if !redundant {
            selected.push(idx);
        }
    }

    if selected.len() < num_sentences {
        for &idx in &order {
            if selected.len() >= num_sentences {
                break;
            }
            if !selected.contains(&idx) {
                selected.push(idx);
            }
        }
    }

    selected.sort_unstable();
    selected
}

/// Summarize `text` with the sentences most relevant to the prompt.
///
/// Empty or whitespace-only text returns [`NO_CONTENT_PLACEHOLDER`] without
/// calling the embedder. Otherwise all sentences are embedded in one batch
/// and the selection of [`select_sentences`] is joined with single spaces.
pub fn summarize_extractive(
    text: &str,
    prompt_embedding: &[f32],
    embedder: &dyn Embedder,
    config: &Config,
) -> Result<String, EmbedError> {
    if text.trim().is_empty() {
        return Ok(NO_CONTENT_PLACEHOLDER.to_string());
    }

    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Ok(String::new());
    }

    let embeddings = embed_batch(embedder, &sentences)?;
    if let Some(first) = embeddings.first()
        && first.len() != prompt_embedding.len()
    {
        return Err(EmbedError::DimensionMismatch {
            expected: prompt_embedding.len(),
            got: first.len(),
        });
    }

    let picked = select_sentences(
        prompt_embedding,
        &embeddings,
        config.num_sentences,
        config.diversity_threshold,
    );
    tracing::trace!(sentences = sentences.len(), picked = ?picked, "selected summary sentences");

    Ok(picked
        .into_iter()
        .map(|i| sentences[i])
        .collect::<Vec<_>>()
        .join(" "))
}
