use std::time::Duration;

use thiserror::Error;

use crate::embedding::{EmbedError, Embedder, HashingEmbedder, HttpEmbedder};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("top_k must be at least 1")]
    ZeroTopK,
    #[error("num_sentences must be at least 1")]
    ZeroSentences,
    #[error("diversity threshold {0} is outside [-1, 1]")]
    DiversityThreshold(f32),
    #[error("keyword boost {0} must be a non-negative number")]
    KeywordBoost(f32),
    #[error("{0} must be at least 1")]
    ZeroBound(&'static str),
    #[error("unknown embedder backend: {0} (expected \"hashing\" or \"http\")")]
    UnknownEmbedder(String),
    #[error("the http embedder needs an endpoint URL and a model name")]
    IncompleteHttpEmbedder,
}

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedderKind {
    #[default]
    Hashing,
    Http,
}

impl std::str::FromStr for EmbedderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashing" | "hash" => Ok(Self::Hashing),
            "http" | "openai" => Ok(Self::Http),
            other => Err(ConfigError::UnknownEmbedder(other.to_string())),
        }
    }
}

/// Embedding backend settings.
#[derive(Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub kind: EmbedderKind,
    /// Base URL of an OpenAI-compatible API (`/embeddings` is appended).
    pub url: Option<String>,
    /// Model identifier sent to the endpoint.
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Vector size. The hashing embedder falls back to 384 when unset;
    /// the http embedder sends it only when set.
    pub dimensions: Option<usize>,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("dimensions", &self.dimensions)
            .field("batch_size", &self.batch_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::Hashing,
            url: None,
            model: None,
            api_key: None,
            dimensions: None,
            batch_size: 32,
            timeout_secs: 60,
        }
    }
}

const HASHING_DIMENSIONS: usize = 384;

impl EmbeddingConfig {
    /// Construct the configured embedder.
    pub fn build_embedder(&self) -> Result<Box<dyn Embedder>, EmbedError> {
        match self.kind {
            EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::new(
                self.dimensions.unwrap_or(HASHING_DIMENSIONS),
            ))),
            EmbedderKind::Http => Ok(Box::new(self.http_embedder()?)),
        }
    }

    fn http_embedder(&self) -> Result<HttpEmbedder, EmbedError> {
        HttpEmbedder::new(
            self.url.as_deref().unwrap_or_default(),
            self.model.as_deref().unwrap_or_default(),
            self.api_key.clone(),
            self.dimensions,
            self.batch_size,
            Duration::from_secs(self.timeout_secs),
        )
    }
}

/// Configuration for one analysis run.
///
/// Every tunable of the pipeline lives here and is passed explicitly into
/// each entry point. Use [`ConfigBuilder`] to construct a validated config.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // ── ranker ──
    /// Number of sections to keep (default: 6).
    pub top_k: usize,
    /// Per-keyword multiplier increment (default: 0.1). Unbounded above.
    pub keyword_boost: f32,
    /// Task tokens shorter than this are not keywords (default: 4).
    pub keyword_min_chars: usize,

    // ── summarizer ──
    /// Maximum sentences per summary (default: 3).
    pub num_sentences: usize,
    /// Sentences more similar than this to an accepted one are skipped (default: 0.8).
    pub diversity_threshold: f32,

    // ── heading resolver ──
    /// Longest line accepted by the text fallback (default: 120).
    pub max_heading_chars: usize,
    /// Minimum whitespace tokens for a valid heading candidate (default: 2).
    pub min_heading_words: usize,

    // ── ingest ──
    /// Skip documents that fail to extract instead of aborting the run.
    pub skip_unreadable: bool,

    pub embedding: EmbeddingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_k: 6,
            keyword_boost: 0.1,
            keyword_min_chars: 4,
            num_sentences: 3,
            diversity_threshold: 0.8,
            max_heading_chars: 120,
            min_heading_words: 2,
            skip_unreadable: false,
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Builder for [`Config`].
///
/// Unset fields take the defaults; [`build()`](Self::build) validates ranges.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    top_k: Option<usize>,
    keyword_boost: Option<f32>,
    keyword_min_chars: Option<usize>,
    num_sentences: Option<usize>,
    diversity_threshold: Option<f32>,
    max_heading_chars: Option<usize>,
    min_heading_words: Option<usize>,
    skip_unreadable: Option<bool>,
    embedder: Option<EmbedderKind>,
    embed_url: Option<String>,
    embed_model: Option<String>,
    embed_api_key: Option<String>,
    dimensions: Option<usize>,
    batch_size: Option<usize>,
    timeout_secs: Option<u64>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Ranker ──

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn keyword_boost(mut self, boost: f32) -> Self {
        self.keyword_boost = Some(boost);
        self
    }

    pub fn keyword_min_chars(mut self, n: usize) -> Self {
        self.keyword_min_chars = Some(n);
        self
    }

    // ── Summarizer ──

    pub fn num_sentences(mut self, n: usize) -> Self {
        self.num_sentences = Some(n);
        self
    }

    pub fn diversity_threshold(mut self, threshold: f32) -> Self {
        self.diversity_threshold = Some(threshold);
        self
    }

    // ── Headings ──

    pub fn max_heading_chars(mut self, n: usize) -> Self {
        self.max_heading_chars = Some(n);
        self
    }

    pub fn min_heading_words(mut self, n: usize) -> Self {
        self.min_heading_words = Some(n);
        self
    }

    // ── Ingest ──

    pub fn skip_unreadable(mut self, skip: bool) -> Self {
        self.skip_unreadable = Some(skip);
        self
    }

    // ── Embedding ──

    pub fn embedder(mut self, kind: EmbedderKind) -> Self {
        self.embedder = Some(kind);
        self
    }

    pub fn embed_url(mut self, url: impl Into<String>) -> Self {
        self.embed_url = Some(url.into());
        self
    }

    pub fn embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = Some(model.into());
        self
    }

    pub fn embed_api_key(mut self, key: impl Into<String>) -> Self {
        self.embed_api_key = Some(key.into());
        self
    }

    pub fn dimensions(mut self, n: usize) -> Self {
        self.dimensions = Some(n);
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = Some(n);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Validate all settings and produce a [`Config`].
    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let embed_defaults = EmbeddingConfig::default();

        let top_k = self.top_k.unwrap_or(defaults.top_k);
        if top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        let num_sentences = self.num_sentences.unwrap_or(defaults.num_sentences);
        if num_sentences == 0 {
            return Err(ConfigError::ZeroSentences);
        }
        let diversity_threshold = self
            .diversity_threshold
            .unwrap_or(defaults.diversity_threshold);
        if !(-1.0..=1.0).contains(&diversity_threshold) {
            return Err(ConfigError::DiversityThreshold(diversity_threshold));
        }
        let keyword_boost = self.keyword_boost.unwrap_or(defaults.keyword_boost);
        if !keyword_boost.is_finite() || keyword_boost < 0.0 {
            return Err(ConfigError::KeywordBoost(keyword_boost));
        }

        let bound = |value: Option<usize>, default: usize, name: &'static str| {
            let v = value.unwrap_or(default);
            if v == 0 { Err(ConfigError::ZeroBound(name)) } else { Ok(v) }
        };
        let keyword_min_chars = bound(
            self.keyword_min_chars,
            defaults.keyword_min_chars,
            "keyword_min_chars",
        )?;
        let max_heading_chars = bound(
            self.max_heading_chars,
            defaults.max_heading_chars,
            "max_heading_chars",
        )?;
        let min_heading_words = bound(
            self.min_heading_words,
            defaults.min_heading_words,
            "min_heading_words",
        )?;
        let dimensions = match self.dimensions {
            Some(0) => return Err(ConfigError::ZeroBound("dimensions")),
            other => other,
        };
        let batch_size = bound(self.batch_size, embed_defaults.batch_size, "batch_size")?;

        let kind = self.embedder.unwrap_or_default();
        if kind == EmbedderKind::Http && (self.embed_url.is_none() || self.embed_model.is_none())
        {
            return Err(ConfigError::IncompleteHttpEmbedder);
        }

        Ok(Config {
            top_k,
            keyword_boost,
            keyword_min_chars,
            num_sentences,
            diversity_threshold,
            max_heading_chars,
            min_heading_words,
            skip_unreadable: self.skip_unreadable.unwrap_or(defaults.skip_unreadable),
            embedding: EmbeddingConfig {
                kind,
                url: self.embed_url,
                model: self.embed_model,
                api_key: self.embed_api_key,
                dimensions,
                batch_size,
                timeout_secs: self.timeout_secs.unwrap_or(embed_defaults.timeout_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.top_k, 6);
        assert_eq!(config.num_sentences, 3);
        assert_eq!(config.max_heading_chars, 120);
        assert!((config.diversity_threshold - 0.8).abs() < f32::EPSILON);
        assert!((config.keyword_boost - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.embedding.kind, EmbedderKind::Hashing);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        assert_eq!(ConfigBuilder::new().build().unwrap(), Config::default());
    }

    #[test]
    fn test_builder_basic() {
        let config = ConfigBuilder::new()
            .top_k(3)
            .num_sentences(2)
            .diversity_threshold(0.9)
            .skip_unreadable(true)
            .build()
            .unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.num_sentences, 2);
        assert!(config.skip_unreadable);
    }

    #[test]
    fn test_builder_rejects_zero_top_k() {
        assert_eq!(
            ConfigBuilder::new().top_k(0).build(),
            Err(ConfigError::ZeroTopK)
        );
    }

    #[test]
    fn test_builder_rejects_out_of_range_threshold() {
        assert!(matches!(
            ConfigBuilder::new().diversity_threshold(1.5).build(),
            Err(ConfigError::DiversityThreshold(_))
        ));
    }

    #[test]
    fn test_builder_rejects_negative_boost() {
        assert!(matches!(
            ConfigBuilder::new().keyword_boost(-0.1).build(),
            Err(ConfigError::KeywordBoost(_))
        ));
    }

    #[test]
    fn test_http_embedder_requires_url_and_model() {
        let result = ConfigBuilder::new()
            .embedder(EmbedderKind::Http)
            .embed_url("http://localhost:8080")
            .build();
        assert_eq!(result, Err(ConfigError::IncompleteHttpEmbedder));
    }

    #[test]
    fn test_embedder_kind_parsing() {
        assert_eq!("HTTP".parse::<EmbedderKind>(), Ok(EmbedderKind::Http));
        assert_eq!("hashing".parse::<EmbedderKind>(), Ok(EmbedderKind::Hashing));
        assert!("bert".parse::<EmbedderKind>().is_err());
    }

    #[test]
    fn test_hashing_embedder_uses_dimensions() {
        let config = ConfigBuilder::new().dimensions(16).build().unwrap();
        let embedder = config.embedding.build_embedder().unwrap();
        let vectors = embedder.embed(&["hello world"]).unwrap();
        assert_eq!(vectors[0].len(), 16);
    }

    #[test]
    fn test_hashing_embedder_default_dimensions() {
        let embedder = Config::default().embedding.build_embedder().unwrap();
        assert_eq!(embedder.embed(&["hello"]).unwrap()[0].len(), 384);
    }

    #[test]
    fn test_http_embedder_receives_dimensions() {
        let http = |dimensions: Option<usize>| {
            let mut builder = ConfigBuilder::new()
                .embedder(EmbedderKind::Http)
                .embed_url("http://localhost:8080/v1")
                .embed_model("text-embedding-3-small");
            if let Some(n) = dimensions {
                builder = builder.dimensions(n);
            }
            builder.build().unwrap().embedding.http_embedder().unwrap()
        };
        assert_eq!(http(Some(256)).dimensions(), Some(256));
        assert_eq!(http(None).dimensions(), None);
    }

    #[test]
    fn test_builder_rejects_zero_dimensions() {
        assert_eq!(
            ConfigBuilder::new().dimensions(0).build(),
            Err(ConfigError::ZeroBound("dimensions"))
        );
    }
}
