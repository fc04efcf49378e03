use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigBuilder, ConfigError, EmbedderKind};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    pub ranking: Option<RankingConfig>,
    pub summary: Option<SummaryConfig>,
    pub headings: Option<HeadingsConfig>,
    pub embedding: Option<EmbeddingFileConfig>,
    pub ingest: Option<IngestConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RankingConfig {
    pub top_k: Option<usize>,
    pub keyword_boost: Option<f32>,
    pub keyword_min_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryConfig {
    pub num_sentences: Option<usize>,
    pub diversity_threshold: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeadingsConfig {
    pub max_chars: Option<usize>,
    pub min_words: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingFileConfig {
    /// `"hashing"` or `"http"`.
    pub backend: Option<String>,
    pub url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub dimensions: Option<usize>,
    pub batch_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    pub skip_unreadable: Option<bool>,
}

/// Platform config directory path: `<config_dir>/docrank/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docrank").join("config.toml"))
}

/// Load config by cascading CWD `.docrank.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".docrank.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<T: Clone>(overlay: Option<&T>, base: Option<&T>) -> Option<T> {
    overlay.or(base).cloned()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (br, or) = (base.ranking.unwrap_or_default(), overlay.ranking.unwrap_or_default());
    let (bs, os) = (base.summary.unwrap_or_default(), overlay.summary.unwrap_or_default());
    let (bh, oh) = (base.headings.unwrap_or_default(), overlay.headings.unwrap_or_default());
    let (be, oe) = (
        base.embedding.unwrap_or_default(),
        overlay.embedding.unwrap_or_default(),
    );
    let (bi, oi) = (base.ingest.unwrap_or_default(), overlay.ingest.unwrap_or_default());

    ConfigFile {
        ranking: Some(RankingConfig {
            top_k: pick(or.top_k.as_ref(), br.top_k.as_ref()),
            keyword_boost: pick(or.keyword_boost.as_ref(), br.keyword_boost.as_ref()),
            keyword_min_chars: pick(or.keyword_min_chars.as_ref(), br.keyword_min_chars.as_ref()),
        }),
        summary: Some(SummaryConfig {
            num_sentences: pick(os.num_sentences.as_ref(), bs.num_sentences.as_ref()),
            diversity_threshold: pick(
                os.diversity_threshold.as_ref(),
                bs.diversity_threshold.as_ref(),
            ),
        }),
        headings: Some(HeadingsConfig {
            max_chars: pick(oh.max_chars.as_ref(), bh.max_chars.as_ref()),
            min_words: pick(oh.min_words.as_ref(), bh.min_words.as_ref()),
        }),
        embedding: Some(EmbeddingFileConfig {
            backend: pick(oe.backend.as_ref(), be.backend.as_ref()),
            url: pick(oe.url.as_ref(), be.url.as_ref()),
            model: pick(oe.model.as_ref(), be.model.as_ref()),
            api_key: pick(oe.api_key.as_ref(), be.api_key.as_ref()),
            dimensions: pick(oe.dimensions.as_ref(), be.dimensions.as_ref()),
            batch_size: pick(oe.batch_size.as_ref(), be.batch_size.as_ref()),
            timeout_secs: pick(oe.timeout_secs.as_ref(), be.timeout_secs.as_ref()),
        }),
        ingest: Some(IngestConfig {
            skip_unreadable: pick(oi.skip_unreadable.as_ref(), bi.skip_unreadable.as_ref()),
        }),
    }
}

impl ConfigFile {
    /// Seed a [`ConfigBuilder`] with every value present in this file.
    ///
    /// Callers layer CLI flags and environment values on top of the result.
    pub fn to_builder(&self) -> Result<ConfigBuilder, ConfigError> {
        let mut builder = ConfigBuilder::new();

        if let Some(ref r) = self.ranking {
            if let Some(k) = r.top_k {
                builder = builder.top_k(k);
            }
            if let Some(b) = r.keyword_boost {
                builder = builder.keyword_boost(b);
            }
            if let Some(n) = r.keyword_min_chars {
                builder = builder.keyword_min_chars(n);
            }
        }
        if let Some(ref s) = self.summary {
            if let Some(n) = s.num_sentences {
                builder = builder.num_sentences(n);
            }
            if let Some(t) = s.diversity_threshold {
                builder = builder.diversity_threshold(t);
            }
        }
        if let Some(ref h) = self.headings {
            if let Some(n) = h.max_chars {
                builder = builder.max_heading_chars(n);
            }
            if let Some(n) = h.min_words {
                builder = builder.min_heading_words(n);
            }
        }
        if let Some(ref e) = self.embedding {
            if let Some(ref backend) = e.backend {
                builder = builder.embedder(backend.parse::<EmbedderKind>()?);
            }
            if let Some(ref url) = e.url {
                builder = builder.embed_url(url.clone());
            }
            if let Some(ref model) = e.model {
                builder = builder.embed_model(model.clone());
            }
            if let Some(ref key) = e.api_key {
                builder = builder.embed_api_key(key.clone());
            }
            if let Some(n) = e.dimensions {
                builder = builder.dimensions(n);
            }
            if let Some(n) = e.batch_size {
                builder = builder.batch_size(n);
            }
            if let Some(secs) = e.timeout_secs {
                builder = builder.timeout_secs(secs);
            }
        }
        if let Some(ref i) = self.ingest
            && let Some(skip) = i.skip_unreadable
        {
            builder = builder.skip_unreadable(skip);
        }

        Ok(builder)
    }
}
