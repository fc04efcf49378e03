use once_cell::sync::Lazy;
use regex::Regex;

use super::{EmbedError, Embedder};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Seed for the second hash that decides a feature's sign.
const SIGN_SEED: u32 = 0x9E37_79B9;

const BIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic feature-hashing embedder.
///
/// Lower-cased word unigrams and adjacent-word bigrams are hashed with CRC32
/// into `dimensions` buckets with a hashed sign, then the vector is
/// L2-normalized. Texts sharing vocabulary land close together; no model
/// files are involved, so results are identical across machines and runs.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a single text.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

        for token in &tokens {
            self.add_feature(&mut vector, token.as_bytes(), 1.0);
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut vector, bigram.as_bytes(), BIGRAM_WEIGHT);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let bucket = crc32fast::hash(feature) as usize % self.dimensions;
        let mut sign_hasher = crc32fast::Hasher::new_with_initial(SIGN_SEED);
        sign_hasher.update(feature);
        let sign = if sign_hasher.finalize() & 1 == 0 {
            1.0
        } else {
            -1.0
        };
        vector[bucket] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
