//! Embedding collaborators: text in, fixed-dimension vectors out.

use thiserror::Error;

mod hashing;
mod http;
mod mock;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;
pub use mock::MockEmbedder;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("embedder returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("embedding {index} contains a non-finite value")]
    NonFinite { index: usize },
    #[error("embedder misconfigured: {0}")]
    Config(String),
}

/// Trait for embedding backends.
///
/// Implementations must be deterministic for identical inputs and must return
/// exactly one vector per input, in input order.
pub trait Embedder: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Embed a batch of texts.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        (**self).embed(texts)
    }
}

/// Embed `texts` and verify the batch is well formed: one vector per input,
/// all of the same dimension, every component finite.
pub fn embed_batch(
    embedder: &dyn Embedder,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>, EmbedError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    let vectors = embedder.embed(texts)?;
    if vectors.len() != texts.len() {
        return Err(EmbedError::CountMismatch {
            expected: texts.len(),
            got: vectors.len(),
        });
    }
    let dim = vectors[0].len();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(EmbedError::DimensionMismatch {
            expected: dim,
            got: bad.len(),
        });
    }
    if let Some(index) = vectors
        .iter()
        .position(|v| v.iter().any(|x| !x.is_finite()))
    {
        return Err(EmbedError::NonFinite { index });
    }
    tracing::trace!(embedder = embedder.name(), count = texts.len(), dim, "embedded batch");
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken(Vec<Vec<f32>>);

    impl Embedder for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn empty_batch_skips_embedder() {
        let embedder = MockEmbedder::new(4);
        assert!(embed_batch(&embedder, &[]).unwrap().is_empty());
        assert_eq!(embedder.call_count(), 0);
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let embedder = Broken(vec![vec![1.0, 0.0]]);
        let err = embed_batch(&embedder, &["a", "b"]).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::CountMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn ragged_batch_is_rejected() {
        let embedder = Broken(vec![vec![1.0, 0.0], vec![1.0]]);
        let err = embed_batch(&embedder, &["a", "b"]).unwrap_err();
        assert!(matches!(err, EmbedError::DimensionMismatch { .. }));
    }

    #[test]
    fn non_finite_components_are_rejected() {
        let embedder = Broken(vec![vec![1.0, 0.0], vec![f32::NAN, 0.0]]);
        let err = embed_batch(&embedder, &["a", "b"]).unwrap_err();
        assert!(matches!(err, EmbedError::NonFinite { index: 1 }));

        let embedder = Broken(vec![vec![f32::INFINITY, 0.0]]);
        let err = embed_batch(&embedder, &["a"]).unwrap_err();
        assert!(matches!(err, EmbedError::NonFinite { index: 0 }));
    }
}
