//! Lookup-table embedder for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{EmbedError, Embedder, HashingEmbedder};

/// A hand-rolled mock implementing [`Embedder`].
///
/// Texts registered with [`with_vector`](MockEmbedder::with_vector) embed to
/// the given vector; everything else falls back to a [`HashingEmbedder`] of
/// the same dimension. Calls and batch sizes are recorded so tests can assert
/// on batching behavior.
pub struct MockEmbedder {
    dimensions: usize,
    table: HashMap<String, Vec<f32>>,
    fallback: HashingEmbedder,
    fail_with: Option<String>,
    call_count: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            table: HashMap::new(),
            fallback: HashingEmbedder::new(dimensions),
            fail_with: None,
            call_count: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Map `text` to a fixed vector. The vector is padded or truncated to
    /// the mock's dimension.
    pub fn with_vector(mut self, text: &str, vector: &[f32]) -> Self {
        let mut v = vector.to_vec();
        v.resize(self.dimensions, 0.0);
        self.table.insert(text.to_string(), v);
        self
    }

    /// Make every call fail with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    /// Number of times [`Embedder::embed`] was invoked.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Size of each batch received, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }
}

impl Embedder for MockEmbedder {
    fn name(&self) -> &str {
        "mock"
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sizes) = self.batch_sizes.lock() {
            sizes.push(texts.len());
        }
        if let Some(ref message) = self.fail_with {
            return Err(EmbedError::Request(message.clone()));
        }
        Ok(texts
            .iter()
            .map(|t| {
                self.table
                    .get(*t)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.embed_one(t))
            })
            .collect())
    }
}
