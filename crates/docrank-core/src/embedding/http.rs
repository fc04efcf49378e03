use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{EmbedError, Embedder};

/// Blocking client for OpenAI-compatible `/embeddings` endpoints.
///
/// Works against sentence-transformer servers, Ollama, and OpenAI itself.
/// Inputs are sent in chunks of at most `batch_size`; failures are returned
/// to the caller without retrying.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: Option<usize>,
    batch_size: usize,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("dimensions", &self.dimensions)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl HttpEmbedder {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        dimensions: Option<usize>,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        if base_url.trim().is_empty() {
            return Err(EmbedError::Config("missing embedding endpoint URL".into()));
        }
        if model.trim().is_empty() {
            return Err(EmbedError::Config("missing embedding model name".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedError::Config(format!("failed to build HTTP client: {}", e)))?;
        let endpoint = format!("{}/embeddings", base_url.trim().trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model: model.trim().to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            dimensions,
            batch_size: batch_size.max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Vector size requested from the endpoint, if any.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    fn embed_chunk(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key.trim());
        }
        let resp = builder
            .send()
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| EmbedError::Request(format!("invalid embedding response: {}", e)))?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != inputs.len() {
            return Err(EmbedError::CountMismatch {
                expected: inputs.len(),
                got: parsed.data.len(),
            });
        }
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        Ok(out)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_normalized() {
        let embedder = HttpEmbedder::new(
            "http://localhost:8080/v1/",
            "all-MiniLM-L6-v2",
            None,
            None,
            32,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn missing_model_is_a_config_error() {
        let err = HttpEmbedder::new(
            "http://localhost:8080",
            "  ",
            None,
            None,
            32,
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert!(matches!(err, EmbedError::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let embedder = HttpEmbedder::new(
            "http://localhost:8080",
            "m",
            Some("sk-secret".into()),
            None,
            8,
            Duration::from_secs(5),
        )
        .unwrap();
        let dbg = format!("{:?}", embedder);
        assert!(!dbg.contains("sk-secret"));
    }

    #[test]
    fn response_is_reordered_by_index() {
        let json = r#"{"data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        parsed.data.sort_by_key(|entry| entry.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }
}
