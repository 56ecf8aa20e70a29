//! HttpEmbedder -- [`Embedder`] over an OpenAI-compatible `/embeddings` endpoint.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use newsvec_core::embedding::embedder::Embedder;
use newsvec_types::config::EmbedderConfig;
use newsvec_types::error::EmbedError;

pub struct HttpEmbedder {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(config: &EmbedderConfig, api_key: SecretString) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EmbedError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    /// Build from config, reading the key from the variable named by `api_key_env`.
    pub fn from_env(config: &EmbedderConfig) -> Result<Self, EmbedError> {
        let key = std::env::var(&config.api_key_env)
            .map_err(|_| EmbedError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, SecretString::from(key))
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

/// Vectors of a response body in input order.
///
/// The service may return entries out of order; each carries the index of
/// the input it belongs to.
fn parse_response(body: &str) -> Result<Vec<Vec<f32>>, EmbedError> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbedError::Deserialization(format!("failed to parse response: {e}")))?;
    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

fn status_error(status: reqwest::StatusCode, body: String) -> EmbedError {
    match status.as_u16() {
        401 | 403 => EmbedError::AuthenticationFailed,
        429 => EmbedError::RateLimited,
        code => EmbedError::Status { status: code, body },
    }
}

impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EmbedError::Request(format!("failed to read response body: {e}")))?;
        if !status.is_success() {
            return Err(status_error(status, text));
        }

        parse_response(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_restores_input_order() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.3, 0.4]},
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]}
            ],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;
        let vectors = parse_response(body).unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, EmbedError::Deserialization(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(reqwest::StatusCode::UNAUTHORIZED, String::new()),
            EmbedError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()),
            EmbedError::RateLimited
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::BAD_GATEWAY, "upstream".to_string()),
            EmbedError::Status { status: 502, .. }
        ));
    }

    #[test]
    fn test_request_serializes_openai_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let body = EmbeddingRequest {
            model: "m",
            input: &input,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"model": "m", "input": ["a", "b"]})
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = EmbedderConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..EmbedderConfig::default()
        };
        let embedder = HttpEmbedder::new(&config, SecretString::from("k".to_string())).unwrap();
        assert_eq!(embedder.url(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.dimension(), 1536);
    }

    #[test]
    fn test_from_env_without_key_fails() {
        let config = EmbedderConfig {
            api_key_env: "NEWSVEC_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..EmbedderConfig::default()
        };
        let err = HttpEmbedder::from_env(&config).err().unwrap();
        assert!(matches!(err, EmbedError::MissingApiKey(name) if name.ends_with("NEVER_SET")));
    }
}
