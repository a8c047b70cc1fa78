//! Embedding client (C10): a single synchronous embed request against the
//! backend's `/api/embed` endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EmbeddingConfig;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("transport error calling embedding backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("embedding backend returned {status}: {body_preview}")]
    BackendRefusal { status: u16, body_preview: String },
    #[error("embedding backend returned an empty embeddings array")]
    EmptyResponse,
    #[error("embedding backend response did not match the expected shape: {0}")]
    Protocol(String),
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

const BODY_PREVIEW_LEN: usize = 200;

/// Embeds a single string and returns its dense vector. `client` is
/// expected to already carry `config.timeout_secs` as its request timeout
/// (see `EmbeddingConfig::build_http_client`) — this function does not
/// apply a per-call timeout itself.
pub async fn embed(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    input: &str,
) -> Result<Vec<f32>, EmbedError> {
    let url = format!("{}/api/embed", config.base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .json(&EmbedRequest {
            model: &config.model,
            input,
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(EmbedError::BackendRefusal {
            status: status.as_u16(),
            body_preview: preview(&body),
        });
    }

    let parsed: EmbedResponse = serde_json::from_str(&body)
        .map_err(|e| EmbedError::Protocol(format!("{e}: {}", preview(&body))))?;

    parsed
        .embeddings
        .into_iter()
        .next()
        .ok_or(EmbedError::EmptyResponse)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_response() {
        let body = r#"{"embeddings": [[0.1, 0.2, 0.3]]}"#;
        let parsed: EmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.embeddings[0], vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn empty_embeddings_array_is_an_error_condition() {
        let body = r#"{"embeddings": []}"#;
        let parsed: EmbedResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.embeddings.into_iter().next().is_none());
    }

    #[test]
    fn preview_truncates_to_200_chars() {
        let body = "x".repeat(500);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_LEN);
    }

    #[test]
    fn request_serializes_model_and_input() {
        let req = EmbedRequest {
            model: "embed-768",
            input: "hello",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"model":"embed-768","input":"hello"}"#);
    }
}
