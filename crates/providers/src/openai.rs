use crate::{EmbeddingProvider, ModerationProvider, ModerationResponse, ProviderError};
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub moderation_model: String,
    pub timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiProvider {
    pub fn new(cfg: OpenAiConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            cfg: Arc::new(cfg),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ProviderError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.cfg.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        Ok(resp)
    }
}

#[derive(Serialize)]
struct ModelInput<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModerationApiResponse {
    results: Vec<ModerationResponse>,
}

fn reject_blank(text: &str) -> Result<(), ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::InvalidInput("text is empty".into()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        reject_blank(text)?;
        let body = ModelInput {
            model: &self.cfg.embedding_model,
            input: text,
        };
        let parsed: EmbeddingApiResponse = self
            .post("embeddings", &body)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::MalformedResponse("no embedding returned".into()))
    }
}

#[async_trait::async_trait]
impl ModerationProvider for OpenAiProvider {
    async fn classify(&self, text: &str) -> Result<ModerationResponse, ProviderError> {
        reject_blank(text)?;
        let body = ModelInput {
            model: &self.cfg.moderation_model,
            input: text,
        };
        let parsed: ModerationApiResponse = self
            .post("moderations", &body)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no moderation result".into()))
    }
}
