use crate::ProviderError;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const READY_POLL: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub controller_url: String,
    pub index: String,
    pub cloud: String,
    pub region: String,
    pub timeout: Option<Duration>,
    /// Upper bound on waiting for a newly created index to accept writes.
    pub ready_timeout: Duration,
}

pub struct PineconeClient {
    client: Client,
    cfg: PineconeConfig,
    host: OnceCell<String>,
}

impl PineconeClient {
    pub fn new(cfg: PineconeConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            cfg,
            host: OnceCell::new(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.cfg.index
    }

    fn controller(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.controller_url.trim_end_matches('/'), path)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        builder
            .header("Api-Key", &self.cfg.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))
    }

    /// Returns `None` when the index does not exist.
    pub async fn describe_index(&self, name: &str) -> Result<Option<IndexModel>, ProviderError> {
        let url = self.controller(&format!("indexes/{}", name));
        let resp = self.send(self.client.get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = error_for_status(resp).await?;
        let model = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        Ok(Some(model))
    }

    pub async fn create_index(
        &self,
        name: &str,
        dimension: usize,
    ) -> Result<IndexModel, ProviderError> {
        let body = CreateIndexRequest {
            name,
            dimension,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &self.cfg.cloud,
                    region: &self.cfg.region,
                },
            },
        };
        let resp = self
            .send(self.client.post(self.controller("indexes")).json(&body))
            .await?;
        let resp = error_for_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }

    /// Creates the index if it is absent and waits until it is ready. An
    /// existing index is left untouched, whatever its dimension.
    pub async fn ensure_index(&self, name: &str, dimension: usize) -> Result<(), ProviderError> {
        let model = match self.describe_index(name).await? {
            Some(model) => {
                debug!(index = name, dimension = model.dimension, "index already present");
                model
            }
            None => {
                info!(index = name, dimension, "creating index");
                self.create_index(name, dimension).await?
            }
        };
        let model = if model.is_ready() {
            model
        } else {
            self.wait_until_ready(name).await?
        };
        if name == self.cfg.index {
            let _ = self.host.set(model.host);
        }
        Ok(())
    }

    /// Polls `describe_index` until the index reports ready with a host, or
    /// `ready_timeout` elapses.
    pub async fn wait_until_ready(&self, name: &str) -> Result<IndexModel, ProviderError> {
        let started = tokio::time::Instant::now();
        loop {
            if let Some(model) = self.describe_index(name).await? {
                if model.is_ready() {
                    debug!(index = name, waited = ?started.elapsed(), "index ready");
                    return Ok(model);
                }
                debug!(index = name, state = %model.status.state, "waiting for index");
            }
            let waited = started.elapsed();
            if waited >= self.cfg.ready_timeout {
                return Err(ProviderError::NotReady {
                    index: name.to_string(),
                    waited,
                });
            }
            tokio::time::sleep(READY_POLL.min(self.cfg.ready_timeout - waited)).await;
        }
    }

    async fn data_url(&self, path: &str) -> Result<String, ProviderError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let model = self
                    .describe_index(&self.cfg.index)
                    .await?
                    .ok_or_else(|| ProviderError::NotFound(self.cfg.index.clone()))?;
                if model.host.is_empty() {
                    return Err(ProviderError::MalformedResponse(format!(
                        "index {} has no host yet",
                        self.cfg.index
                    )));
                }
                Ok::<String, ProviderError>(model.host)
            })
            .await?;
        Ok(data_plane_url(host, path))
    }

    pub async fn upsert(&self, vectors: Vec<PineconeVector>) -> Result<(), ProviderError> {
        let url = self.data_url("vectors/upsert").await?;
        let body = UpsertRequest { vectors };
        let resp = self.send(self.client.post(url).json(&body)).await?;
        error_for_status(resp).await?;
        Ok(())
    }

    pub async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<QueryResponse, ProviderError> {
        let url = self.data_url("query").await?;
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: true,
        };
        let resp = self.send(self.client.post(url).json(&body)).await?;
        let resp = error_for_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}

fn data_plane_url(host: &str, path: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/{}", host, path)
    } else {
        format!("https://{}/{}", host, path)
    }
}

async fn error_for_status(resp: Response) -> Result<Response, ProviderError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
    Err(ProviderError::RequestFailed(format!(
        "status {} body {:?}",
        status, body
    )))
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexModel {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
}

impl IndexModel {
    pub fn is_ready(&self) -> bool {
        self.status.ready && !self.host.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct UpsertRequest {
    pub vectors: Vec<PineconeVector>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PineconeVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<ScoredVector>,
}

#[derive(Debug, Deserialize)]
pub struct ScoredVector {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub values: Vec<f32>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}
