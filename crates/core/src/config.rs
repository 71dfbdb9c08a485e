use crate::ids::IdPolicyKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub vectors: VectorConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_moderation_model")]
    pub moderation_model: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_url(),
            embedding_model: default_embedding_model(),
            moderation_model: default_moderation_model(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorProvider {
    #[default]
    Pinecone,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    #[serde(default)]
    pub provider: VectorProvider,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Falls back to `PINECONE_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_controller_url")]
    pub controller_url: String,
    #[serde(default = "default_cloud")]
    pub cloud: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// How long to wait for a new index to become ready.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: VectorProvider::default(),
            index: default_index(),
            dimension: default_dimension(),
            api_key: None,
            controller_url: default_controller_url(),
            cloud: default_cloud(),
            region: default_region(),
            timeout_secs: None,
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub id_policy: IdPolicyKind,
    #[serde(default)]
    pub strict: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            id_policy: IdPolicyKind::default(),
            strict: false,
        }
    }
}

fn default_openai_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_moderation_model() -> String {
    "text-moderation-latest".to_string()
}

fn default_index() -> String {
    "semantic-search".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_controller_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    120
}

fn default_source() -> String {
    "sample.csv".to_string()
}

/// Loads configuration from `path` (or the optional `config/default` file)
/// layered with `SEMSEARCH__SECTION__KEY` environment variables.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("SEMSEARCH")
            .prefix_separator("__")
            .separator("__"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
