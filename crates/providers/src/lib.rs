//! Provider abstractions for embeddings and moderation, plus the concrete
//! OpenAI and Pinecone clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

pub mod openai;
pub mod pinecone;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("index {index} not ready after {waited:?}")]
    NotReady {
        index: String,
        waited: std::time::Duration,
    },
}

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Raw moderation verdict as returned by a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub is_safe: bool,
    pub category: String,
}

impl ModerationResult {
    pub fn safe() -> Self {
        Self {
            is_safe: true,
            category: String::new(),
        }
    }

    pub fn flagged(category: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            category: category.into(),
        }
    }
}

/// Order in which flagged categories are reported. Categories not listed here
/// are checked afterwards in lexicographic order.
pub const CATEGORY_ORDER: &[&str] = &[
    "hate",
    "hate/threatening",
    "self-harm",
    "sexual",
    "sexual/minors",
    "violence",
    "violence/graphic",
    "harassment",
    "harassment/threatening",
    "self-harm/intent",
    "self-harm/instructions",
    "illicit",
    "illicit/violent",
];

#[async_trait::async_trait]
pub trait ModerationProvider: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ModerationResponse, ProviderError>;

    async fn is_safe(&self, text: &str) -> Result<ModerationResult, ProviderError> {
        let response = self.classify(text).await?;
        Ok(verdict(&response))
    }
}

/// Reduces a raw moderation response to a single reported category.
pub fn verdict(response: &ModerationResponse) -> ModerationResult {
    if !response.flagged {
        return ModerationResult::safe();
    }
    let is_set = |name: &str| response.categories.get(name).copied().unwrap_or(false);
    if let Some(name) = CATEGORY_ORDER.iter().find(|name| is_set(name)) {
        return ModerationResult::flagged(*name);
    }
    // BTreeMap iteration is already lexicographic.
    if let Some((name, _)) = response
        .categories
        .iter()
        .find(|(name, set)| **set && !CATEGORY_ORDER.contains(&name.as_str()))
    {
        return ModerationResult::flagged(name.clone());
    }
    warn!("moderation response flagged without any category set; treating as safe");
    ModerationResult::safe()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(flagged: bool, set: &[&str]) -> ModerationResponse {
        let mut categories = BTreeMap::new();
        for name in CATEGORY_ORDER {
            categories.insert(name.to_string(), false);
        }
        for name in set {
            categories.insert(name.to_string(), true);
        }
        ModerationResponse {
            flagged,
            categories,
        }
    }

    #[test]
    fn unflagged_is_safe_even_with_categories_set() {
        let result = verdict(&response(false, &["violence"]));
        assert_eq!(result, ModerationResult::safe());
        assert_eq!(result.category, "");
    }

    #[test]
    fn single_category_is_reported() {
        let result = verdict(&response(true, &["sexual/minors"]));
        assert!(!result.is_safe);
        assert_eq!(result.category, "sexual/minors");
    }

    #[test]
    fn first_category_in_fixed_order_wins() {
        let result = verdict(&response(true, &["violence/graphic", "hate", "sexual"]));
        assert_eq!(result, ModerationResult::flagged("hate"));

        let result = verdict(&response(true, &["harassment", "violence"]));
        assert_eq!(result, ModerationResult::flagged("violence"));
    }

    #[test]
    fn flagged_without_category_is_treated_as_safe() {
        let result = verdict(&response(true, &[]));
        assert_eq!(result, ModerationResult::safe());
    }

    #[test]
    fn unknown_categories_fall_back_to_lexicographic_order() {
        let result = verdict(&response(true, &["zeta/new", "alpha/new"]));
        assert_eq!(result, ModerationResult::flagged("alpha/new"));
    }

    struct Fixed(ModerationResponse);

    #[async_trait::async_trait]
    impl ModerationProvider for Fixed {
        async fn classify(&self, _text: &str) -> Result<ModerationResponse, ProviderError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn is_safe_uses_classify_response() {
        let provider = Fixed(response(true, &["self-harm"]));
        let result = provider.is_safe("anything").await.unwrap();
        assert_eq!(result, ModerationResult::flagged("self-harm"));
    }
}
