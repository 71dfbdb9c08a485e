use crate::embeddings::cosine_similarity;
use crate::error::InputError;
use crate::models::Label;
use providers::{EmbeddingProvider, ProviderError};

/// Nearest-prototype classifier over a fixed, non-empty label set.
#[derive(Debug, Clone)]
pub struct LabelClassifier {
    labels: Vec<Label>,
}

impl LabelClassifier {
    pub fn new(labels: Vec<Label>) -> Result<Self, InputError> {
        if labels.is_empty() {
            return Err(InputError::NoLabels);
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Dimension of the prototypes; every classified vector must match it.
    pub fn dimension(&self) -> usize {
        self.labels[0].prototype.len()
    }

    pub fn check_dimension(&self, vector: &[f32]) -> Result<(), ProviderError> {
        let expected = self.dimension();
        if vector.len() != expected {
            return Err(ProviderError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Name of the label whose prototype is most similar to `vector`.
    /// The earliest label wins ties.
    pub fn classify_vector(&self, vector: &[f32]) -> Result<&str, ProviderError> {
        self.check_dimension(vector)?;
        let mut best = &self.labels[0];
        let mut best_score = cosine_similarity(vector, &best.prototype);
        for label in &self.labels[1..] {
            let score = cosine_similarity(vector, &label.prototype);
            if score > best_score {
                best = label;
                best_score = score;
            }
        }
        Ok(&best.name)
    }

    pub async fn classify(
        &self,
        text: &str,
        provider: &dyn EmbeddingProvider,
    ) -> Result<String, ProviderError> {
        let vector = provider.embed(text).await?;
        Ok(self.classify_vector(&vector)?.to_string())
    }
}
