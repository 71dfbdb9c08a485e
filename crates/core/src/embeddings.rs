//! Label prototypes and vector similarity.

use crate::error::{IngestError, InputError};
use crate::models::Label;
use providers::EmbeddingProvider;
use tracing::debug;

/// Label names in classification order. Ties go to the earlier name.
pub const DEFAULT_LABELS: [&str; 2] = ["negative", "positive"];

/// Cosine similarity of two vectors. A zero-norm operand yields 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Embeds each label name with `provider` to obtain its prototype vector.
pub async fn embed_labels(
    provider: &dyn EmbeddingProvider,
    names: &[&str],
) -> Result<Vec<Label>, IngestError> {
    if names.is_empty() {
        return Err(IngestError::LabelSet(InputError::NoLabels));
    }
    let mut labels = Vec::with_capacity(names.len());
    for name in names {
        let prototype = provider.embed(name).await.map_err(IngestError::Labels)?;
        debug!(label = *name, dimension = prototype.len(), "embedded label prototype");
        labels.push(Label {
            name: name.to_string(),
            prototype,
        });
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_similarity_is_one() {
        let v = [0.3f32, -1.2, 4.0, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_similarity_is_zero() {
        let zero = [0.0f32; 3];
        assert_eq!(cosine_similarity(&zero, &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn orthogonal_and_opposite_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_ignores_magnitude() {
        let a = cosine_similarity(&[1.0, 1.0], &[3.0, 3.0]);
        assert!((a - 1.0).abs() < 1e-6);
    }
}
