//! Local text embeddings for imported entities.
//!
//! The embedder is a hashed bag-of-words: deterministic, dependency-free
//! and good enough for coarse similarity over short descriptions. Every
//! vector is tagged with its generator and dimension so that vectors from
//! different generators can never be compared silently.

use serde::{Deserialize, Serialize};

/// Dimension of the hashed bag-of-words space.
pub const HASH_EMBEDDING_DIM: usize = 384;

/// Generator tag for the hashed bag-of-words embedder.
pub const HASH_GENERATOR: &str = "hash-bow-v1";

/// A dimension-tagged embedding vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Generator that produced this vector.
    pub generator: String,
    /// Vector dimension.
    pub dimension: usize,
    /// L2-normalized components.
    pub values: Vec<f32>,
}

/// Deterministic hashed bag-of-words embedder.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimension: HASH_EMBEDDING_DIM,
        }
    }
}

impl HashEmbedder {
    /// Create an embedder with the default dimension.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed a text into a normalized vector.
    #[must_use]
    pub fn embed(&self, text: &str) -> Embedding {
        let mut values = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let bucket = (fnv1a(token.as_bytes()) as usize) % self.dimension;
            values[bucket] += 1.0;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }

        Embedding {
            generator: HASH_GENERATOR.to_string(),
            dimension: self.dimension,
            values,
        }
    }
}

/// Cosine similarity between two embeddings.
///
/// Returns `None` when the vectors come from different generators or have
/// different dimensions; mixed-generator comparisons are meaningless and
/// must be visible to the caller.
#[must_use]
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Option<f32> {
    if a.generator != b.generator
        || a.dimension != b.dimension
        || a.values.len() != b.values.len()
    {
        return None;
    }

    let dot: f32 = a.values.iter().zip(&b.values).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.values.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    Some(dot / (norm_a * norm_b))
}

/// Lowercased alphanumeric tokens of at least two characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= 2)
        .map(str::to_lowercase)
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_deterministic_and_normalized() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("FinTech grant for Malaysian startups");
        let b = embedder.embed("FinTech grant for Malaysian startups");
        assert_eq!(a, b);
        assert_eq!(a.dimension, HASH_EMBEDDING_DIM);

        let norm: f32 = a.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_similar_texts_score_higher() {
        let embedder = HashEmbedder::new();
        let grant_a = embedder.embed("A grant for fintech startups in Malaysia");
        let grant_b = embedder.embed("Grant funding for Malaysia fintech startups");
        let other = embedder.embed("Annual conference about marine biology in Norway");

        let close = cosine_similarity(&grant_a, &grant_b).unwrap();
        let far = cosine_similarity(&grant_a, &other).unwrap();
        assert!(close > far);
    }

    #[test]
    fn test_mismatched_embeddings_refuse_comparison() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("some text");

        let mut other_gen = a.clone();
        other_gen.generator = "other-model".to_string();
        assert!(cosine_similarity(&a, &other_gen).is_none());

        let other_dim = Embedding {
            generator: HASH_GENERATOR.to_string(),
            dimension: 128,
            values: vec![0.0; 128],
        };
        assert!(cosine_similarity(&a, &other_dim).is_none());
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new();
        let empty = embedder.embed("");
        assert!(empty.values.iter().all(|v| *v == 0.0));
        let a = embedder.embed("anything");
        assert_eq!(cosine_similarity(&a, &empty), Some(0.0));
    }
}
