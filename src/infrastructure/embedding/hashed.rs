use async_trait::async_trait;

use crate::domain::{ports::Embedder, DomainError, Embedding};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Each lower-cased alphanumeric token is hashed (FNV-1a) into one of
/// `dimension` buckets; the top hash bit picks the sign. The result is
/// L2-normalised. Text without tokens embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashedEmbedding {
    dimension: usize,
}

impl HashedEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn fnv1a(token: &str) -> u64 {
        token.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }

    pub fn embed_sync(&self, text: &str) -> Embedding {
        let mut vector = vec![0f32; self.dimension];
        if self.dimension == 0 {
            return Embedding::new(vector);
        }

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = Self::fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        Embedding::new(vector)
    }
}

#[async_trait]
impl Embedder for HashedEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|text| self.embed_sync(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
