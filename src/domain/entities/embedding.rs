use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, Result};

/// Offset added to cosine similarity so ranking scores stay in `[0, 2]`.
///
/// The shift is monotonic and never changes the relative order of results.
pub const RANKING_SCORE_OFFSET: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn new(vec: Vec<f32>) -> Self {
        Self(vec)
    }

    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn norm(&self) -> f32 {
        norm(&self.0) as f32
    }

    /// Fails with `DimensionMismatch` unless the vector has exactly `dimension` entries.
    pub fn ensure_dimension(&self, dimension: usize) -> Result<()> {
        if self.0.len() != dimension {
            return Err(DomainError::dimension_mismatch(dimension, self.0.len()));
        }
        Ok(())
    }

    pub fn cosine_similarity(&self, other: &Embedding) -> Result<f32> {
        cosine_similarity(&self.0, &other.0)
    }

    pub fn ranking_score(&self, other: &Embedding) -> Result<f32> {
        ranking_score(&self.0, &other.0)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vec: Vec<f32>) -> Self {
        Self(vec)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

/// Cosine similarity of two equal-length vectors, in `[-1, 1]`.
///
/// Accumulates in `f64` so long 768-dimension vectors do not drift.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DomainError::dimension_mismatch(a.len(), b.len()));
    }
    if a.is_empty() {
        return Err(DomainError::invalid_input("cannot compare empty vectors"));
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(DomainError::DegenerateVector);
    }

    let cosine = dot / (norm_a * norm_b);
    if !cosine.is_finite() {
        return Err(DomainError::invalid_input("vectors contain non-finite values"));
    }

    Ok(cosine.clamp(-1.0, 1.0) as f32)
}

/// `cosine_similarity + 1.0`, keeping scores non-negative for display.
pub fn ranking_score(a: &[f32], b: &[f32]) -> Result<f32> {
    Ok(cosine_similarity(a, b)? + RANKING_SCORE_OFFSET)
}
