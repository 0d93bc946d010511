/// A fixed-length feature vector produced by the embedding extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    // Simple zip/map/sum that LLVM auto-vectorizes
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine similarity between two vectors, clamped to [-1, 1].
///
/// A zero-norm operand has no direction; it scores -1 so the decision policy
/// always rejects it.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let denom = norm(a) * norm(b);
    if denom <= 0.0 || !denom.is_finite() {
        return -1.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0)
}
