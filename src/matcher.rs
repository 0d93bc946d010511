use crate::db::FaceDatabase;
use crate::embedding::{cosine_similarity, Embedding};
use crate::error::EngineError;

/// Outcome of one nearest-neighbor query. `identity` is `None` when the
/// database holds no embeddings; the -1 score then guarantees rejection.
/// Produced fresh per query, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub identity: Option<String>,
    pub score: f32,
}

/// Exhaustive cosine-similarity scan over every stored embedding.
///
/// Strictly-greater comparison: the first entry reaching the maximum wins,
/// so ties resolve to the earliest-enrolled identity. Cost is O(N·D); fine
/// for the small databases this serves.
pub fn best_match(db: &FaceDatabase, probe: &Embedding) -> Result<MatchResult, EngineError> {
    if let Some(expected) = db.dim() {
        if probe.dim() != expected {
            return Err(EngineError::DimensionMismatch {
                expected,
                actual: probe.dim(),
            });
        }
    }

    let mut best = MatchResult {
        identity: None,
        score: -1.0,
    };
    for (name, stored) in db.entries() {
        let score = cosine_similarity(stored.as_slice(), probe.as_slice());
        if score > best.score {
            best = MatchResult {
                identity: Some(name.to_string()),
                score,
            };
        }
    }
    Ok(best)
}
