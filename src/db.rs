use crate::embedding::Embedding;
use crate::error::EngineError;

/// One enrolled person: a unique name plus the embeddings recorded for it.
/// Embeddings are append-only and owned exclusively by their identity.
#[derive(Debug, Clone)]
pub struct Identity {
    name: String,
    embeddings: Vec<Embedding>,
}

impl Identity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }
}

/// In-memory identity database. Owns every identity and embedding.
///
/// Iteration follows identity insertion order, then embedding insertion
/// order within an identity, so matching stays deterministic when scores
/// tie exactly.
#[derive(Debug, Default, Clone)]
pub struct FaceDatabase {
    identities: Vec<Identity>,
    dim: Option<usize>,
}

impl FaceDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database whose embedding dimension is pinned up front, so a
    /// misbehaving extractor fails at enrollment instead of establishing a
    /// wrong dimension.
    pub fn with_dim(dim: usize) -> Self {
        Self {
            identities: Vec::new(),
            dim: Some(dim),
        }
    }

    /// The established embedding dimension. Fixed by the first inserted
    /// embedding unless pinned at construction.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    pub fn embedding_count(&self) -> usize {
        self.identities.iter().map(|i| i.embeddings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.embedding_count() == 0
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Append an embedding under `name`, creating the identity on first use.
    ///
    /// Fails without modifying the database if the name is empty or the
    /// embedding's length disagrees with the established dimension.
    pub fn enroll(&mut self, name: &str, embedding: Embedding) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError::EmptyIdentityName);
        }
        if let Some(expected) = self.dim {
            if expected != embedding.dim() {
                return Err(EngineError::DimensionMismatch {
                    expected,
                    actual: embedding.dim(),
                });
            }
        }
        self.dim.get_or_insert(embedding.dim());

        match self.identities.iter_mut().find(|i| i.name == name) {
            Some(identity) => identity.embeddings.push(embedding),
            None => self.identities.push(Identity {
                name: name.to_string(),
                embeddings: vec![embedding],
            }),
        }
        Ok(())
    }

    /// All (identity, embedding) pairs in insertion order. Restartable; the
    /// matcher walks this exhaustively.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Embedding)> {
        self.identities
            .iter()
            .flat_map(|i| i.embeddings.iter().map(move |e| (i.name.as_str(), e)))
    }
}
