pub mod config;
pub mod db;
pub mod decision;
pub mod embedding;
pub mod enroll;
pub mod error;
pub mod matcher;
pub mod server;
pub mod store;

pub use db::{FaceDatabase, Identity};
pub use decision::{decide, Verdict, DEFAULT_THRESHOLD};
pub use embedding::{cosine_similarity, Embedding};
pub use enroll::EmbeddingExtractor;
pub use error::EngineError;
pub use matcher::{best_match, MatchResult};
