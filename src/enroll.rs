use image::DynamicImage;
use log::warn;

use crate::db::FaceDatabase;
use crate::embedding::Embedding;
use crate::error::EngineError;

/// The seam to the embedding model: deterministic for identical preprocessed
/// input, fixed output dimension. Implemented by the ONNX extractor in
/// production and by stubs in tests.
pub trait EmbeddingExtractor {
    fn extract(&mut self, image: &DynamicImage) -> Result<Vec<f32>, EngineError>;
}

impl EmbeddingExtractor for facegate_vision::OnnxExtractor {
    fn extract(&mut self, image: &DynamicImage) -> Result<Vec<f32>, EngineError> {
        facegate_vision::OnnxExtractor::extract(self, image)
            .map_err(|e| EngineError::Extraction(format!("{e:#}")))
    }
}

/// One enrollment sample: a raw image for the extractor, or an embedding
/// computed elsewhere.
pub enum Source {
    Image(DynamicImage),
    Embedding(Vec<f32>),
}

/// Single-sample enrollment. Extraction and dimension failures surface to
/// the caller; nothing is silently dropped on this path.
pub fn enroll_from_image(
    db: &mut FaceDatabase,
    extractor: &mut dyn EmbeddingExtractor,
    name: &str,
    image: &DynamicImage,
) -> Result<(), EngineError> {
    let vector = extractor.extract(image)?;
    db.enroll(name, Embedding::new(vector))
}

/// Batch enrollment into an existing database. One bad sample must not abort
/// the load: per-sample failures are logged and skipped.
pub fn bulk_enroll<I>(db: &mut FaceDatabase, extractor: &mut dyn EmbeddingExtractor, sources: I)
where
    I: IntoIterator<Item = (String, Vec<Source>)>,
{
    for (name, samples) in sources {
        for sample in samples {
            let vector = match sample {
                Source::Embedding(v) => v,
                Source::Image(img) => match extractor.extract(&img) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("skipping sample for {name}: {e}");
                        continue;
                    }
                },
            };
            if let Err(e) = db.enroll(&name, Embedding::new(vector)) {
                warn!("skipping sample for {name}: {e}");
            }
        }
    }
}

/// Construct a database from scratch out of a batch of samples.
pub fn build<I>(extractor: &mut dyn EmbeddingExtractor, sources: I) -> FaceDatabase
where
    I: IntoIterator<Item = (String, Vec<Source>)>,
{
    let mut db = FaceDatabase::new();
    bulk_enroll(&mut db, extractor, sources);
    db
}
