use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::Config;
use crate::db::FaceDatabase;
use crate::enroll::{self, EmbeddingExtractor, Source};
use crate::error::EngineError;

/// Enumerate the sample store: one subdirectory per identity, image files
/// inside. Entries are sorted so the bulk-build order, and therefore the
/// matcher's tie-break order, is stable across filesystems.
pub fn scan(database_path: &Path) -> Result<Vec<(String, Vec<PathBuf>)>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(database_path)
        .with_context(|| format!("reading database directory {}", database_path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let mut identities = Vec::new();
    for dir in dirs {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            warn!("skipping non-utf8 identity directory {}", dir.display());
            continue;
        };
        let mut files: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("reading identity directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        identities.push((name, files));
    }
    Ok(identities)
}

/// Build the in-memory database from the sample store. Undecodable files are
/// logged and skipped; the rest of the load continues.
pub fn load_database(cfg: &Config, extractor: &mut dyn EmbeddingExtractor) -> Result<FaceDatabase> {
    let mut db = match cfg.embedding_dim {
        Some(dim) => FaceDatabase::with_dim(dim),
        None => FaceDatabase::new(),
    };

    for (name, files) in scan(&cfg.database_path)? {
        let mut samples = Vec::new();
        for file in files {
            match image::open(&file) {
                Ok(img) => samples.push(Source::Image(img)),
                Err(e) => warn!(
                    "skipping {}: {}",
                    file.display(),
                    EngineError::InvalidImage(e.to_string())
                ),
            }
        }
        enroll::bulk_enroll(&mut db, extractor, [(name, samples)]);
    }

    info!(
        "Loaded {} embedding(s) for {} identity(ies)",
        db.embedding_count(),
        db.identity_count()
    );
    Ok(db)
}

/// Persist an uploaded sample under its identity's folder with a fresh uuid
/// filename, creating the folder on first use.
pub fn save_sample(
    database_path: &Path,
    identity: &str,
    ext: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    let dir = database_path.join(identity);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let file = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), ext));
    fs::write(&file, bytes).with_context(|| format!("writing {}", file.display()))?;
    Ok(file)
}

/// File extension for raw upload bytes, from the image magic number.
pub fn extension_for(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("bin")
}
