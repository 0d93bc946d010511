use std::fs;
use std::path::Path;

use facegate::config::Config;
use facegate::decision::{decide, Verdict, DEFAULT_THRESHOLD};
use facegate::embedding::Embedding;
use facegate::enroll::EmbeddingExtractor;
use facegate::error::EngineError;
use facegate::matcher::best_match;
use facegate::store;

/// Maps an image to a 2-dim embedding from its top-left pixel, so tests can
/// steer similarity scores with plain colors.
struct PixelExtractor;

impl EmbeddingExtractor for PixelExtractor {
    fn extract(&mut self, image: &image::DynamicImage) -> Result<Vec<f32>, EngineError> {
        let rgb = image.to_rgb8();
        let p = rgb.get_pixel(0, 0);
        Ok(vec![p[0] as f32 / 255.0, p[1] as f32 / 255.0])
    }
}

fn write_png(path: &Path, color: [u8; 3]) {
    image::RgbImage::from_pixel(4, 4, image::Rgb(color))
        .save(path)
        .unwrap();
}

fn config_for(dir: &Path) -> Config {
    Config {
        database_path: dir.to_path_buf(),
        ..Config::default()
    }
}

#[test]
fn bulk_build_skips_undecodable_samples() {
    let tmp = tempfile::tempdir().unwrap();
    let crowd = tmp.path().join("crowd");
    fs::create_dir_all(&crowd).unwrap();
    for i in 0..9 {
        write_png(&crowd.join(format!("{i}.png")), [i as u8 * 20, 0, 0]);
    }
    fs::write(crowd.join("broken.png"), b"this is not a png").unwrap();

    let db = store::load_database(&config_for(tmp.path()), &mut PixelExtractor).unwrap();
    assert_eq!(db.identity_count(), 1);
    assert_eq!(db.embedding_count(), 9);
}

#[test]
fn recognizes_nearest_identity_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    // alice embeds to [1, 0], bob to [0, 1]
    fs::create_dir_all(tmp.path().join("alice")).unwrap();
    fs::create_dir_all(tmp.path().join("bob")).unwrap();
    write_png(&tmp.path().join("alice/sample.png"), [255, 0, 0]);
    write_png(&tmp.path().join("bob/sample.png"), [0, 255, 0]);

    let mut extractor = PixelExtractor;
    let db = store::load_database(&config_for(tmp.path()), &mut extractor).unwrap();
    assert_eq!(db.identity_count(), 2);

    // probe embeds to roughly [0.6, 0.8]: closer to bob, above threshold
    let probe_img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        4,
        4,
        image::Rgb([153, 204, 0]),
    ));
    let probe = Embedding::new(extractor.extract(&probe_img).unwrap());
    let result = best_match(&db, &probe).unwrap();
    assert_eq!(result.identity.as_deref(), Some("bob"));
    assert!(result.score > 0.79 && result.score < 0.81);
    assert_eq!(
        decide(&result, DEFAULT_THRESHOLD),
        Verdict::Recognized("bob".to_string())
    );
}

#[test]
fn dissimilar_probe_stays_unknown() {
    let mut db = facegate::FaceDatabase::new();
    db.enroll("a", Embedding::new(vec![1.0, 0.0])).unwrap();
    db.enroll("b", Embedding::new(vec![0.0, 1.0])).unwrap();

    // scores: a = -1, b = 0; best is b but 0 does not exceed 0.5
    let result = best_match(&db, &Embedding::new(vec![-1.0, 0.0])).unwrap();
    assert_eq!(result.identity.as_deref(), Some("b"));
    assert_eq!(decide(&result, DEFAULT_THRESHOLD), Verdict::Unknown);
}

#[test]
fn tie_break_is_stable_across_rebuilds() {
    let tmp = tempfile::tempdir().unwrap();
    // both identities embed to the same vector; directory order decides
    fs::create_dir_all(tmp.path().join("adam")).unwrap();
    fs::create_dir_all(tmp.path().join("zeke")).unwrap();
    write_png(&tmp.path().join("adam/sample.png"), [255, 0, 0]);
    write_png(&tmp.path().join("zeke/sample.png"), [255, 0, 0]);

    let cfg = config_for(tmp.path());
    for _ in 0..5 {
        let db = store::load_database(&cfg, &mut PixelExtractor).unwrap();
        let result = best_match(&db, &Embedding::new(vec![1.0, 0.0])).unwrap();
        assert_eq!(result.identity.as_deref(), Some("adam"));
        assert!((result.score - 1.0).abs() < 1e-6);
    }
}

#[test]
fn pinned_dimension_rejects_mismatched_extractor() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("alice")).unwrap();
    write_png(&tmp.path().join("alice/sample.png"), [255, 0, 0]);

    let cfg = Config {
        embedding_dim: Some(128),
        ..config_for(tmp.path())
    };
    // every sample is skipped with a dimension mismatch; the load survives
    let db = store::load_database(&cfg, &mut PixelExtractor).unwrap();
    assert!(db.is_empty());
    assert_eq!(db.dim(), Some(128));
}

#[test]
fn empty_database_always_unknown() {
    let db = facegate::FaceDatabase::new();
    let result = best_match(&db, &Embedding::new(vec![0.2, 0.9])).unwrap();
    assert_eq!(result.identity, None);
    assert_eq!(decide(&result, DEFAULT_THRESHOLD), Verdict::Unknown);
}
