use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facegate::{config, decision, matcher, server, store, Embedding, EmbeddingExtractor, EngineError};
use facegate_vision::OnnxExtractor;
use log::info;
use parking_lot::{Mutex, RwLock};

#[derive(Parser)]
#[command(name = "facegate")]
#[command(
    version,
    about = "Face identification service - enroll samples and match uploads against them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the identity database from the sample store and serve the HTTP API
    Serve,
    /// Enroll an image file under an identity
    Enroll {
        /// Identity to enroll the sample under
        #[arg(short, long)]
        identity: String,
        /// Path to the image file
        image: PathBuf,
    },
    /// Match an image file against the enrolled identities
    Identify {
        /// Path to the image file
        image: PathBuf,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;
    cfg.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Serve => serve(cfg),
        Commands::Enroll { identity, image } => enroll(&cfg, &identity, &image),
        Commands::Identify { image } => identify(&cfg, &image),
        Commands::Config => open_config(),
    }
}

fn extractor(cfg: &config::Config) -> Result<OnnxExtractor> {
    OnnxExtractor::from_file(&cfg.model_path, cfg.image_size())
        .context("Failed to initialize the embedding extractor")
}

fn serve(cfg: config::Config) -> Result<()> {
    let mut ext = extractor(&cfg)?;

    info!("Loading identity database from {}", cfg.database_path.display());
    let db = store::load_database(&cfg, &mut ext)?;

    let listen = cfg.listen.clone();
    let state = Arc::new(server::AppState {
        config: cfg,
        db: RwLock::new(db),
        extractor: Mutex::new(Box::new(ext)),
    });

    info!("Listening on {listen}");
    let sys = actix_web::rt::System::new();
    sys.block_on(server::start(state, &listen))
        .context("HTTP server error")?;
    Ok(())
}

fn enroll(cfg: &config::Config, identity: &str, image_path: &Path) -> Result<()> {
    info!("Enrolling identity: {identity}");

    let bytes = std::fs::read(image_path)
        .with_context(|| format!("reading {}", image_path.display()))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| EngineError::InvalidImage(e.to_string()))?;

    let mut ext = extractor(cfg)?;
    let vector = EmbeddingExtractor::extract(&mut ext, &img)?;
    if let Some(expected) = cfg.embedding_dim {
        if vector.len() != expected {
            return Err(EngineError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }
            .into());
        }
    }

    let saved = store::save_sample(
        &cfg.database_path,
        identity,
        store::extension_for(&bytes),
        &bytes,
    )?;

    info!(
        "✓ Enrolled {identity} ({} dims); sample saved to {}",
        vector.len(),
        saved.display()
    );
    Ok(())
}

fn identify(cfg: &config::Config, image_path: &Path) -> Result<()> {
    let mut ext = extractor(cfg)?;
    let db = store::load_database(cfg, &mut ext)?;

    let img = image::open(image_path).map_err(|e| EngineError::InvalidImage(e.to_string()))?;
    let vector = EmbeddingExtractor::extract(&mut ext, &img)?;
    let result = matcher::best_match(&db, &Embedding::new(vector))?;
    let verdict = decision::decide(&result, cfg.threshold);

    info!(
        "Best score {:.3} (threshold {:.3})",
        result.score, cfg.threshold
    );
    println!("{verdict}");
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
