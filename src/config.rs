use anyhow::{ensure, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("FACEGATE_CONFIG_PATH").unwrap_or("/usr/local/etc/facegate/config.toml"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum cosine similarity for a match to count as recognized.
    /// Strictly greater than; a score exactly at the threshold is Unknown.
    pub threshold: f32,
    /// Expected embedding length. Unset means the first enrolled embedding
    /// establishes it.
    pub embedding_dim: Option<usize>,
    /// Root of the sample store: one subdirectory per identity.
    pub database_path: PathBuf,
    /// ONNX embedding model file.
    pub model_path: PathBuf,
    /// Resolution the model expects, width then height.
    pub image_size: [u32; 2],
    /// HTTP bind address.
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: crate::decision::DEFAULT_THRESHOLD,
            embedding_dim: None,
            database_path: PathBuf::from("/var/lib/facegate/database"),
            model_path: PathBuf::from("/var/lib/facegate/model.onnx"),
            image_size: [154, 154],
            listen: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Config {
    pub fn image_size(&self) -> (u32, u32) {
        (self.image_size[0], self.image_size[1])
    }

    /// Reject configurations that cannot work, before any request is served.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (-1.0..=1.0).contains(&self.threshold),
            "threshold {} outside [-1, 1]",
            self.threshold
        );
        ensure!(
            self.image_size[0] > 0 && self.image_size[1] > 0,
            "image_size must be non-zero"
        );
        ensure!(
            self.embedding_dim != Some(0),
            "embedding_dim must be non-zero when set"
        );
        ensure!(!self.listen.is_empty(), "listen address must not be empty");
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
