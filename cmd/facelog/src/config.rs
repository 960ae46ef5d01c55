//! Configuration for the facelog binary.
//!
//! Stored in ~/.facelog/config.yaml. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use facelog_gallery::{GalleryStore, JsonGallery, RedbGallery};
use facelog_ledger::JsonlLedger;
use facelog_matcher::MatcherConfig;
use facelog_recognizer::{Recognizer, RecognizerConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default base directory name under the home directory.
pub const DEFAULT_BASE_DIR: &str = ".facelog";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable that overrides `matcher.threshold`.
pub const THRESHOLD_ENV: &str = "FACELOG_THRESHOLD";

const GALLERY_JSON_FILE: &str = "embeddings.json";
const GALLERY_REDB_FILE: &str = "gallery.redb";
const LEDGER_FILE: &str = "attendance_logs.jsonl";

/// Which gallery backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryBackend {
    #[default]
    Json,
    Redb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the gallery and the ledger (default ~/.facelog/data).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    pub gallery_backend: GalleryBackend,

    /// Local UTC offset in hours used for work dates.
    pub tz_offset_hours: i32,

    /// Fsync the ledger after every append.
    pub durable_ledger: bool,

    pub matcher: MatcherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            gallery_backend: GalleryBackend::Json,
            tz_offset_hours: 7,
            durable_ledger: false,
            matcher: MatcherConfig::default(),
        }
    }
}

impl Config {
    /// Gets the default config directory (~/.facelog).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR))
    }

    /// Load from `path`, or the default location when `None`, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_dir().map(|d| d.join(DEFAULT_CONFIG_FILE)),
        };
        let mut cfg = match path {
            Some(p) if p.exists() => {
                let data = fs::read_to_string(&p)
                    .with_context(|| format!("failed to read config {}", p.display()))?;
                debug!("config: loaded {}", p.display());
                Self::parse(&data).with_context(|| format!("invalid config {}", p.display()))?
            }
            _ => Self::default(),
        };
        cfg.apply_env(std::env::var(THRESHOLD_ENV).ok().as_deref())?;
        Ok(cfg)
    }

    /// Parse YAML. Empty input yields defaults.
    pub fn parse(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    fn apply_env(&mut self, threshold: Option<&str>) -> Result<()> {
        if let Some(raw) = threshold {
            let v: f32 = raw
                .trim()
                .parse()
                .with_context(|| format!("{THRESHOLD_ENV}: not a number: {raw:?}"))?;
            self.matcher.threshold = v;
        }
        Ok(())
    }

    /// Resolved storage directory.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_dir()
                .map(|d| d.join("data"))
                .context("could not find home directory"),
        }
    }

    /// Open the stores and build a recognizer.
    pub fn open_recognizer(&self) -> Result<Recognizer> {
        let dir = self.storage_dir()?;
        let dim = self.matcher.dim;
        let gallery: Arc<dyn GalleryStore> = match self.gallery_backend {
            GalleryBackend::Json => Arc::new(JsonGallery::open(dir.join(GALLERY_JSON_FILE), dim)?),
            GalleryBackend::Redb => Arc::new(RedbGallery::open(dir.join(GALLERY_REDB_FILE), dim)?),
        };
        let ledger = JsonlLedger::open(dir.join(LEDGER_FILE))?.durable(self.durable_ledger);
        debug!("config: storage at {}", dir.display());

        let cfg = RecognizerConfig {
            matcher: self.matcher.clone(),
            tz_offset_hours: self.tz_offset_hours,
        };
        Ok(Recognizer::new(cfg, gallery, Arc::new(ledger))?)
    }
}
