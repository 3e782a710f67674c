/// User configuration
///
/// Defaults are compiled in. A `config.json` in the data directory may
/// override any subset of fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CoverError, CoverResult};
use crate::state::history::DEFAULT_HISTORY_CAPACITY;
use crate::state::layer::DEFAULT_STICKER_SIZE;

/// Maximum canvas width; larger images are scaled down
pub const DEFAULT_MAX_WIDTH: u32 = 800;
/// Maximum canvas height
pub const DEFAULT_MAX_HEIGHT: u32 = 600;

const APP_DIR: &str = "coverme";
const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "coverme.db";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub max_width: u32,
    pub max_height: u32,
    /// Undo steps kept per session
    pub history_capacity: usize,
    /// Edge length of new stickers, in canvas pixels
    pub sticker_size: f32,
    /// Font used to draw emoji stickers
    pub sticker_font: Option<PathBuf>,
    /// Gallery database; defaults to `<data_dir>/coverme/coverme.db`
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sticker_size: DEFAULT_STICKER_SIZE,
            sticker_font: None,
            db_path: None,
        }
    }
}

impl Config {
    /// Load `<data_dir>/coverme/config.json`, or defaults when it doesn't exist
    pub fn load() -> CoverResult<Self> {
        let path = data_dir()?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> CoverResult<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Database location, falling back to the data directory
    pub fn database_path(&self) -> CoverResult<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE)),
        }
    }
}

/// Per-user application directory
pub fn data_dir() -> CoverResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(CoverError::NoDataDir)
}
