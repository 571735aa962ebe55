use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Environment variable naming a JSON file that overrides the configuration
pub const CONFIG_ENV_VAR: &str = "PIXEL_CANVAS_CONFIG";

/// Errors that can occur while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Editor settings. We derive Deserialize/Serialize so the settings can be
/// persisted by eframe and read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorConfig {
    /// Size of a new blank canvas
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Number of layers in a new blank canvas
    pub initial_layers: usize,
    /// Maximum number of undo (and redo) snapshots kept
    pub history_depth: usize,
    pub max_recent_colours: usize,
    /// Refine stops once the canvas would exceed this many pixels per side
    pub max_canvas_dimension: u32,
    pub default_brush_size: u32,
    /// On-screen edge length of the canvas view, in points
    pub view_size: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 16,
            canvas_height: 16,
            initial_layers: 4,
            history_depth: DEFAULT_HISTORY_DEPTH,
            max_recent_colours: 10,
            max_canvas_dimension: 64,
            default_brush_size: 1,
            view_size: 512.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Applies the file named by `PIXEL_CANVAS_CONFIG`, if set. A missing or
    /// broken file is logged and the current settings are kept.
    pub fn with_env_override(self) -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return self;
        };
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path, err);
                self
            }
        }
    }
}
