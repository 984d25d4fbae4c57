//! Application configuration.
//!
//! Every field has a compiled-in default. A JSON file may override any subset
//! of them; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::preprocessing::MAX_ELEMENT_SIZE;
use crate::error::{EyedirError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub camera: CameraConfig,
    pub localizer: LocalizerConfig,
    pub tracking: TrackingConfig,
    pub cursor: CursorConfig,
    pub logging: LoggingConfig,
}

/// Face and eye template models.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub face_model: PathBuf,
    pub eye_model: PathBuf,
    /// Minimum normalized cross-correlation score for a detection.
    pub match_threshold: f32,
    /// Detections overlapping an accepted one by more than this IoU are dropped.
    pub overlap_threshold: f32,
    pub max_faces: usize,
    pub max_eyes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
}

/// Which pupil localization strategy runs on each eye region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocalizerStrategy {
    /// Dark-color mask, inverted adaptive threshold, elliptical opening.
    Masked,
    /// Median blur, Sobel magnitude, inverted map, adaptive threshold.
    Gradient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    pub strategy: LocalizerStrategy,
    /// Lower HSV bound of the dark band (H in 0..=180).
    pub dark_lower: [u8; 3],
    /// Upper HSV bound of the dark band.
    pub dark_upper: [u8; 3],
    pub masked_block_size: u32,
    pub masked_offset: i32,
    pub morph_kernel_size: u32,
    pub median_kernel_size: u32,
    pub gradient_block_size: u32,
    pub gradient_offset: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Report the last known pupil instead of `-1, -1` on failed frames.
    pub track_pupil: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enabled: bool,
    pub gain: i32,
    /// Overrides the platform screen query when both are set.
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "eyedir=debug,warn").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            face_model: PathBuf::from("data/face_template.png"),
            eye_model: PathBuf::from("data/eye_template.png"),
            match_threshold: 0.7,
            overlap_threshold: 0.3,
            max_faces: 4,
            max_eyes: 2,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0 }
    }
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            strategy: LocalizerStrategy::Masked,
            dark_lower: [0, 0, 0],
            dark_upper: [180, 255, 30],
            masked_block_size: 15,
            masked_offset: 10,
            morph_kernel_size: 5,
            median_kernel_size: 5,
            gradient_block_size: 15,
            gradient_offset: -2,
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gain: 10,
            screen_width: None,
            screen_height: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional JSON file.
    ///
    /// A missing path means compiled-in defaults; a path that cannot be read
    /// or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    EyedirError::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                serde_json::from_str::<AppConfig>(&content)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let loc = &self.localizer;
        check_block_size("masked_block_size", loc.masked_block_size)?;
        check_block_size("gradient_block_size", loc.gradient_block_size)?;
        check_kernel_size("morph_kernel_size", loc.morph_kernel_size)?;
        check_kernel_size("median_kernel_size", loc.median_kernel_size)?;
        if loc.morph_kernel_size > MAX_ELEMENT_SIZE {
            return Err(EyedirError::config(format!(
                "morph_kernel_size must be at most {}, got {}",
                MAX_ELEMENT_SIZE, loc.morph_kernel_size
            )));
        }

        if loc.dark_lower.iter().zip(loc.dark_upper.iter()).any(|(lo, hi)| lo > hi) {
            return Err(EyedirError::config(
                "dark_lower must not exceed dark_upper in any channel",
            ));
        }

        let det = &self.detector;
        if !(0.0..=1.0).contains(&det.match_threshold) {
            return Err(EyedirError::config("match_threshold must lie in [0, 1]"));
        }

        if self.cursor.screen_width == Some(0) || self.cursor.screen_height == Some(0) {
            return Err(EyedirError::config("screen dimensions must be positive"));
        }

        Ok(())
    }

    /// Screen size override, only when both dimensions are configured.
    pub fn screen_override(&self) -> Option<(u32, u32)> {
        self.cursor.screen_width.zip(self.cursor.screen_height)
    }
}

fn check_block_size(name: &str, size: u32) -> Result<()> {
    if size < 3 || size % 2 == 0 {
        return Err(EyedirError::config(format!(
            "{} must be odd and at least 3, got {}",
            name, size
        )));
    }
    Ok(())
}

fn check_kernel_size(name: &str, size: u32) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(EyedirError::config(format!(
            "{} must be odd and positive, got {}",
            name, size
        )));
    }
    Ok(())
}
