//! Error types for startup and I/O failures.
//!
//! Per-frame failures (no face, no eye, empty blob) are never errors; they
//! resolve to sentinel values inside the pipeline.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EyedirError {
    #[error("Failed to load detector model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Display error: {message}")]
    Display { message: String },

    #[error("Pointer error: {message}")]
    Pointer { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EyedirError>;

impl EyedirError {
    pub fn model_load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display {
            message: msg.into(),
        }
    }

    pub fn pointer(msg: impl Into<String>) -> Self {
        Self::Pointer {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
