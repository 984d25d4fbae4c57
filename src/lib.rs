pub mod config;
pub mod cursor;
pub mod detection;
pub mod error;
pub mod gaze;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod source;

pub use config::{AppConfig, LocalizerStrategy};
pub use cursor::{CursorDriver, CursorIntegrator, PointerBackend};
pub use detection::{Detector, PupilLocalizer, TemplateDetector};
pub use error::{EyedirError, Result};
pub use models::{GazeDirection, GazeOutput, GazeVector, PupilEstimate, Rect, SENTINEL};
pub use pipeline::{GazePipeline, run_loop, write_output};
pub use source::{DisplaySink, FrameSource, ImageSequence};
