//! Frame sources and display sinks around the pipeline.

use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EyedirError, Result};

/// Blocking source of color frames. `None` means end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    fn name(&self) -> String;
}

/// Renders frames for a human and reports when the user asks to stop
pub trait DisplaySink {
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    fn stop_requested(&self) -> bool;
}

/// Replays still images from a directory in file-name order
pub struct ImageSequence {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    cursor: usize,
}

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "pgm", "ppm", "tif", "tiff"];

impl ImageSequence {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(EyedirError::capture(format!(
                "frame directory not found: {}",
                dir.display()
            )));
        }

        let mut frames: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(EyedirError::capture(format!(
                "no image frames in {}",
                dir.display()
            )));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            frames,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;

        let img = image::open(path)?;
        Ok(Some(img.to_rgb8()))
    }

    fn name(&self) -> String {
        format!("{} ({} frames)", self.dir.display(), self.frames.len())
    }
}

#[cfg(feature = "camera")]
pub use camera::CameraSource;

#[cfg(feature = "camera")]
mod camera {
    use super::FrameSource;
    use crate::error::{EyedirError, Result};
    use image::RgbImage;
    use nokhwa::{
        Camera,
        pixel_format::RgbFormat,
        utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    };

    pub struct CameraSource {
        camera: Camera,
    }

    impl CameraSource {
        pub fn new(index: u32) -> Result<Self> {
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
            let mut camera = Camera::new(CameraIndex::Index(index), requested)
                .map_err(|e| EyedirError::capture(format!("cannot open camera {}: {}", index, e)))?;

            camera
                .open_stream()
                .map_err(|e| EyedirError::capture(format!("cannot start stream: {}", e)))?;

            tracing::info!(
                camera = %camera.info().human_name(),
                format = %camera.camera_format(),
                "Opened camera"
            );
            Ok(Self { camera })
        }
    }

    impl FrameSource for CameraSource {
        fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            let frame = self
                .camera
                .frame()
                .map_err(|e| EyedirError::capture(format!("failed to get frame: {}", e)))?;
            let decoded = frame
                .decode_image::<RgbFormat>()
                .map_err(|e| EyedirError::capture(format!("failed to decode frame: {}", e)))?;
            Ok(Some(decoded))
        }

        fn name(&self) -> String {
            self.camera.info().human_name()
        }
    }
}

/// Open the capture device at `index`
pub fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    #[cfg(feature = "camera")]
    {
        Ok(Box::new(CameraSource::new(index)?))
    }
    #[cfg(not(feature = "camera"))]
    {
        Err(EyedirError::capture(format!(
            "cannot open camera {}: built without the `camera` feature (use --frames)",
            index
        )))
    }
}

#[cfg(feature = "display")]
pub use window::WindowDisplay;

#[cfg(feature = "display")]
mod window {
    use super::DisplaySink;
    use crate::error::{EyedirError, Result};
    use image::RgbImage;

    /// Preview window; Escape or closing the window requests a stop
    pub struct WindowDisplay {
        window: minifb::Window,
        buffer: Vec<u32>,
    }

    impl WindowDisplay {
        pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
            let mut window = minifb::Window::new(
                title,
                width,
                height,
                minifb::WindowOptions {
                    resize: true,
                    ..minifb::WindowOptions::default()
                },
            )
            .map_err(|e| EyedirError::display(format!("failed to create window: {}", e)))?;

            window.set_target_fps(60);

            Ok(Self {
                window,
                buffer: Vec::new(),
            })
        }
    }

    impl DisplaySink for WindowDisplay {
        fn show(&mut self, frame: &RgbImage) -> Result<()> {
            let (w, h) = frame.dimensions();
            self.buffer.clear();
            self.buffer.extend(
                frame
                    .pixels()
                    .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
            );

            self.window
                .update_with_buffer(&self.buffer, w as usize, h as usize)
                .map_err(|e| EyedirError::display(e.to_string()))
        }

        fn stop_requested(&self) -> bool {
            !self.window.is_open() || self.window.is_key_down(minifb::Key::Escape)
        }
    }
}

/// Open the preview window
pub fn open_display(title: &str) -> Result<Box<dyn DisplaySink>> {
    #[cfg(feature = "display")]
    {
        Ok(Box::new(WindowDisplay::new(title, 640, 480)?))
    }
    #[cfg(not(feature = "display"))]
    {
        Err(EyedirError::display(format!(
            "cannot open window '{}': built without the `display` feature",
            title
        )))
    }
}
