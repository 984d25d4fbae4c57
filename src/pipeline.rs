use image::{GrayImage, RgbImage};
use std::io::Write;
use std::path::PathBuf;

use crate::cursor::CursorDriver;
use crate::detection::moments::centroid;
use crate::detection::{Detector, EyeRegion, PupilLocalizer, find_first_eye, preprocessing};
use crate::error::{EyedirError, Result};
use crate::gaze;
use crate::models::{GazeOutput, PupilEstimate};
use crate::source::{DisplaySink, FrameSource};

/// Debug configuration for per-frame dumps
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(EyedirError::config(format!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    fn save(&self, frame_index: u64, eye: &GrayImage, blob: &GrayImage) -> Result<()> {
        if eye.width() == 0 || eye.height() == 0 {
            return Ok(());
        }
        eye.save(self.output_dir.join(format!("{:06}_eye.png", frame_index)))?;
        blob.save(self.output_dir.join(format!("{:06}_blob.png", frame_index)))?;
        Ok(())
    }
}

/// Per-frame gaze estimation driver.
///
/// Detectors are borrowed and never mutated. The only state carried between
/// frames is the cursor (when enabled) and the last valid pupil.
pub struct GazePipeline<'d> {
    faces: &'d dyn Detector,
    eyes: &'d dyn Detector,
    localizer: Box<dyn PupilLocalizer>,
    cursor: Option<CursorDriver>,
    track_pupil: bool,
    previous_pupil: PupilEstimate,
    debug: Option<DebugConfig>,
    frame_index: u64,
}

impl<'d> GazePipeline<'d> {
    pub fn new(
        faces: &'d dyn Detector,
        eyes: &'d dyn Detector,
        localizer: Box<dyn PupilLocalizer>,
    ) -> Self {
        Self {
            faces,
            eyes,
            localizer,
            cursor: None,
            track_pupil: false,
            previous_pupil: PupilEstimate::NotFound,
            debug: None,
            frame_index: 0,
        }
    }

    /// Drive the pointer from each frame's gaze vector
    pub fn with_cursor(mut self, cursor: CursorDriver) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Report the last valid pupil instead of `-1, -1` on failed frames
    pub fn with_pupil_tracking(mut self, enabled: bool) -> Self {
        self.track_pupil = enabled;
        self
    }

    /// Enable debug dumps into `output_dir`, which must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    pub fn cursor(&self) -> Option<&CursorDriver> {
        self.cursor.as_ref()
    }

    pub fn previous_pupil(&self) -> PupilEstimate {
        self.previous_pupil
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    pub fn localizer_name(&self) -> &str {
        self.localizer.name()
    }

    /// Run one color frame through the pipeline
    pub fn process_frame(&mut self, frame: &RgbImage) -> GazeOutput {
        let gray = preprocessing::to_grayscale(frame);
        self.process_gray(&gray)
    }

    /// Run one grayscale frame through the pipeline
    pub fn process_gray(&mut self, gray: &GrayImage) -> GazeOutput {
        self.frame_index += 1;

        let mask = self.localizer.prepare_frame(gray);

        let Some(hit) = find_first_eye(self.faces, self.eyes, gray) else {
            tracing::debug!(frame = self.frame_index, "No face with an eye");
            return self.lost();
        };

        let eye = match &mask {
            Some(mask) => EyeRegion::with_mask(gray, mask, &hit.eye),
            None => EyeRegion::new(gray, &hit.eye),
        };

        let pupil = self.localize(&eye);

        let Some((vector, direction)) = gaze::estimate(eye.center(), pupil) else {
            tracing::debug!(frame = self.frame_index, eye = ?hit.eye, "Pupil not found");
            return self.lost();
        };

        self.previous_pupil = pupil;

        if let Some(cursor) = self.cursor.as_mut() {
            let moved = cursor.apply(vector);
            tracing::trace!(?vector, ?moved, "Cursor update");
        }

        let (x, y) = pupil.coords();
        tracing::debug!(
            frame = self.frame_index,
            x,
            y,
            ?direction,
            "Gaze estimated"
        );
        GazeOutput::found(x, y, direction)
    }

    fn localize(&self, eye: &EyeRegion<'_>) -> PupilEstimate {
        let Some(debug) = &self.debug else {
            return self.localizer.locate(eye);
        };

        let blob = self.localizer.binarize(eye);
        if let Err(e) = debug.save(self.frame_index, &eye.gray.to_image(), &blob) {
            tracing::warn!(error = %e, "Failed to save debug images");
        }
        centroid(&blob)
    }

    fn lost(&self) -> GazeOutput {
        if self.track_pupil {
            GazeOutput::lost(self.previous_pupil)
        } else {
            GazeOutput::sentinel()
        }
    }
}

/// Write one result in the `OUTPUT:` log format
pub fn write_output<W: Write>(out: &mut W, output: &GazeOutput) -> std::io::Result<()> {
    write!(out, "OUTPUT:\n  {}\n", output)?;
    out.flush()
}

/// Pull frames until the source ends or the display asks to stop.
///
/// A frame during which a stop is requested is not reported. Returns the
/// number of frames reported.
pub fn run_loop<S, D, W>(
    source: &mut S,
    pipeline: &mut GazePipeline<'_>,
    mut display: Option<&mut D>,
    out: &mut W,
) -> Result<u64>
where
    S: FrameSource + ?Sized,
    D: DisplaySink + ?Sized,
    W: Write,
{
    let mut reported = 0;

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!("Frame source exhausted");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Frame read failed, stopping");
                break;
            }
        };

        if frame.width() == 0 || frame.height() == 0 {
            tracing::warn!("No captured frame, stopping");
            break;
        }

        let output = pipeline.process_frame(&frame);

        if let Some(display) = display.as_deref_mut() {
            if let Err(e) = display.show(&frame) {
                tracing::warn!(error = %e, "Display update failed");
            }
            if display.stop_requested() {
                tracing::info!("Stop requested");
                break;
            }
        }

        write_output(out, &output)?;
        reported += 1;
    }

    Ok(reported)
}
