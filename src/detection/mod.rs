pub mod preprocessing;
pub mod moments;
pub mod region;
pub mod pupil;
pub mod template;

use image::GrayImage;
use std::path::Path;

use crate::config::DetectorConfig;
use crate::error::Result;
use crate::models::Rect;

pub use pupil::{GradientLocalizer, MaskedThresholdLocalizer, PupilLocalizer, build_localizer};
pub use region::EyeRegion;
pub use template::TemplateDetector;

/// Object detector returning candidate regions in the input image's coordinates.
///
/// The order of the returned rectangles is meaningful: callers take the first
/// usable one.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &GrayImage) -> Vec<Rect>;
}

/// The first face that yields an eye, with the eye in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceEyeHit {
    pub face: Rect,
    pub eye: Rect,
}

/// Walk faces in detector order and stop at the first one containing an eye.
///
/// Only the first eye of that face is kept; later eyes and faces are never
/// looked at.
pub fn find_first_eye(
    faces: &dyn Detector,
    eyes: &dyn Detector,
    gray: &GrayImage,
) -> Option<FaceEyeHit> {
    let face_rects = faces.detect(gray);
    tracing::debug!(faces = face_rects.len(), "Face search");

    face_rects.into_iter().find_map(|face| {
        let face_img = region::extract(gray, &face).to_image();
        let eye_rects = eyes.detect(&face_img);
        tracing::debug!(?face, eyes = eye_rects.len(), "Eye search");

        eye_rects.into_iter().next().map(|eye| FaceEyeHit {
            face,
            eye: eye.offset(&face),
        })
    })
}

/// Load the face and eye detectors named in the configuration.
///
/// Either model failing to load is an error; there is no degraded mode.
pub fn load_detectors(config: &DetectorConfig) -> Result<(TemplateDetector, TemplateDetector)> {
    let faces = load_one("face", &config.face_model, config, config.max_faces)?;
    let eyes = load_one("eye", &config.eye_model, config, config.max_eyes)?;
    Ok((faces, eyes))
}

fn load_one(
    name: &str,
    path: &Path,
    config: &DetectorConfig,
    max: usize,
) -> Result<TemplateDetector> {
    Ok(TemplateDetector::load(name, path)?
        .with_threshold(config.match_threshold)
        .with_overlap_threshold(config.overlap_threshold)
        .with_max_detections(max))
}
