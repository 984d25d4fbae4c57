use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use std::path::Path;

use crate::config::DetectorConfig;
use crate::detection::Detector;
use crate::error::{EyedirError, Result};
use crate::models::Rect;

/// Detector that slides a grayscale template over the image and keeps
/// normalized cross-correlation peaks.
///
/// Results are ordered by descending score; ties keep row-major order.
pub struct TemplateDetector {
    name: String,
    template: GrayImage,
    pub threshold: f32,
    pub overlap_threshold: f32,
    pub max_detections: usize,
}

impl TemplateDetector {
    pub fn new(name: impl Into<String>, template: GrayImage) -> Self {
        let defaults = DetectorConfig::default();
        Self {
            name: name.into(),
            template,
            threshold: defaults.match_threshold,
            overlap_threshold: defaults.overlap_threshold,
            max_detections: usize::MAX,
        }
    }

    /// Load a template model from disk
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EyedirError::model_load(path, "file not found"));
        }

        let template = image::open(path)
            .map_err(|e| EyedirError::model_load(path, e.to_string()))?
            .to_luma8();

        if template.width() == 0 || template.height() == 0 {
            return Err(EyedirError::model_load(path, "template is empty"));
        }

        let detector = Self::new(name, template);
        tracing::info!(
            detector = %detector.name,
            path = %path.display(),
            width = detector.template.width(),
            height = detector.template.height(),
            "Loaded detector model"
        );
        Ok(detector)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_overlap_threshold(mut self, overlap: f32) -> Self {
        self.overlap_threshold = overlap;
        self
    }

    pub fn with_max_detections(mut self, max: usize) -> Self {
        self.max_detections = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_size(&self) -> (u32, u32) {
        self.template.dimensions()
    }
}

impl Detector for TemplateDetector {
    fn detect(&self, image: &GrayImage) -> Vec<Rect> {
        let (iw, ih) = image.dimensions();
        let (tw, th) = self.template.dimensions();
        if iw < tw || ih < th || self.max_detections == 0 {
            return Vec::new();
        }

        let scores = match_template(
            image,
            &self.template,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );

        let mut candidates: Vec<(f32, u32, u32)> = scores
            .enumerate_pixels()
            .filter(|(_, _, s)| s[0].is_finite() && s[0] >= self.threshold)
            .map(|(x, y, s)| (s[0], x, y))
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut accepted: Vec<Rect> = Vec::new();
        for (_, x, y) in candidates {
            if accepted.len() >= self.max_detections {
                break;
            }
            let rect = Rect::new(x, y, tw, th);
            if accepted.iter().all(|a| a.iou(&rect) <= self.overlap_threshold) {
                accepted.push(rect);
            }
        }

        tracing::trace!(detector = %self.name, count = accepted.len(), "Template detections");
        accepted
    }
}
