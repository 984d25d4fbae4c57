use image::GrayImage;

use crate::config::{LocalizerConfig, LocalizerStrategy};
use crate::detection::moments::centroid;
use crate::detection::preprocessing::{self, Polarity, StructuringElement};
use crate::detection::region::EyeRegion;
use crate::models::PupilEstimate;

/// Maps an eye region to a pupil center in eye-local coordinates
pub trait PupilLocalizer: Send + Sync {
    /// Binary image whose foreground centroid is the pupil.
    /// Must return an image of the eye's dimensions, empty when the eye is empty.
    fn binarize(&self, eye: &EyeRegion<'_>) -> GrayImage;

    /// Frame-wide preprocessing computed once per frame, sliced per eye
    fn prepare_frame(&self, _gray: &GrayImage) -> Option<GrayImage> {
        None
    }

    fn locate(&self, eye: &EyeRegion<'_>) -> PupilEstimate {
        centroid(&self.binarize(eye))
    }

    /// Human-readable name for logs
    fn name(&self) -> &str;
}

/// Centroid of the dark-color region inside the eye
pub struct MaskedThresholdLocalizer {
    pub dark_lower: [u8; 3],
    pub dark_upper: [u8; 3],
    pub block_size: u32,
    pub offset: i32,
    pub element: StructuringElement,
}

impl MaskedThresholdLocalizer {
    pub fn from_config(config: &LocalizerConfig) -> Self {
        Self {
            dark_lower: config.dark_lower,
            dark_upper: config.dark_upper,
            block_size: config.masked_block_size,
            offset: config.masked_offset,
            element: StructuringElement::ellipse(config.morph_kernel_size),
        }
    }
}

impl Default for MaskedThresholdLocalizer {
    fn default() -> Self {
        Self::from_config(&LocalizerConfig::default())
    }
}

impl PupilLocalizer for MaskedThresholdLocalizer {
    fn binarize(&self, eye: &EyeRegion<'_>) -> GrayImage {
        let (w, h) = eye.dimensions();
        if eye.is_empty() {
            return GrayImage::new(w, h);
        }

        // Without the frame-wide mask, the per-pixel band filter gives the same slice
        let mask = match &eye.mask {
            Some(mask) => mask.to_image(),
            None => preprocessing::dark_mask(&eye.gray.to_image(), self.dark_lower, self.dark_upper),
        };

        let bw = preprocessing::adaptive_threshold_mean(
            &mask,
            self.block_size,
            self.offset,
            Polarity::BinaryInv,
        );
        preprocessing::open(&bw, &self.element)
    }

    fn prepare_frame(&self, gray: &GrayImage) -> Option<GrayImage> {
        Some(preprocessing::dark_mask(gray, self.dark_lower, self.dark_upper))
    }

    fn name(&self) -> &str {
        "Masked Threshold"
    }
}

/// Centroid of the low-edge-energy region around the pupil boundary
pub struct GradientLocalizer {
    pub median_kernel_size: u32,
    pub block_size: u32,
    pub offset: i32,
}

impl GradientLocalizer {
    pub fn from_config(config: &LocalizerConfig) -> Self {
        Self {
            median_kernel_size: config.median_kernel_size,
            block_size: config.gradient_block_size,
            offset: config.gradient_offset,
        }
    }
}

impl Default for GradientLocalizer {
    fn default() -> Self {
        Self::from_config(&LocalizerConfig::default())
    }
}

impl PupilLocalizer for GradientLocalizer {
    fn binarize(&self, eye: &EyeRegion<'_>) -> GrayImage {
        let (w, h) = eye.dimensions();
        if eye.is_empty() {
            return GrayImage::new(w, h);
        }

        let blurred = preprocessing::median_blur(&eye.gray.to_image(), self.median_kernel_size);
        let edges = preprocessing::gradient_magnitude(&blurred);
        let inverted = preprocessing::invert(&edges);
        preprocessing::adaptive_threshold_mean(&inverted, self.block_size, self.offset, Polarity::Binary)
    }

    fn name(&self) -> &str {
        "Gradient Magnitude"
    }
}

/// Build the localizer selected by configuration
pub fn build_localizer(config: &LocalizerConfig) -> Box<dyn PupilLocalizer> {
    match config.strategy {
        LocalizerStrategy::Masked => Box::new(MaskedThresholdLocalizer::from_config(config)),
        LocalizerStrategy::Gradient => Box::new(GradientLocalizer::from_config(config)),
    }
}
