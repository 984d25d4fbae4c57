use image::{GenericImageView, GrayImage, SubImage, imageops};

use crate::models::Rect;

/// View of `image` restricted to `rect`.
///
/// The rectangle is expected to lie inside the image; anything outside is
/// clipped, so a degenerate rectangle yields an empty view.
pub fn extract<'a>(image: &'a GrayImage, rect: &Rect) -> SubImage<&'a GrayImage> {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height)
}

/// Apply the same rectangle to an image and its parallel mask
pub fn extract_pair<'a>(
    image: &'a GrayImage,
    mask: &'a GrayImage,
    rect: &Rect,
) -> (SubImage<&'a GrayImage>, SubImage<&'a GrayImage>) {
    (extract(image, rect), extract(mask, rect))
}

/// Eye sub-image with its optional slice of the frame-wide dark mask
pub struct EyeRegion<'a> {
    pub gray: SubImage<&'a GrayImage>,
    pub mask: Option<SubImage<&'a GrayImage>>,
}

impl<'a> EyeRegion<'a> {
    pub fn new(frame: &'a GrayImage, rect: &Rect) -> Self {
        Self {
            gray: extract(frame, rect),
            mask: None,
        }
    }

    pub fn with_mask(frame: &'a GrayImage, mask: &'a GrayImage, rect: &Rect) -> Self {
        let (gray, mask) = extract_pair(frame, mask, rect);
        Self {
            gray,
            mask: Some(mask),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        let (w, h) = self.dimensions();
        w == 0 || h == 0
    }

    /// Geometric center of the eye sub-image, floor-divided
    pub fn center(&self) -> (i32, i32) {
        let (w, h) = self.dimensions();
        crate::gaze::eye_center(w, h)
    }
}
