use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::filter::{box_filter, median_filter};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::{Mask, grayscale_open};

/// Foreground value of every binary image produced here
pub const FOREGROUND: u8 = 255;

/// Convert a color frame to single-channel intensity (Rec. 709 luma weights)
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Convert one RGB sample to 8-bit HSV (H in 0..=180, S and V in 0..=255)
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let s = if max == 0.0 { 0.0 } else { 255.0 * diff / max };

    let h = if diff == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / diff
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [
        (h / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        max as u8,
    ]
}

/// Binary mask of pixels whose HSV value lies inside `[lower, upper]` on every channel.
///
/// The gray frame is expanded to three equal channels first, so hue and
/// saturation are zero and the band effectively filters on brightness.
pub fn dark_mask(gray: &GrayImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        let hsv = rgb_to_hsv(v, v, v);
        let inside = (0..3).all(|c| hsv[c] >= lower[c] && hsv[c] <= upper[c]);
        Luma([if inside { FOREGROUND } else { 0 }])
    })
}

/// Output polarity of [`adaptive_threshold_mean`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Foreground where the pixel is above the local mean minus the offset
    Binary,
    /// Foreground where the pixel is at or below the local mean minus the offset
    BinaryInv,
}

/// Local-mean adaptive threshold.
///
/// The mean is taken over a `block_size` square with replicated edges. A
/// pixel counts as "above" when `src - mean > -offset`.
pub fn adaptive_threshold_mean(
    image: &GrayImage,
    block_size: u32,
    offset: i32,
    polarity: Polarity,
) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let radius = block_size / 2;
    let mean = box_filter(image, radius, radius);

    ImageBuffer::from_fn(width, height, |x, y| {
        let diff = image.get_pixel(x, y)[0] as i32 - mean.get_pixel(x, y)[0] as i32;
        let above = diff > -offset;
        let on = match polarity {
            Polarity::Binary => above,
            Polarity::BinaryInv => !above,
        };
        Luma([if on { FOREGROUND } else { 0 }])
    })
}

/// Largest structuring element side accepted by [`StructuringElement::ellipse`]
pub const MAX_ELEMENT_SIZE: u32 = 511;

/// Binary structuring element anchored at its center
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    shape: GrayImage,
    mask: Mask,
}

impl StructuringElement {
    /// Ellipse inscribed in a `size`×`size` box, rows rounded like OpenCV's
    /// `MORPH_ELLIPSE` (17 cells at size 5, where a Euclidean disk has 13)
    pub fn ellipse(size: u32) -> Self {
        let size = size.clamp(1, MAX_ELEMENT_SIZE);
        let r = (size / 2) as i32;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut shape = GrayImage::new(size, size);
        for row in 0..size as i32 {
            let dy = row - r;
            let half = if r > 0 {
                (r as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32
            } else {
                r
            };
            for col in (r - half).max(0)..(r + half + 1).min(size as i32) {
                shape.put_pixel(col as u32, row as u32, Luma([FOREGROUND]));
            }
        }

        let mask = Mask::from_image(&shape, r as u8, r as u8);
        Self { shape, mask }
    }

    /// `(dx, dy)` offsets of the element's cells from the anchor, row-major
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        let r = (self.shape.width() / 2) as i32;
        self.shape
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x as i32 - r, y as i32 - r))
            .collect()
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        let r = (self.shape.width() / 2) as i32;
        let (x, y) = (dx + r, dy + r);
        x >= 0
            && y >= 0
            && (x as u32) < self.shape.width()
            && (y as u32) < self.shape.height()
            && self.shape.get_pixel(x as u32, y as u32)[0] != 0
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }
}

/// Morphological opening (erosion followed by dilation) to drop speckle noise.
/// Pixels outside the image never take part in either pass.
pub fn open(image: &GrayImage, element: &StructuringElement) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    grayscale_open(image, element.mask())
}

/// Median blur with a square `kernel_size` window
pub fn median_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let radius = kernel_size / 2;
    median_filter(image, radius, radius)
}

/// Equal-weighted sum of the saturated absolute Sobel gradients along both axes
pub fn gradient_magnitude(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);

    ImageBuffer::from_fn(width, height, |x, y| {
        let ax = gx.get_pixel(x, y)[0].unsigned_abs().min(255) as f32;
        let ay = gy.get_pixel(x, y)[0].unsigned_abs().min(255) as f32;
        Luma([(0.5 * ax + 0.5 * ay).round_ties_even().min(255.0) as u8])
    })
}

pub fn invert(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    image::imageops::invert(&mut out);
    out
}
