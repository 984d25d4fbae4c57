use image::GrayImage;

use crate::models::PupilEstimate;

/// Zeroth and first-order spatial moments of a binary image.
///
/// Every non-zero pixel counts with weight one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn of_binary(image: &GrayImage) -> Self {
        let mut m = Moments::default();
        for (x, y, px) in image.enumerate_pixels() {
            if px[0] != 0 {
                m.m00 += 1.0;
                m.m10 += x as f64;
                m.m01 += y as f64;
            }
        }
        m
    }

    /// Center of mass `(M10/M00, M01/M00)`, or `None` for an empty blob
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Centroid of the foreground blob, rounded to the nearest pixel
pub fn centroid(blob: &GrayImage) -> PupilEstimate {
    match Moments::of_binary(blob).center() {
        Some((cx, cy)) => PupilEstimate::new(
            cx.round_ties_even() as i32,
            cy.round_ties_even() as i32,
        ),
        None => PupilEstimate::NotFound,
    }
}
