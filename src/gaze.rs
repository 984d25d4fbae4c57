//! Gaze vector and coarse direction from an eye center and a pupil estimate.

use crate::models::{GazeDirection, GazeVector, PupilEstimate};

/// Geometric center of a `width`×`height` eye region (floor division)
pub fn eye_center(width: u32, height: u32) -> (i32, i32) {
    ((width / 2) as i32, (height / 2) as i32)
}

/// `center - pupil`, or `None` when the pupil was not found
pub fn gaze_vector(center: (i32, i32), pupil: PupilEstimate) -> Option<GazeVector> {
    match pupil {
        PupilEstimate::Found { x, y } => Some(GazeVector::new(center.0 - x, center.1 - y)),
        PupilEstimate::NotFound => None,
    }
}

/// Dominant-axis classification; ties go to the vertical axis.
pub fn classify(vector: GazeVector) -> GazeDirection {
    if vector.x.abs() > vector.y.abs() {
        if vector.x > 0 {
            GazeDirection::Left
        } else {
            GazeDirection::Right
        }
    } else if vector.y > 0 {
        GazeDirection::Up
    } else {
        GazeDirection::Down
    }
}

pub fn estimate(center: (i32, i32), pupil: PupilEstimate) -> Option<(GazeVector, GazeDirection)> {
    gaze_vector(center, pupil).map(|v| (v, classify(v)))
}
