use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel used in every output field that could not be computed.
pub const SENTINEL: i32 = -1;

/// Axis-aligned rectangle in a parent image's coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Translate a rectangle detected inside a region back into the region's parent space
    pub fn offset(&self, origin: &Rect) -> Rect {
        Rect {
            x: self.x + origin.x,
            y: self.y + origin.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Intersection over union, 0.0 when either rectangle is empty
    pub fn iou(&self, other: &Rect) -> f32 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        if right <= left || bottom <= top {
            return 0.0;
        }

        let inter = (right - left) * (bottom - top);
        let union = self.area() + other.area() - inter;
        if union == 0 {
            return 0.0;
        }
        inter as f32 / union as f32
    }
}

/// Pupil center in the eye region's local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PupilEstimate {
    Found { x: i32, y: i32 },
    #[default]
    NotFound,
}

impl PupilEstimate {
    pub fn new(x: i32, y: i32) -> Self {
        PupilEstimate::Found { x, y }
    }

    /// Coordinates with the sentinel substituted for a missing pupil
    pub fn coords(&self) -> (i32, i32) {
        match *self {
            PupilEstimate::Found { x, y } => (x, y),
            PupilEstimate::NotFound => (SENTINEL, SENTINEL),
        }
    }
}

/// Signed displacement from the pupil to the eye center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GazeVector {
    pub x: i32,
    pub y: i32,
}

impl GazeVector {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeDirection {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl GazeDirection {
    /// Numeric code written to the output log
    pub fn code(&self) -> i32 {
        match self {
            GazeDirection::Up => 1,
            GazeDirection::Down => 2,
            GazeDirection::Left => 3,
            GazeDirection::Right => 4,
            GazeDirection::None => SENTINEL,
        }
    }
}

/// Per-frame result triple `(pupil.x, pupil.y, direction)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazeOutput {
    pub x: i32,
    pub y: i32,
    pub direction: i32,
}

impl GazeOutput {
    pub fn sentinel() -> Self {
        Self {
            x: SENTINEL,
            y: SENTINEL,
            direction: SENTINEL,
        }
    }

    /// Failure triple carrying a remembered pupil position
    pub fn lost(previous: PupilEstimate) -> Self {
        let (x, y) = previous.coords();
        Self {
            x,
            y,
            direction: SENTINEL,
        }
    }

    pub fn found(x: i32, y: i32, direction: GazeDirection) -> Self {
        Self {
            x,
            y,
            direction: direction.code(),
        }
    }

    pub fn as_array(&self) -> [i32; 3] {
        [self.x, self.y, self.direction]
    }
}

impl fmt::Display for GazeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.direction)
    }
}
