use eyedir::{Detector, EyedirError, PointerBackend, Rect};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Background brightness of synthetic frames, well outside the dark band
pub const BACKGROUND: u8 = 200;

/// Creates a uniform color frame
pub fn uniform_frame(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Paints a filled square of side `2 * half + 1` centered at `(cx, cy)`
pub fn paint_square(frame: &mut RgbImage, cx: u32, cy: u32, half: u32, value: u8) {
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            frame.put_pixel(x, y, Rgb([value, value, value]));
        }
    }
}

/// Binary mask with a filled square of side `2 * half + 1` centered at `(cx, cy)`
pub fn square_mask(width: u32, height: u32, cx: u32, cy: u32, half: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Deterministic textured image so template matches are unambiguous
pub fn textured_image(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([((x * 37 + y * 91 + x * y * 13) % 251) as u8])
    })
}

/// Detector returning scripted rectangles for every call, counting the calls
pub struct ScriptedDetector {
    rects: Vec<Rect>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(rects: Vec<Rect>) -> Self {
        Self {
            rects,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for ScriptedDetector {
    fn detect(&self, _image: &GrayImage) -> Vec<Rect> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rects.clone()
    }
}

/// Eye detector answering per face call, in call order; calls past the script find nothing
pub struct SequencedDetector {
    answers: Vec<Vec<Rect>>,
    calls: AtomicUsize,
}

impl SequencedDetector {
    pub fn new(answers: Vec<Vec<Rect>>) -> Self {
        Self {
            answers,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for SequencedDetector {
    fn detect(&self, _image: &GrayImage) -> Vec<Rect> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.get(call).cloned().unwrap_or_default()
    }
}

/// Pointer backend recording every move it is asked to perform
#[derive(Clone, Default)]
pub struct RecordingPointer {
    pub moves: Arc<Mutex<Vec<(i32, i32)>>>,
}

impl RecordingPointer {
    pub fn moves(&self) -> Vec<(i32, i32)> {
        self.moves.lock().unwrap().clone()
    }
}

impl PointerBackend for RecordingPointer {
    fn move_to(&mut self, x: i32, y: i32) -> eyedir::Result<()> {
        self.moves.lock().unwrap().push((x, y));
        Ok(())
    }
}

/// Pointer backend that always fails
pub struct BrokenPointer;

impl PointerBackend for BrokenPointer {
    fn move_to(&mut self, _x: i32, _y: i32) -> eyedir::Result<()> {
        Err(EyedirError::pointer("no display"))
    }
}

/// Standard scene: 64x48 frame, one face at (10, 5) 40x36, one 20x20 eye at
/// face-local (8, 6), so the eye starts at frame (18, 11).
pub const FACE: Rect = Rect {
    x: 10,
    y: 5,
    width: 40,
    height: 36,
};
pub const EYE_IN_FACE: Rect = Rect {
    x: 8,
    y: 6,
    width: 20,
    height: 20,
};

/// Frame with a dark 3x3 pupil at eye-local `(px, py)` of the standard scene
pub fn scene_with_pupil(px: u32, py: u32) -> RgbImage {
    let mut frame = uniform_frame(64, 48, BACKGROUND);
    let eye_x = FACE.x + EYE_IN_FACE.x;
    let eye_y = FACE.y + EYE_IN_FACE.y;
    paint_square(&mut frame, eye_x + px, eye_y + py, 1, 0);
    frame
}
