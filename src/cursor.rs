//! Gaze-driven cursor: velocity accumulation, screen clamping, pointer backend.

use std::process::Command;

use crate::error::{EyedirError, Result};
use crate::models::GazeVector;

/// Moves the system pointer to absolute screen coordinates
pub trait PointerBackend {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
}

/// Pointer backend driving `xdotool mousemove`
pub struct XdotoolPointer;

impl XdotoolPointer {
    /// Check that xdotool is runnable before the first move is needed
    pub fn connect() -> Result<Self> {
        let status = Command::new("xdotool")
            .arg("version")
            .output()
            .map_err(|e| EyedirError::pointer(format!("failed to execute xdotool: {}", e)))?;

        if !status.status.success() {
            return Err(EyedirError::pointer("xdotool is not usable on this display"));
        }
        Ok(Self)
    }
}

impl PointerBackend for XdotoolPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let status = Command::new("xdotool")
            .args(["mousemove", &x.to_string(), &y.to_string()])
            .status()
            .map_err(|e| EyedirError::pointer(format!("failed to execute xdotool: {}", e)))?;

        if !status.success() {
            return Err(EyedirError::pointer(format!("xdotool exited with {}", status)));
        }
        Ok(())
    }
}

/// Query the screen size from `xdpyinfo`
pub fn query_screen_size() -> Result<(u32, u32)> {
    let output = Command::new("xdpyinfo")
        .output()
        .map_err(|e| EyedirError::display(format!("failed to execute xdpyinfo: {}", e)))?;

    if !output.status.success() {
        return Err(EyedirError::display("xdpyinfo could not open the display"));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    parse_xdpyinfo_dimensions(&text)
        .ok_or_else(|| EyedirError::display("no screen dimensions in xdpyinfo output"))
}

/// Extract `WxH` from the first `dimensions:` line of xdpyinfo output
pub fn parse_xdpyinfo_dimensions(text: &str) -> Option<(u32, u32)> {
    let line = text.lines().find(|l| l.trim_start().starts_with("dimensions:"))?;
    let dims = line.split_whitespace().nth(1)?;
    let (w, h) = dims.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Persistent cursor position nudged by every gaze reading.
///
/// When an update leaves the screen, the position is clamped and no move is
/// emitted for that frame. The clamped position then becomes the base for
/// the next update, so the internal state can drift away from where the
/// physical pointer was last placed while it stays pinned to an edge.
#[derive(Debug, Clone)]
pub struct CursorIntegrator {
    x: i32,
    y: i32,
    gain: i32,
    screen_width: u32,
    screen_height: u32,
}

impl CursorIntegrator {
    pub const DEFAULT_GAIN: i32 = 10;

    /// Start at the screen origin
    pub fn new(screen_width: u32, screen_height: u32, gain: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            gain,
            screen_width,
            screen_height,
        }
    }

    pub fn starting_at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Accumulate one gaze reading. Returns the absolute move to perform,
    /// or `None` when the update was absorbed by the screen clamp.
    pub fn integrate(&mut self, vector: GazeVector) -> Option<(i32, i32)> {
        self.x = self.x.saturating_add(vector.x.saturating_mul(self.gain));
        self.y = self.y.saturating_add(vector.y.saturating_mul(self.gain));

        let max_x = self.screen_width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = self.screen_height.saturating_sub(1).min(i32::MAX as u32) as i32;

        if self.x < 0 || self.x > max_x || self.y < 0 || self.y > max_y {
            self.x = self.x.clamp(0, max_x);
            self.y = self.y.clamp(0, max_y);
            tracing::trace!(x = self.x, y = self.y, "Cursor clamped, move suppressed");
            return None;
        }

        Some((self.x, self.y))
    }
}

/// Integrator paired with the backend that performs its moves
pub struct CursorDriver {
    integrator: CursorIntegrator,
    backend: Box<dyn PointerBackend>,
}

impl CursorDriver {
    pub fn new(integrator: CursorIntegrator, backend: Box<dyn PointerBackend>) -> Self {
        Self {
            integrator,
            backend,
        }
    }

    pub fn integrator(&self) -> &CursorIntegrator {
        &self.integrator
    }

    /// Integrate and, unless suppressed, move the pointer.
    ///
    /// Backend failures are logged; they never interrupt the frame loop.
    pub fn apply(&mut self, vector: GazeVector) -> Option<(i32, i32)> {
        let target = self.integrator.integrate(vector)?;
        if let Err(e) = self.backend.move_to(target.0, target.1) {
            tracing::warn!(error = %e, "Pointer move failed");
        }
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_xdpyinfo_dimensions() {
        let text = "screen #0:\n  dimensions:    1920x1080 pixels (508x285 millimeters)\n";
        assert_eq!(parse_xdpyinfo_dimensions(text), Some((1920, 1080)));
    }

    #[test]
    fn rejects_output_without_dimensions() {
        assert_eq!(parse_xdpyinfo_dimensions("name of display:    :0\n"), None);
        assert_eq!(parse_xdpyinfo_dimensions("  dimensions:    garbage\n"), None);
    }
}
