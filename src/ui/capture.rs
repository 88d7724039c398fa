use thiserror::Error;

use crate::model::{Point, Size, WindowModel};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("window {0} could not be captured: {1}")]
    Failed(crate::model::Wid, String),
    #[error("screen capture is not available")]
    Unavailable,
}

/// RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bitmap({}x{})", self.width, self.height)
    }
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn blank(size: Size) -> Bitmap {
        let width = size.w.max(0) as usize;
        let height = size.h.max(0) as usize;
        Bitmap {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Option<Bitmap> {
        (pixels.len() == width * height * 4).then_some(Bitmap { width, height, pixels })
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Separable box blur of the given radius. Edges are clamped.
    pub fn blurred(&self, radius: u32) -> Bitmap {
        if radius == 0 || self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let r = radius as usize;
        let horizontal = box_pass(&self.pixels, self.width, self.height, r, true);
        let pixels = box_pass(&horizontal, self.width, self.height, r, false);
        Bitmap {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

fn box_pass(src: &[u8], width: usize, height: usize, r: usize, horizontal: bool) -> Vec<u8> {
    let mut out = vec![0u8; src.len()];
    let (lines, len) = if horizontal { (height, width) } else { (width, height) };
    let at = |line: usize, i: usize| {
        if horizontal { (line * width + i) * 4 } else { (i * width + line) * 4 }
    };
    let window = (2 * r + 1) as u32;

    for line in 0..lines {
        for c in 0..4 {
            let sample = |i: isize| src[at(line, i.clamp(0, len as isize - 1) as usize) + c] as u32;
            let mut sum: u32 = (-(r as isize)..=r as isize).map(sample).sum();
            for i in 0..len {
                out[at(line, i) + c] = (sum / window) as u8;
                sum += sample(i as isize + r as isize + 1);
                sum -= sample(i as isize - r as isize);
            }
        }
    }
    out
}

/// A screenshot of a window and where it sits relative to the window's
/// reported origin. The offset covers decorations the capture left out.
#[derive(Debug, Clone)]
pub struct Capture {
    pub bitmap: Bitmap,
    pub offset: Point,
}

/// Produces the backdrop shown behind the overlay.
pub trait ScreenCapture {
    fn grab(&mut self, model: &WindowModel) -> Result<Capture, CaptureError>;
}

impl<T: ScreenCapture + ?Sized> ScreenCapture for Box<T> {
    fn grab(&mut self, model: &WindowModel) -> Result<Capture, CaptureError> { (**self).grab(model) }
}

/// Capture service for hosts without screenshot support: every grab fails
/// and the caller falls back to a blank backdrop.
#[derive(Debug, Default)]
pub struct NoCapture;

impl ScreenCapture for NoCapture {
    fn grab(&mut self, _model: &WindowModel) -> Result<Capture, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}
