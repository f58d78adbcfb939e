use std::fmt::Debug;
use std::time::Duration;

use crate::{Frame, PIXEL_BYTES};

/// An RGBA8 color, `[r, g, b, a]`
pub type Rgba = [u8; 4];

pub(crate) const OPAQUE_BLACK: Rgba = [0, 0, 0, 255];

/// A rectangular region within a [`Canvas`], in pixels
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Returns the part of this region that lies inside a `width` x `height` canvas
    pub(crate) fn clip(&self, width: u32, height: u32) -> Rect {
        let left = self.left.min(width);
        let top = self.top.min(height);
        let right = self.left.saturating_add(self.width).min(width);
        let bottom = self.top.saturating_add(self.height).min(height);

        Rect::new(left, top, right - left, bottom - top)
    }
}

/// The logical screen of an animation: a fixed-size RGBA8 buffer holding what is
/// currently visible
///
/// Pixels are stored row-major with no padding, so [`Canvas::data`] is always
/// `width * height * 4` bytes. A canvas is allocated once when the animation is
/// loaded and is updated in place by every `advance` call of the owning decoder.
///
/// To hand the current picture to another thread, take a [`Canvas::snapshot`]
/// instead of holding on to the borrowed data.
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * PIXEL_BYTES],
        }
    }

    /// Get dimensions of the canvas (`width`, `height`)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get canvas data, size `width` * `height` * 4, RGBA pixels
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a single pixel, `None` when (`x`, `y`) lies outside of the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = self.offset(x, y);
        let mut color = [0; PIXEL_BYTES];
        color.copy_from_slice(&self.data[offset..offset + PIXEL_BYTES]);
        Some(color)
    }

    /// Take an owned copy of the current canvas
    pub fn snapshot(&self, index: usize, delay: Duration) -> Frame {
        Frame::new_from_canvas(index, delay, self.data.clone(), self.dimensions())
    }

    pub(crate) fn fill(&mut self, color: Rgba) {
        for pixel in self.data.chunks_exact_mut(PIXEL_BYTES) {
            pixel.copy_from_slice(&color);
        }
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let rect = rect.clip(self.width, self.height);

        for y in rect.top..rect.top + rect.height {
            let start = self.offset(rect.left, y);
            let end = start + rect.width as usize * PIXEL_BYTES;
            for pixel in self.data[start..end].chunks_exact_mut(PIXEL_BYTES) {
                pixel.copy_from_slice(&color);
            }
        }
    }

    /// Caller guarantees (`x`, `y`) lies inside the canvas
    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let offset = self.offset(x, y);
        self.data[offset..offset + PIXEL_BYTES].copy_from_slice(&color);
    }

    /// Replace the whole canvas with `data`. Returns false (and leaves the canvas
    /// untouched) when the length does not match
    pub(crate) fn copy_from(&mut self, data: &[u8]) -> bool {
        if data.len() != self.data.len() {
            return false;
        }

        self.data.copy_from_slice(data);
        true
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * PIXEL_BYTES
    }
}

impl Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Canvas {{ w: {}, h: {}, data: {}b }}",
            self.width,
            self.height,
            self.data.len()
        )
    }
}
