use image::{RgbaImage, imageops};

use crate::render::palette::{Plan9, plan9};

/// A palette-indexed frame ready for the gif encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedFrame {
    pub width: u32,
    pub height: u32,
    /// One Plan9 index per pixel, row-major.
    pub indices: Vec<u8>,
    /// Display time in hundredths of a second.
    pub delay: u16,
}

impl IndexedFrame {
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.indices[(y * self.width + x) as usize]
    }

    /// Palette colour of the pixel at `(x, y)`.
    pub fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        plan9().color(self.index_at(x, y))
    }
}

/// Quantize a full-colour frame onto the shared Plan9 palette.
pub fn quantize(img: &RgbaImage, delay: u16) -> IndexedFrame {
    quantize_with(img, plan9(), delay)
}

pub fn quantize_with(img: &RgbaImage, palette: &Plan9, delay: u16) -> IndexedFrame {
    let indexed = imageops::index_colors(img, palette);
    let (width, height) = indexed.dimensions();
    IndexedFrame {
        width,
        height,
        indices: indexed.into_raw(),
        delay,
    }
}
