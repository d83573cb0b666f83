//! The fixed 256-colour Plan9 palette.
//!
//! Entries follow the Plan 9 colour map: a 4×4×4 RGB cube where each cell is split into four
//! luminance steps. Index 0 is black and index 255 is white.

use std::{collections::HashMap, sync::LazyLock};

use image::{Rgba, imageops::ColorMap};

pub const PALETTE_LEN: usize = 256;

static PLAN9: LazyLock<Plan9> = LazyLock::new(Plan9::build);

/// The process-wide palette. Built on first use, never mutated.
pub fn plan9() -> &'static Plan9 {
    &PLAN9
}

#[derive(Debug)]
pub struct Plan9 {
    colors: [[u8; 3]; PALETTE_LEN],
    exact: HashMap<[u8; 3], u8>,
}

impl Plan9 {
    fn build() -> Self {
        let mut colors = [[0u8; 3]; PALETTE_LEN];
        let mut i = 0usize;
        for r in 0..4i32 {
            for v in 0..4i32 {
                let mut j = v - r;
                for g in 0..4i32 {
                    for b in 0..4i32 {
                        let den = r.max(g).max(b);
                        let rgb = if den == 0 {
                            let c = 0x11 * v;
                            [c, c, c]
                        } else {
                            let num = 17 * (4 * den + v);
                            [r * num / den, g * num / den, b * num / den]
                        };
                        colors[i + (j & 0x0f) as usize] = rgb.map(|c| c as u8);
                        j += 1;
                    }
                }
                i += 16;
            }
        }

        let mut exact = HashMap::with_capacity(PALETTE_LEN);
        for (idx, rgb) in colors.iter().enumerate() {
            exact.entry(*rgb).or_insert(idx as u8);
        }
        Self { colors, exact }
    }

    pub fn colors(&self) -> &[[u8; 3]; PALETTE_LEN] {
        &self.colors
    }

    pub fn color(&self, idx: u8) -> [u8; 3] {
        self.colors[idx as usize]
    }

    /// Flat `r, g, b` bytes, the layout of a gif colour table.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    /// Index of the entry closest to `rgb` by squared distance; ties go to the lowest index.
    pub fn nearest(&self, rgb: [u8; 3]) -> u8 {
        if let Some(&idx) = self.exact.get(&rgb) {
            return idx;
        }
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (idx, c) in self.colors.iter().enumerate() {
            let dist: u32 = c
                .iter()
                .zip(rgb.iter())
                .map(|(&a, &b)| {
                    let d = u32::from(a.abs_diff(b));
                    d * d
                })
                .sum();
            if dist < best_dist {
                best = idx;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

impl ColorMap for Plan9 {
    type Color = Rgba<u8>;

    fn index_of(&self, color: &Rgba<u8>) -> usize {
        let [r, g, b, _] = color.0;
        self.nearest([r, g, b]) as usize
    }

    fn lookup(&self, index: usize) -> Option<Rgba<u8>> {
        self.colors.get(index).map(|&[r, g, b]| Rgba([r, g, b, 255]))
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgba<u8>) {
        let idx = self.index_of(color);
        if let Some(c) = self.lookup(idx) {
            *color = c;
        }
    }
}
