// ============================================================================
// PIXELATE — average n×n blocks into flat cells
// ============================================================================

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::buffer::check_len;

pub const EFFECT_ID: &str = "pixelate";

/// Partition the buffer into non-overlapping `block_size × block_size` cells
/// (edge cells clipped to the buffer), average every channel — alpha included
/// — over each cell, and write the average back to the whole cell.
/// `block_size <= 1` is a no-op.
#[derive(Clone, Serialize, Deserialize)]
pub struct Pixelate {
    pub enabled: bool,
    pub block_size: u32,
}

impl Default for Pixelate {
    fn default() -> Self {
        Self {
            enabled: true,
            block_size: 4,
        }
    }
}

/// Pure pixelate pass. Block averages use truncating integer division.
pub fn pixelate_core(pixels: &mut [u8], width: u32, height: u32, block_size: u32) {
    check_len(pixels, width, height);
    if block_size <= 1 || width == 0 || height == 0 {
        return;
    }

    let w = width as usize;
    let h = height as usize;
    let bs = block_size as usize;
    let stride = w * 4;

    for by in (0..h).step_by(bs) {
        let y_end = (by + bs).min(h);
        for bx in (0..w).step_by(bs) {
            let x_end = (bx + bs).min(w);
            let count = ((y_end - by) * (x_end - bx)) as u32;

            let mut sums = [0u32; 4];
            for y in by..y_end {
                let row = y * stride;
                for x in bx..x_end {
                    let pi = row + x * 4;
                    for c in 0..4 {
                        sums[c] += pixels[pi + c] as u32;
                    }
                }
            }

            let avg = [
                (sums[0] / count) as u8,
                (sums[1] / count) as u8,
                (sums[2] / count) as u8,
                (sums[3] / count) as u8,
            ];
            for y in by..y_end {
                let row = y * stride;
                for x in bx..x_end {
                    let pi = row + x * 4;
                    pixels[pi..pi + 4].copy_from_slice(&avg);
                }
            }
        }
    }
}

impl Effect for Pixelate {
    fn id(&self) -> &'static str {
        EFFECT_ID
    }

    fn display_name(&self) -> &'static str {
        "Pixelate"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn apply(&self, pixels: &mut [u8], width: u32, height: u32) {
        if !self.enabled {
            return;
        }
        pixelate_core(pixels, width, height, self.block_size);
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![("block_size".into(), self.block_size.to_string())]
    }

    fn set_param(&mut self, key: &str, value: &str) -> bool {
        match key {
            "block_size" => match value.parse() {
                Ok(v) => {
                    self.block_size = v;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }
}
