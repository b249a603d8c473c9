// ============================================================================
// OUTLINE — dilate the opaque silhouette with a solid color
// ============================================================================

use serde::{Deserialize, Serialize};

use super::{Effect, format_color, parse_color};
use crate::buffer::check_len;
use crate::color;

pub const EFFECT_ID: &str = "outline";

/// Grow the visible silhouette (alpha > 0) by up to `thickness` pixels of
/// 4-neighbour dilation, painting the grown ring with `color`.
///
/// Each iteration paints pixels adjacent to the current silhouette that are
/// not yet fully opaque; painted pixels join the silhouette for the next
/// iteration. With `outside_only` set, only pixels whose *original* alpha was
/// 0 are ever painted — anti-aliased fringe pixels that belong to the shape
/// are left alone.
#[derive(Clone, Serialize, Deserialize)]
pub struct Outline {
    pub enabled: bool,
    pub thickness: u32,
    pub color: u32,
    pub outside_only: bool,
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: 1,
            color: color::pack_opaque(0, 0, 0),
            outside_only: true,
        }
    }
}

/// Pure outline pass. `thickness == 0` is a no-op.
pub fn outline_core(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    thickness: u32,
    outline_color: u32,
    outside_only: bool,
) {
    check_len(pixels, width, height);
    if thickness == 0 || width == 0 || height == 0 {
        return;
    }

    let w = width as usize;
    let h = height as usize;

    // Silhouette mask (alpha > 0) and the untouched original alpha for the
    // outside-only restriction.
    let mut silhouette: Vec<bool> = (0..w * h).map(|i| pixels[i * 4 + 3] > 0).collect();
    let original_alpha: Vec<u8> = (0..w * h).map(|i| pixels[i * 4 + 3]).collect();

    let mut ring: Vec<usize> = Vec::new();
    for _ in 0..thickness {
        ring.clear();
        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                if pixels[idx * 4 + 3] == 255 {
                    continue; // already fully opaque
                }
                if outside_only && original_alpha[idx] > 0 {
                    continue; // was part of the shape
                }
                let touches = (x > 0 && silhouette[idx - 1])
                    || (x + 1 < w && silhouette[idx + 1])
                    || (y > 0 && silhouette[idx - w])
                    || (y + 1 < h && silhouette[idx + w]);
                if touches {
                    ring.push(idx);
                }
            }
        }
        if ring.is_empty() {
            break; // silhouette can no longer grow
        }
        for &idx in &ring {
            color::write_pixel(pixels, idx * 4, outline_color);
            silhouette[idx] = true;
        }
    }
}

impl Effect for Outline {
    fn id(&self) -> &'static str {
        EFFECT_ID
    }

    fn display_name(&self) -> &'static str {
        "Outline"
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
        outline_core(
            pixels,
            width,
            height,
            self.thickness,
            self.color,
            self.outside_only,
        );
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("thickness".into(), self.thickness.to_string()),
            ("color".into(), format_color(self.color)),
            ("outside_only".into(), self.outside_only.to_string()),
        ]
    }

    fn set_param(&mut self, key: &str, value: &str) -> bool {
        match key {
            "thickness" => match value.parse() {
                Ok(v) => {
                    self.thickness = v;
                    true
                }
                Err(_) => false,
            },
            "color" => match parse_color(value) {
                Some(c) => {
                    self.color = c;
                    true
                }
                None => false,
            },
            "outside_only" => match value.parse() {
                Ok(v) => {
                    self.outside_only = v;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }
}
