// ============================================================================
// PALETTE QUANTIZE — snap every visible pixel to the nearest palette entry
// ============================================================================

use serde::{Deserialize, Serialize};

use super::{Effect, format_color, parse_color};
use crate::buffer::check_len;
use crate::color;

pub const EFFECT_ID: &str = "palette_quantize";

/// Reduce the image to an ordered candidate palette: each pixel with
/// alpha > 0 takes the RGB of the nearest candidate by squared RGB distance
/// (the first candidate wins ties), keeping its original alpha. An empty
/// palette is a no-op. Cost is `O(pixels × palette)`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PaletteQuantize {
    pub enabled: bool,
    /// Candidate colors, in priority order for tie-breaking.
    pub palette: Vec<u32>,
}

impl Default for PaletteQuantize {
    fn default() -> Self {
        Self {
            enabled: true,
            palette: Vec::new(),
        }
    }
}

/// Pure quantization pass over a flat BGRA buffer.
pub fn quantize_core(pixels: &mut [u8], width: u32, height: u32, palette: &[u32]) {
    check_len(pixels, width, height);
    if palette.is_empty() {
        return;
    }

    for offset in (0..pixels.len()).step_by(4) {
        let alpha = pixels[offset + 3];
        if alpha == 0 {
            continue;
        }
        let px = color::read_pixel(pixels, offset);

        let mut best = palette[0];
        let mut best_dist = color::color_distance_squared(px, best);
        for &candidate in &palette[1..] {
            let dist = color::color_distance_squared(px, candidate);
            // Strict comparison: the earlier candidate keeps ties.
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }

        color::write_pixel(pixels, offset, color::set_alpha(best, alpha));
    }
}

impl Effect for PaletteQuantize {
    fn id(&self) -> &'static str {
        EFFECT_ID
    }

    fn display_name(&self) -> &'static str {
        "Palette Quantize"
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
        quantize_core(pixels, width, height, &self.palette);
    }

    fn params(&self) -> Vec<(String, String)> {
        let palette = self
            .palette
            .iter()
            .map(|&c| format_color(c))
            .collect::<Vec<_>>()
            .join(";");
        vec![("palette".into(), palette)]
    }

    fn set_param(&mut self, key: &str, value: &str) -> bool {
        match key {
            "palette" => {
                let mut colors = Vec::new();
                for part in value.split(';').filter(|p| !p.is_empty()) {
                    match parse_color(part) {
                        Some(c) => colors.push(c),
                        None => return false,
                    }
                }
                self.palette = colors;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{get_a, pack, read_pixel, rgb_equal, write_pixel};

    #[test]
    fn empty_palette_is_noop() {
        let mut buf = vec![0u8; 16];
        write_pixel(&mut buf, 0, pack(10, 20, 30, 255));
        let before = buf.clone();
        quantize_core(&mut buf, 2, 2, &[]);
        assert_eq!(buf, before);
    }

    #[test]
    fn picks_nearest_and_preserves_alpha() {
        let dark = pack(0, 0, 0, 255);
        let light = pack(255, 255, 255, 255);
        let mut buf = vec![0u8; 8];
        write_pixel(&mut buf, 0, pack(10, 10, 10, 137)); // near dark, odd alpha
        write_pixel(&mut buf, 4, pack(250, 240, 230, 255)); // near light
        quantize_core(&mut buf, 2, 1, &[dark, light]);

        assert!(rgb_equal(read_pixel(&buf, 0), dark));
        assert_eq!(get_a(read_pixel(&buf, 0)), 137);
        assert!(rgb_equal(read_pixel(&buf, 4), light));
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let mut buf = vec![0u8; 4];
        write_pixel(&mut buf, 0, pack(40, 40, 40, 0));
        quantize_core(&mut buf, 1, 1, &[pack(0, 0, 0, 255)]);
        assert_eq!(read_pixel(&buf, 0), pack(40, 40, 40, 0));
    }

    #[test]
    fn first_candidate_wins_ties() {
        // Both candidates are equidistant from mid gray.
        let lo = pack(100, 100, 100, 255);
        let hi = pack(120, 120, 120, 255);
        let mut buf = vec![0u8; 4];
        write_pixel(&mut buf, 0, pack(110, 110, 110, 255));
        quantize_core(&mut buf, 1, 1, &[lo, hi]);
        assert!(rgb_equal(read_pixel(&buf, 0), lo));
    }

    #[test]
    fn param_bridge_round_trip() {
        let mut fx = PaletteQuantize::default();
        assert!(fx.set_param("palette", "#000000;#FFFFFF"));
        assert_eq!(fx.palette.len(), 2);
        let snapshot = fx.params();
        let mut restored = PaletteQuantize::default();
        for (k, v) in &snapshot {
            assert!(restored.set_param(k, v));
        }
        assert_eq!(restored.palette, fx.palette);
        assert!(!fx.set_param("palette", "#zzz"));
        assert!(!fx.set_param("nope", "1"));
    }
}
