// ============================================================================
// VIGNETTE — tint pixels toward a color by distance from the buffer center
// ============================================================================

use serde::{Deserialize, Serialize};

use super::{Effect, format_color, parse_color};
use crate::buffer::check_len;
use crate::color;

pub const EFFECT_ID: &str = "vignette";

/// Blend the border of the image toward a tint color.
///
/// Distance from the buffer center is normalized so the corners sit at 1.0.
/// Pixels inside `radius` are untouched; beyond it the blend ramps from 0 up
/// to `strength` across a band of width `softness`. Alpha never changes
/// (tinting goes through `lerp_rgb_keep_alpha`), and fully transparent pixels
/// are skipped unless `apply_on_transparent` is set.
#[derive(Clone, Serialize, Deserialize)]
pub struct Vignette {
    pub enabled: bool,
    /// Maximum blend amount at the far end of the ramp, 0.0–1.0.
    pub strength: f32,
    /// Normalized distance where the ramp starts, 0.0–1.0.
    pub radius: f32,
    /// Width of the transition band in normalized distance units.
    pub softness: f32,
    pub tint: u32,
    pub apply_on_transparent: bool,
}

impl Default for Vignette {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 0.5,
            radius: 0.6,
            softness: 0.3,
            tint: color::pack_opaque(0, 0, 0),
            apply_on_transparent: false,
        }
    }
}

/// Pure vignette pass. `strength <= 0` is a no-op; `softness <= 0` degrades
/// to a hard edge at `radius`.
#[allow(clippy::too_many_arguments)]
pub fn vignette_core(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    strength: f32,
    radius: f32,
    softness: f32,
    tint: u32,
    apply_on_transparent: bool,
) {
    check_len(pixels, width, height);
    if width == 0 || height == 0 || strength <= 0.0 {
        return;
    }

    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
    let strength = strength.clamp(0.0, 1.0);
    let soft = softness.max(0.01); // hard edge without a zero division
    let stride = width as usize * 4;

    for y in 0..height as usize {
        let dy = y as f32 + 0.5 - cy;
        for x in 0..width as usize {
            let offset = y * stride + x * 4;
            if pixels[offset + 3] == 0 && !apply_on_transparent {
                continue;
            }

            let dx = x as f32 + 0.5 - cx;
            let dist = (dx * dx + dy * dy).sqrt() / max_dist;
            if dist <= radius {
                continue;
            }

            let ramp = ((dist - radius) / soft).min(1.0) * strength;
            let t = (ramp * 255.0) as u8;
            if t == 0 {
                continue;
            }
            let px = color::read_pixel(pixels, offset);
            color::write_pixel(pixels, offset, color::lerp_rgb_keep_alpha(px, tint, t));
        }
    }
}

impl Effect for Vignette {
    fn id(&self) -> &'static str {
        EFFECT_ID
    }

    fn display_name(&self) -> &'static str {
        "Vignette"
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
        vignette_core(
            pixels,
            width,
            height,
            self.strength,
            self.radius,
            self.softness,
            self.tint,
            self.apply_on_transparent,
        );
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("strength".into(), self.strength.to_string()),
            ("radius".into(), self.radius.to_string()),
            ("softness".into(), self.softness.to_string()),
            ("tint".into(), format_color(self.tint)),
            (
                "apply_on_transparent".into(),
                self.apply_on_transparent.to_string(),
            ),
        ]
    }

    fn set_param(&mut self, key: &str, value: &str) -> bool {
        match key {
            "strength" => match value.parse() {
                Ok(v) => {
                    self.strength = v;
                    true
                }
                Err(_) => false,
            },
            "radius" => match value.parse() {
                Ok(v) => {
                    self.radius = v;
                    true
                }
                Err(_) => false,
            },
            "softness" => match value.parse() {
                Ok(v) => {
                    self.softness = v;
                    true
                }
                Err(_) => false,
            },
            "tint" => match parse_color(value) {
                Some(c) => {
                    self.tint = c;
                    true
                }
                None => false,
            },
            "apply_on_transparent" => match value.parse() {
                Ok(v) => {
                    self.apply_on_transparent = v;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }
}
