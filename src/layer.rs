// ============================================================================
// LAYER — a pixel buffer plus its owned effect stack
// ============================================================================
//
// A layer owns exactly one BGRA buffer and one effect stack; effects are
// never shared across layers. Rendering leaves the stored pixels untouched:
// a composite pass clones the buffer, runs the stack over the clone, and
// blends the result over the backdrop.

use crate::buffer::check_len;
use crate::color;
use crate::effects::EffectStack;

pub struct Layer {
    pub name: String,
    pub visible: bool,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    pub effects: EffectStack,
}

impl Layer {
    /// Create a layer filled with `fill` (commonly fully transparent).
    pub fn new(name: impl Into<String>, width: u32, height: u32, fill: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        if fill != 0 {
            for offset in (0..pixels.len()).step_by(4) {
                color::write_pixel(&mut pixels, offset, fill);
            }
        }
        Self {
            name: name.into(),
            visible: true,
            width,
            height,
            pixels,
            effects: EffectStack::new(),
        }
    }

    /// Adopt an existing buffer. The buffer must match `width * height * 4`.
    pub fn from_pixels(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        check_len(&pixels, width, height);
        Self {
            name: name.into(),
            visible: true,
            width,
            height,
            pixels,
            effects: EffectStack::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The stored (pre-effect) pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Effect-stack version for the render scheduler; a changed value means
    /// the layer must be re-composited.
    pub fn version(&self) -> u64 {
        self.effects.version()
    }

    /// Run one full effect pass over a copy of the stored pixels and return
    /// the result. The layer's own buffer is never mutated.
    pub fn rendered(&self) -> Vec<u8> {
        let mut out = self.pixels.clone();
        self.effects.apply_all(&mut out, self.width, self.height);
        out
    }

    /// Blend this layer's rendered output over `dst` (same dimensions) with
    /// the source-over operator. Invisible layers contribute nothing.
    pub fn composite_onto(&self, dst: &mut [u8]) {
        if !self.visible {
            return;
        }
        check_len(dst, self.width, self.height);
        let rendered = self.rendered();
        for offset in (0..dst.len()).step_by(4) {
            let base = color::read_pixel(dst, offset);
            let top = color::read_pixel(&rendered, offset);
            color::write_pixel(dst, offset, color::blend_over(base, top));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{pack, pack_opaque, read_pixel};
    use crate::effects::create_effect;

    #[test]
    fn rendered_does_not_mutate_stored_pixels() {
        let mut layer = Layer::new("bg", 2, 2, pack_opaque(100, 100, 100));
        let mut quantize = create_effect("palette_quantize").unwrap();
        assert!(quantize.set_param("palette", "#000000"));
        layer.effects.add(quantize);

        let out = layer.rendered();
        assert_eq!(read_pixel(&out, 0), pack_opaque(0, 0, 0));
        assert_eq!(read_pixel(layer.pixels(), 0), pack_opaque(100, 100, 100));
    }

    #[test]
    fn invisible_layer_composites_nothing() {
        let mut layer = Layer::new("top", 1, 1, pack_opaque(9, 9, 9));
        layer.visible = false;
        let mut dst = vec![0u8; 4];
        layer.composite_onto(&mut dst);
        assert_eq!(dst, vec![0u8; 4]);
    }

    #[test]
    fn composite_blends_over_backdrop() {
        let layer = Layer::new("top", 1, 1, pack(255, 255, 255, 128));
        let mut dst = vec![0u8; 4];
        crate::color::write_pixel(&mut dst, 0, pack_opaque(0, 0, 0));
        layer.composite_onto(&mut dst);
        let out = read_pixel(&dst, 0);
        assert_eq!(crate::color::get_a(out), 255);
        assert!(crate::color::get_r(out) > 0 && crate::color::get_r(out) < 255);
    }
}
