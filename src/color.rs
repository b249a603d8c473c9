// ============================================================================
// COLOR MODEL — packed 32-bit BGRA colors and per-channel integer math
// ============================================================================
//
// A color is a single u32 holding four 8-bit channels, least- to
// most-significant byte: Blue, Green, Red, Alpha. Channels are straight
// (non-premultiplied) alpha. Every bit pattern is a valid color.
//
// All arithmetic is integer-only with *truncating* division, so results are
// bit-exact across platforms. Buffers are flat `width * height * 4` byte
// slices in the same B,G,R,A order.

/// Assemble a packed color from individual channels.
#[inline]
pub fn pack(b: u8, g: u8, r: u8, a: u8) -> u32 {
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16) | ((a as u32) << 24)
}

/// Assemble a fully opaque packed color (alpha = 255).
#[inline]
pub fn pack_opaque(b: u8, g: u8, r: u8) -> u32 {
    pack(b, g, r, 255)
}

/// Split a packed color back into `(b, g, r, a)`.
#[inline]
pub fn unpack(color: u32) -> (u8, u8, u8, u8) {
    (get_b(color), get_g(color), get_r(color), get_a(color))
}

#[inline]
pub fn get_b(color: u32) -> u8 {
    (color & 0xFF) as u8
}

#[inline]
pub fn get_g(color: u32) -> u8 {
    ((color >> 8) & 0xFF) as u8
}

#[inline]
pub fn get_r(color: u32) -> u8 {
    ((color >> 16) & 0xFF) as u8
}

#[inline]
pub fn get_a(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Force alpha to 255, RGB unchanged.
#[inline]
pub fn make_opaque(color: u32) -> u32 {
    color | 0xFF00_0000
}

/// Force alpha to 0, RGB unchanged.
#[inline]
pub fn strip_alpha(color: u32) -> u32 {
    color & 0x00FF_FFFF
}

/// Replace the alpha channel only.
#[inline]
pub fn set_alpha(color: u32, a: u8) -> u32 {
    (color & 0x00FF_FFFF) | ((a as u32) << 24)
}

/// Compare the RGB channels only, ignoring alpha.
#[inline]
pub fn rgb_equal(a: u32, b: u32) -> bool {
    (a & 0x00FF_FFFF) == (b & 0x00FF_FFFF)
}

/// Source-over alpha compositing in straight-alpha space.
///
/// `oa = sa + da*(255-sa)/255`; each color channel is
/// `(srcC*sa + dstC*da*(255-sa)/255) / oa`, all divisions truncating.
/// A fully opaque source returns `src` unchanged, a fully transparent source
/// returns `dst` unchanged (exact, including RGB of invisible pixels).
pub fn blend_over(dst: u32, src: u32) -> u32 {
    let sa = get_a(src) as u32;

    // Fast paths — also required for exactness on invisible RGB bits.
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da = get_a(dst) as u32;
    let dst_weight = da * (255 - sa) / 255;
    let oa = sa + dst_weight;
    if oa == 0 {
        return 0;
    }

    let blend_channel = |sc: u32, dc: u32| (sc * sa + dc * da * (255 - sa) / 255) / oa;

    let b = blend_channel(get_b(src) as u32, get_b(dst) as u32);
    let g = blend_channel(get_g(src) as u32, get_g(dst) as u32);
    let r = blend_channel(get_r(src) as u32, get_r(dst) as u32);
    pack(b as u8, g as u8, r as u8, oa as u8)
}

/// Flatten a (possibly transparent) pixel onto an opaque background color.
/// Always yields alpha 255.
pub fn composite_over_color(pixel: u32, background: u32) -> u32 {
    match get_a(pixel) {
        255 => pixel,
        0 => background,
        _ => make_opaque(blend_over(make_opaque(background), pixel)),
    }
}

/// Sum of absolute per-channel RGB differences (alpha excluded). Range 0–765.
#[inline]
pub fn color_distance_manhattan(a: u32, b: u32) -> i32 {
    let dr = (get_r(a) as i32 - get_r(b) as i32).abs();
    let dg = (get_g(a) as i32 - get_g(b) as i32).abs();
    let db = (get_b(a) as i32 - get_b(b) as i32).abs();
    dr + dg + db
}

/// Largest absolute per-channel RGB difference. Range 0–255.
#[inline]
pub fn color_distance_chebyshev(a: u32, b: u32) -> i32 {
    let dr = (get_r(a) as i32 - get_r(b) as i32).abs();
    let dg = (get_g(a) as i32 - get_g(b) as i32).abs();
    let db = (get_b(a) as i32 - get_b(b) as i32).abs();
    dr.max(dg).max(db)
}

/// Sum of squared per-channel RGB differences. Symmetric by construction.
#[inline]
pub fn color_distance_squared(a: u32, b: u32) -> i32 {
    let dr = get_r(a) as i32 - get_r(b) as i32;
    let dg = get_g(a) as i32 - get_g(b) as i32;
    let db = get_b(a) as i32 - get_b(b) as i32;
    dr * dr + dg * dg + db * db
}

/// Fast integer luma approximation. Weights sum to 256 (green highest, blue
/// lowest), so black maps to 0 and white to exactly 255.
#[inline]
pub fn fast_luminance(color: u32) -> i32 {
    let r = get_r(color) as i32;
    let g = get_g(color) as i32;
    let b = get_b(color) as i32;
    (77 * r + 151 * g + 28 * b) >> 8
}

/// True when the background is dark enough that overlaid text should be light.
#[inline]
pub fn should_use_light_text(background: u32) -> bool {
    fast_luminance(background) < 128
}

/// Read the 4 bytes at `offset` (B,G,R,A order) and pack them.
#[inline]
pub fn read_pixel(buffer: &[u8], offset: usize) -> u32 {
    pack(
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    )
}

/// Inverse of [`read_pixel`]; round-trips exactly.
#[inline]
pub fn write_pixel(buffer: &mut [u8], offset: usize, color: u32) {
    buffer[offset] = get_b(color);
    buffer[offset + 1] = get_g(color);
    buffer[offset + 2] = get_r(color);
    buffer[offset + 3] = get_a(color);
}

/// Interpolate R,G,B from `dst` toward `fg` by `t/255`; alpha is always taken
/// from `dst` regardless of `t`. Truncating division, so `t=0` returns `dst`
/// exactly and `t=255` returns `fg`'s RGB exactly.
pub fn lerp_rgb_keep_alpha(dst: u32, fg: u32, t: u8) -> u32 {
    if t == 0 {
        return dst;
    }
    let t = t as i32;
    let lerp = |dc: u8, fc: u8| (dc as i32 + (fc as i32 - dc as i32) * t / 255) as u8;

    let b = lerp(get_b(dst), get_b(fg));
    let g = lerp(get_g(dst), get_g(fg));
    let r = lerp(get_r(dst), get_r(fg));
    pack(b, g, r, get_a(dst))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip() {
        for &c in &[0u32, 0xFFFF_FFFF, 0x1234_5678, 0x8000_00FF, 0x00FF_0000] {
            let (b, g, r, a) = unpack(c);
            assert_eq!(pack(b, g, r, a), c);
        }
        assert_eq!(pack_opaque(1, 2, 3), pack(1, 2, 3, 255));
    }

    #[test]
    fn channel_accessors() {
        let c = pack(0x11, 0x22, 0x33, 0x44);
        assert_eq!(get_b(c), 0x11);
        assert_eq!(get_g(c), 0x22);
        assert_eq!(get_r(c), 0x33);
        assert_eq!(get_a(c), 0x44);
        assert_eq!(make_opaque(c), pack(0x11, 0x22, 0x33, 0xFF));
        assert_eq!(strip_alpha(c), pack(0x11, 0x22, 0x33, 0));
        assert_eq!(set_alpha(c, 0x99), pack(0x11, 0x22, 0x33, 0x99));
    }

    #[test]
    fn rgb_equal_ignores_alpha() {
        assert!(rgb_equal(pack(1, 2, 3, 0), pack(1, 2, 3, 200)));
        assert!(!rgb_equal(pack(1, 2, 3, 0), pack(1, 2, 4, 0)));
    }

    #[test]
    fn blend_over_opaque_source_wins() {
        let src = pack(10, 20, 30, 255);
        for &dst in &[0u32, pack(200, 100, 50, 128), 0xFFFF_FFFF] {
            assert_eq!(blend_over(dst, src), src);
        }
    }

    #[test]
    fn blend_over_transparent_source_is_identity() {
        let src = pack(10, 20, 30, 0); // non-zero RGB under zero alpha
        for &dst in &[0u32, pack(200, 100, 50, 128), 0xFFFF_FFFF] {
            assert_eq!(blend_over(dst, src), dst);
        }
    }

    #[test]
    fn blend_over_half_white_on_black() {
        let black = pack_opaque(0, 0, 0);
        let white = pack(255, 255, 255, 128);
        let out = blend_over(black, white);
        assert_eq!(get_a(out), 255);
        for c in [get_r(out), get_g(out), get_b(out)] {
            assert!(c > 0 && c < 255, "expected mid-gray channel, got {}", c);
        }
    }

    #[test]
    fn composite_over_color_edges() {
        let bg = pack_opaque(10, 20, 30);
        let opaque = pack(1, 2, 3, 255);
        let transparent = pack(9, 9, 9, 0);
        assert_eq!(composite_over_color(opaque, bg), opaque);
        assert_eq!(composite_over_color(transparent, bg), bg);
        let half = pack(255, 255, 255, 128);
        assert_eq!(get_a(composite_over_color(half, bg)), 255);
    }

    #[test]
    fn distance_extremes_and_symmetry() {
        let black = 0xFF00_0000;
        let white = 0xFFFF_FFFF;
        assert_eq!(color_distance_manhattan(black, white), 765);
        assert_eq!(color_distance_chebyshev(black, white), 255);
        let a = pack(5, 80, 200, 10);
        let b = pack(250, 3, 90, 99);
        assert_eq!(color_distance_squared(a, b), color_distance_squared(b, a));
        assert_eq!(color_distance_squared(a, a), 0);
    }

    #[test]
    fn luminance_ordering() {
        assert_eq!(fast_luminance(pack_opaque(0, 0, 0)), 0);
        let white = fast_luminance(pack_opaque(255, 255, 255));
        assert!((254..=255).contains(&white), "white luma {}", white);
        let green = fast_luminance(pack_opaque(0, 255, 0));
        let blue = fast_luminance(pack_opaque(255, 0, 0));
        assert!(green > blue);
        assert!(should_use_light_text(pack_opaque(10, 10, 10)));
        assert!(!should_use_light_text(pack_opaque(240, 240, 240)));
    }

    #[test]
    fn pixel_io_round_trip() {
        let mut buf = vec![0u8; 8];
        let c = pack(11, 22, 33, 44);
        write_pixel(&mut buf, 4, c);
        assert_eq!(read_pixel(&buf, 4), c);
        assert_eq!(&buf[4..8], &[11, 22, 33, 44]);
    }

    #[test]
    fn lerp_boundaries() {
        let dst = pack(10, 20, 30, 77);
        let fg = pack(200, 150, 100, 255);
        assert_eq!(lerp_rgb_keep_alpha(dst, fg, 0), dst);
        let full = lerp_rgb_keep_alpha(dst, fg, 255);
        assert_eq!(get_b(full), 200);
        assert_eq!(get_g(full), 150);
        assert_eq!(get_r(full), 100);
        assert_eq!(get_a(full), 77); // alpha always from dst
        let mid = lerp_rgb_keep_alpha(dst, fg, 128);
        assert_eq!(get_a(mid), 77);
    }
}
