// ============================================================================
// PIXEL BUFFER OPERATIONS — resampling, region copy, crop, comparisons
// ============================================================================
//
// All functions operate on flat BGRA byte buffers (`width * height * 4`,
// row-major). Degenerate geometry (zero-size targets, fully out-of-bounds
// regions) produces a defined fallback value — an empty buffer or a no-op —
// never a panic. A buffer whose length does not match its stated dimensions
// is a caller bug and fails fast via `assert!`.

use crate::color;

/// Result of [`crop_to_opaque`]: the tight bounding box of all pixels with
/// alpha > 0, plus its top-left position in the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedBuffer {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

#[inline]
pub(crate) fn check_len(buf: &[u8], w: u32, h: u32) {
    assert!(
        buf.len() == w as usize * h as usize * 4,
        "pixel buffer length {} does not match {}x{}x4",
        buf.len(),
        w,
        h
    );
}

/// Nearest-neighbour resize. Destination pixel `(dx, dy)` samples source
/// pixel `(dx*srcW/dstW, dy*srcH/dstH)` (floor division, clamped). A
/// zero-size destination returns an empty buffer; identical dimensions
/// reproduce the source byte-for-byte.
pub fn resize_nearest(src: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Vec<u8> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return Vec::new();
    }
    check_len(src, src_w, src_h);
    if src_w == dst_w && src_h == dst_h {
        return src.to_vec();
    }

    let (sw, sh) = (src_w as usize, src_h as usize);
    let (dw, dh) = (dst_w as usize, dst_h as usize);
    let src_stride = sw * 4;
    let mut dst = vec![0u8; dw * dh * 4];

    for dy in 0..dh {
        let sy = (dy * sh / dh).min(sh - 1);
        let src_row = sy * src_stride;
        let dst_row = dy * dw * 4;
        for dx in 0..dw {
            let sx = (dx * sw / dw).min(sw - 1);
            let si = src_row + sx * 4;
            let di = dst_row + dx * 4;
            dst[di..di + 4].copy_from_slice(&src[si..si + 4]);
        }
    }
    dst
}

/// Bilinear resize: each destination pixel interpolates the four nearest
/// source pixels, independently per channel (alpha included). Mapping is
/// endpoint-aligned, so a 1×1 (or single-row/column) source replicates
/// exactly — no division by zero.
pub fn resize_bilinear(src: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Vec<u8> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return Vec::new();
    }
    check_len(src, src_w, src_h);

    let (sw, sh) = (src_w as usize, src_h as usize);
    let (dw, dh) = (dst_w as usize, dst_h as usize);
    let src_stride = sw * 4;
    let mut dst = vec![0u8; dw * dh * 4];

    // Endpoint-aligned source coordinate for a destination index.
    let map = |d: usize, dn: usize, sn: usize| -> f32 {
        if dn <= 1 || sn <= 1 {
            0.0
        } else {
            d as f32 * (sn - 1) as f32 / (dn - 1) as f32
        }
    };

    for dy in 0..dh {
        let fy = map(dy, dh, sh);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(sh - 1);
        let wy = fy - y0 as f32;
        let dst_row = dy * dw * 4;

        for dx in 0..dw {
            let fx = map(dx, dw, sw);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(sw - 1);
            let wx = fx - x0 as f32;

            let i00 = y0 * src_stride + x0 * 4;
            let i10 = y0 * src_stride + x1 * 4;
            let i01 = y1 * src_stride + x0 * 4;
            let i11 = y1 * src_stride + x1 * 4;
            let di = dst_row + dx * 4;

            for c in 0..4 {
                let p00 = src[i00 + c] as f32;
                let p10 = src[i10 + c] as f32;
                let p01 = src[i01 + c] as f32;
                let p11 = src[i11 + c] as f32;
                let top = p00 * (1.0 - wx) + p10 * wx;
                let bottom = p01 * (1.0 - wx) + p11 * wx;
                let v = top * (1.0 - wy) + bottom * wy;
                dst[di + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    dst
}

/// Compare the two 4-byte pixels at the given byte offsets. Passes when every
/// RGB channel differs by at most `tolerance`; alpha joins the check only
/// when `compare_alpha` is set.
pub fn pixels_similar(
    buffer: &[u8],
    offset_a: usize,
    offset_b: usize,
    tolerance: u8,
    compare_alpha: bool,
) -> bool {
    colors_similar(
        color::read_pixel(buffer, offset_a),
        color::read_pixel(buffer, offset_b),
        tolerance,
        compare_alpha,
    )
}

/// Same comparison as [`pixels_similar`], on two packed colors directly.
pub fn colors_similar(a: u32, b: u32, tolerance: u8, compare_alpha: bool) -> bool {
    let tol = tolerance as i32;
    if color::color_distance_chebyshev(a, b) > tol {
        return false;
    }
    if compare_alpha {
        let da = (color::get_a(a) as i32 - color::get_a(b) as i32).abs();
        if da > tol {
            return false;
        }
    }
    true
}

/// Extract the sub-rectangle starting at `(x, y)` of size
/// `region_w × region_h`. The rectangle is clipped to the source bounds; a
/// start fully outside the source or a zero-area request returns an empty
/// buffer.
pub fn copy_region(
    src: &[u8],
    w: u32,
    h: u32,
    x: i32,
    y: i32,
    region_w: u32,
    region_h: u32,
) -> Vec<u8> {
    check_len(src, w, h);
    if region_w == 0 || region_h == 0 {
        return Vec::new();
    }

    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x as i64 + region_w as i64).clamp(0, w as i64) as u32;
    let y1 = (y as i64 + region_h as i64).clamp(0, h as i64) as u32;
    if x0 >= w || y0 >= h || x0 >= x1 || y0 >= y1 {
        return Vec::new();
    }

    let out_w = (x1 - x0) as usize;
    let out_h = (y1 - y0) as usize;
    let src_stride = w as usize * 4;
    let mut out = Vec::with_capacity(out_w * out_h * 4);
    for row in 0..out_h {
        let start = (y0 as usize + row) * src_stride + x0 as usize * 4;
        out.extend_from_slice(&src[start..start + out_w * 4]);
    }
    out
}

/// Crop to the tight bounding box of all pixels with alpha > 0.
///
/// A fully transparent buffer yields a 1×1 result at offset `(0, 0)` (defined
/// fallback, not an error); a fully opaque buffer comes back at its original
/// dimensions; a single visible pixel yields a 1×1 result positioned at that
/// pixel.
pub fn crop_to_opaque(buffer: &[u8], w: u32, h: u32) -> CroppedBuffer {
    check_len(buffer, w, h);
    if w == 0 || h == 0 {
        return CroppedBuffer {
            data: vec![0u8; 4],
            width: 1,
            height: 1,
            offset_x: 0,
            offset_y: 0,
        };
    }

    let stride = w as usize * 4;
    let mut min_x = w;
    let mut min_y = h;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    for y in 0..h {
        let row = y as usize * stride;
        for x in 0..w {
            if buffer[row + x as usize * 4 + 3] > 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if min_x > max_x {
        // Nothing visible — 1×1 fallback holding the top-left pixel.
        return CroppedBuffer {
            data: buffer[0..4].to_vec(),
            width: 1,
            height: 1,
            offset_x: 0,
            offset_y: 0,
        };
    }

    let bw = max_x - min_x + 1;
    let bh = max_y - min_y + 1;
    CroppedBuffer {
        data: copy_region(buffer, w, h, min_x as i32, min_y as i32, bw, bh),
        width: bw,
        height: bh,
        offset_x: min_x,
        offset_y: min_y,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{pack, write_pixel};

    fn solid(w: u32, h: u32, c: u32) -> Vec<u8> {
        let mut buf = vec![0u8; (w * h * 4) as usize];
        for i in 0..(w * h) as usize {
            write_pixel(&mut buf, i * 4, c);
        }
        buf
    }

    #[test]
    fn resize_nearest_identity() {
        let mut src = solid(3, 2, pack(1, 2, 3, 4));
        src[5] = 99; // make it non-uniform
        assert_eq!(resize_nearest(&src, 3, 2, 3, 2), src);
    }

    #[test]
    fn resize_nearest_zero_target_is_empty() {
        let src = solid(2, 2, pack(1, 1, 1, 255));
        assert!(resize_nearest(&src, 2, 2, 0, 5).is_empty());
        assert!(resize_nearest(&src, 2, 2, 5, 0).is_empty());
    }

    #[test]
    fn resize_replicates_single_pixel() {
        let src = solid(1, 1, pack(10, 20, 30, 40));
        for (w, h) in [(1, 1), (3, 3), (7, 2)] {
            let near = resize_nearest(&src, 1, 1, w, h);
            let bili = resize_bilinear(&src, 1, 1, w, h);
            let expect = solid(w, h, pack(10, 20, 30, 40));
            assert_eq!(near, expect, "nearest {}x{}", w, h);
            assert_eq!(bili, expect, "bilinear {}x{}", w, h);
        }
    }

    #[test]
    fn resize_nearest_downscale_picks_floor_sample() {
        // 4x1 source, halved: dx=0 -> sx=0, dx=1 -> sx=2.
        let mut src = vec![0u8; 16];
        for (i, c) in [0u32, 1, 2, 3].iter().enumerate() {
            write_pixel(&mut src, i * 4, pack(*c as u8, 0, 0, 255));
        }
        let out = resize_nearest(&src, 4, 1, 2, 1);
        assert_eq!(out[0], 0);
        assert_eq!(out[4], 2);
    }

    #[test]
    fn resize_bilinear_interpolates_midpoint() {
        // Two-pixel row 0 → 255, stretched to 3: middle is the average.
        let mut src = vec![0u8; 8];
        write_pixel(&mut src, 0, pack(0, 0, 0, 255));
        write_pixel(&mut src, 4, pack(255, 255, 255, 255));
        let out = resize_bilinear(&src, 2, 1, 3, 1);
        assert_eq!(out[0], 0);
        assert_eq!(out[4], 128); // 127.5 rounds to 128
        assert_eq!(out[8], 255);
        assert_eq!(out[11], 255); // alpha interpolated too
    }

    #[test]
    fn similarity_checks() {
        let a = pack(10, 20, 30, 200);
        let b = pack(12, 18, 33, 100);
        assert!(colors_similar(a, b, 3, false));
        assert!(!colors_similar(a, b, 2, false)); // blue differs by 3
        assert!(!colors_similar(a, b, 3, true)); // alpha differs by 100
        assert!(colors_similar(a, b, 100, true));

        let mut buf = vec![0u8; 8];
        write_pixel(&mut buf, 0, a);
        write_pixel(&mut buf, 4, b);
        assert!(pixels_similar(&buf, 0, 4, 3, false));
        assert!(!pixels_similar(&buf, 0, 4, 3, true));
    }

    #[test]
    fn copy_region_clips_to_bounds() {
        let src = solid(4, 4, pack(9, 9, 9, 255));
        let clipped = copy_region(&src, 4, 4, 2, 2, 10, 10);
        assert_eq!(clipped.len(), 2 * 2 * 4);
        assert!(copy_region(&src, 4, 4, 10, 10, 2, 2).is_empty());
        assert!(copy_region(&src, 4, 4, 1, 1, 0, 0).is_empty());
    }

    #[test]
    fn copy_region_negative_start_clips() {
        let src = solid(4, 4, pack(9, 9, 9, 255));
        let out = copy_region(&src, 4, 4, -2, -2, 3, 3);
        assert_eq!(out.len(), 4); // only (0,0) is in bounds
    }

    #[test]
    fn crop_fully_transparent_falls_back_to_1x1() {
        let src = vec![0u8; 4 * 4 * 4];
        let crop = crop_to_opaque(&src, 4, 4);
        assert_eq!((crop.width, crop.height), (1, 1));
        assert_eq!((crop.offset_x, crop.offset_y), (0, 0));
        assert_eq!(crop.data, vec![0u8; 4]);
    }

    #[test]
    fn crop_fully_opaque_keeps_dimensions() {
        let src = solid(4, 4, pack(1, 2, 3, 255));
        let crop = crop_to_opaque(&src, 4, 4);
        assert_eq!((crop.width, crop.height), (4, 4));
        assert_eq!((crop.offset_x, crop.offset_y), (0, 0));
        assert_eq!(crop.data, src);
    }

    #[test]
    fn crop_single_pixel() {
        let mut src = vec![0u8; 8 * 8 * 4];
        let c = pack(40, 50, 60, 255);
        write_pixel(&mut src, (5 * 8 + 3) * 4, c); // pixel at (3, 5)
        let crop = crop_to_opaque(&src, 8, 8);
        assert_eq!((crop.width, crop.height), (1, 1));
        assert_eq!((crop.offset_x, crop.offset_y), (3, 5));
        assert_eq!(crate::color::read_pixel(&crop.data, 0), c);
    }
}
