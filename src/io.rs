// ============================================================================
// IMAGE I/O — raster files in, BGRA buffers out (CLI boundary only)
// ============================================================================
//
// The engine itself never touches files; these helpers exist for the
// headless CLI. The `image` crate decodes to RGBA, which is swizzled to the
// engine's flat BGRA layout on the way in and back on the way out.

use std::path::Path;

use image::{ImageFormat, RgbaImage};

/// Decode any `image`-supported raster file into a flat BGRA buffer.
pub fn load_bgra(path: &Path) -> Result<(Vec<u8>, u32, u32), String> {
    let img = image::open(path)
        .map_err(|e| format!("could not load '{}': {}", path.display(), e))?
        .to_rgba8();
    let (w, h) = (img.width(), img.height());
    Ok((rgba_to_bgra(img.as_raw()), w, h))
}

/// Encode a BGRA buffer to `path`; the format follows the file extension
/// (PNG when the extension is missing or unknown).
pub fn save_bgra(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<(), String> {
    if pixels.len() != width as usize * height as usize * 4 {
        return Err(format!(
            "buffer length {} does not match {}x{}x4",
            pixels.len(),
            width,
            height
        ));
    }
    let rgba = bgra_to_rgba(pixels);
    let img = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| "buffer does not match dimensions".to_string())?;
    let format = match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "bmp" => ImageFormat::Bmp,
        _ => ImageFormat::Png,
    };
    img.save_with_format(path, format)
        .map_err(|e| format!("could not save '{}': {}", path.display(), e))
}

/// RGBA byte order (image crate) → BGRA (engine).
pub fn rgba_to_bgra(rgba: &[u8]) -> Vec<u8> {
    let mut out = rgba.to_vec();
    for px in out.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    out
}

/// BGRA (engine) → RGBA byte order (image crate). Its own inverse.
pub fn bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
    rgba_to_bgra(bgra)
}
