// ============================================================================
// PixelFE CLI — headless batch effect processing via command-line arguments
// ============================================================================
//
// Usage examples:
//   pixelfe --input sprite.png --effect outline:thickness=2,color=#000000 --output out.png
//   pixelfe -i sprite.png -e pixelate:block_size=4 -e vignette:strength=0.8 -o out.png
//   pixelfe -i "sprites/*.png" -e palette_quantize:auto=16 --output-dir processed/
//   pixelfe -i big.png --resize 64x64 -o small.png
//
// No GUI exists in this build; all processing runs synchronously on the
// current thread. Effect chains apply in the order given on the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::effects::{self, EffectStack};
use crate::io::{load_bgra, save_bgra};
use crate::{buffer, log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PixelFE headless effect processor.
///
/// Apply layer-effect chains to image files without opening a GUI.
#[derive(Parser, Debug)]
#[command(
    name = "pixelfe",
    about = "PixelFE headless batch effect processor",
    long_about = "Apply effect chains (palette_quantize, outline, vignette, pixelate)\n\
                  to raster images. Effects run in the order they are given.\n\n\
                  Example:\n  \
                  pixelfe -i sprite.png -e outline:thickness=1,color=#202020 -o out.png\n  \
                  pixelfe -i \"*.png\" -e palette_quantize:auto=8 --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "sprites/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Effect spec, repeatable: NAME or NAME:key=value,key=value.
    /// `palette_quantize` also accepts `auto=N` to derive an N-color palette
    /// from each input image.
    #[arg(short, long = "effect", value_name = "SPEC")]
    pub effects: Vec<String>,

    /// Resize the image before the effect chain runs: WxH, nearest-neighbour
    /// by default.
    #[arg(long, value_name = "WxH")]
    pub resize: Option<String>,

    /// Use bilinear interpolation for --resize instead of nearest-neighbour.
    #[arg(long, default_value_t = false)]
    pub smooth: bool,

    /// Trim the result to the bounding box of its visible pixels before saving.
    #[arg(long, default_value_t = false)]
    pub trim: bool,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One entry of the effect chain as given on the command line, before the
/// per-file instantiation (auto palettes depend on the input image).
struct EffectSpec {
    id: String,
    params: Vec<(String, String)>,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let parsed: Result<Vec<EffectSpec>, String> =
        args.effects.iter().map(|s| parse_effect_spec(s)).collect();
    let specs = match parsed {
        Ok(specs) => specs,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let resize = match args.resize.as_deref().map(parse_resize).transpose() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();
        let output_path =
            match build_output_path(input_path, args.output.as_deref(), args.output_dir.as_deref())
            {
                Some(p) => p,
                None => {
                    eprintln!(
                        "  error: cannot determine output path for '{}'.",
                        input_path.display()
                    );
                    any_failure = true;
                    continue;
                }
            };

        match run_one(input_path, &output_path, &specs, resize, args.smooth, args.trim) {
            Ok(()) => {
                log_info!("{} -> {}", input_path.display(), output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    specs: &[EffectSpec],
    resize: Option<(u32, u32)>,
    smooth: bool,
    trim: bool,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let (mut pixels, mut w, mut h) = load_bgra(input)?;

    // -- Step 2: Pre-resize ----------------------------------------------
    if let Some((nw, nh)) = resize {
        pixels = if smooth {
            buffer::resize_bilinear(&pixels, w, h, nw, nh)
        } else {
            buffer::resize_nearest(&pixels, w, h, nw, nh)
        };
        w = nw;
        h = nh;
    }

    // -- Step 3: Effect chain --------------------------------------------
    let stack = build_stack(specs, &pixels)?;
    stack.apply_all(&mut pixels, w, h);

    // -- Step 4: Trim ----------------------------------------------------
    if trim {
        let crop = buffer::crop_to_opaque(&pixels, w, h);
        pixels = crop.data;
        w = crop.width;
        h = crop.height;
    }

    // -- Step 5: Save ----------------------------------------------------
    save_bgra(output, &pixels, w, h)
}

/// Instantiate the effect chain for one input image. Auto palettes for
/// `palette_quantize` are derived from the image itself.
fn build_stack(specs: &[EffectSpec], pixels: &[u8]) -> Result<EffectStack, String> {
    let mut stack = EffectStack::new();
    for spec in specs {
        let mut effect = effects::create_effect(&spec.id)
            .ok_or_else(|| format!("unknown effect '{}'", spec.id))?;
        for (key, value) in &spec.params {
            if spec.id == effects::palette::EFFECT_ID && key == "auto" {
                let n: usize = value
                    .parse()
                    .map_err(|_| format!("invalid auto palette size '{}'", value))?;
                let palette = adaptive_palette(pixels, n);
                if !effect.set_param("palette", &palette) {
                    return Err("could not apply the derived palette".to_string());
                }
                continue;
            }
            if !effect.set_param(key, value) {
                return Err(format!(
                    "effect '{}' rejected parameter {}={}",
                    spec.id, key, value
                ));
            }
        }
        stack.add(effect);
    }
    Ok(stack)
}

/// Derive an adaptive N-color palette from the visible pixels via NeuQuant,
/// formatted as a `palette` parameter string.
fn adaptive_palette(bgra: &[u8], colors: usize) -> String {
    let rgba = crate::io::bgra_to_rgba(bgra);
    let colors = colors.clamp(2, 256);
    // Sample factor 10 trades quality for speed, as in GIF export paths.
    let quantizer = color_quant::NeuQuant::new(10, colors, &rgba);
    quantizer
        .color_map_rgba()
        .chunks_exact(4)
        .map(|c| format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2]))
        .collect::<Vec<_>>()
        .join(";")
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse `NAME` or `NAME:key=value,key=value` into an [`EffectSpec`].
fn parse_effect_spec(spec: &str) -> Result<EffectSpec, String> {
    let (id, rest) = match spec.split_once(':') {
        Some((id, rest)) => (id, Some(rest)),
        None => (spec, None),
    };
    if id.is_empty() {
        return Err(format!("empty effect name in spec '{}'", spec));
    }

    let mut params = Vec::new();
    if let Some(rest) = rest {
        for pair in rest.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("malformed parameter '{}' in spec '{}'", pair, spec))?;
            params.push((key.to_string(), value.to_string()));
        }
    }
    Ok(EffectSpec {
        id: id.to_string(),
        params,
    })
}

/// Parse `WxH` into a dimension pair; both sides must be positive.
fn parse_resize(arg: &str) -> Result<(u32, u32), String> {
    let (w, h) = arg
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid --resize '{}', expected WxH", arg))?;
    let w: u32 = w.parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: u32 = h.parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w == 0 || h == 0 {
        return Err("resize dimensions must be positive".to_string());
    }
    Ok((w, h))
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority: explicit `--output`, then `--output-dir` with the input's stem,
/// then the input's directory with `_out` appended to the stem.
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}_out.{}", stem, ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_spec_parsing() {
        let spec = parse_effect_spec("outline:thickness=2,color=#FF00FF").unwrap();
        assert_eq!(spec.id, "outline");
        assert_eq!(spec.params.len(), 2);
        assert_eq!(spec.params[0], ("thickness".into(), "2".into()));

        let bare = parse_effect_spec("pixelate").unwrap();
        assert_eq!(bare.id, "pixelate");
        assert!(bare.params.is_empty());

        assert!(parse_effect_spec(":k=v").is_err());
        assert!(parse_effect_spec("outline:thickness").is_err());
    }

    #[test]
    fn resize_parsing() {
        assert_eq!(parse_resize("64x32").unwrap(), (64, 32));
        assert_eq!(parse_resize("16X16").unwrap(), (16, 16));
        assert!(parse_resize("64").is_err());
        assert!(parse_resize("0x5").is_err());
    }

    #[test]
    fn build_stack_rejects_unknown_ids_and_params() {
        let good = parse_effect_spec("pixelate:block_size=3").unwrap();
        let stack = build_stack(&[good], &[]).unwrap();
        assert_eq!(stack.len(), 1);

        let unknown = parse_effect_spec("sparkle").unwrap();
        assert!(build_stack(&[unknown], &[]).is_err());

        let bad_param = parse_effect_spec("pixelate:radius=3").unwrap();
        assert!(build_stack(&[bad_param], &[]).is_err());
    }

    #[test]
    fn output_path_fallbacks() {
        let p = build_output_path(Path::new("a/b.png"), None, None).unwrap();
        assert_eq!(p, Path::new("a/b_out.png"));
        let p = build_output_path(Path::new("a/b.png"), None, Some(Path::new("out"))).unwrap();
        assert_eq!(p, Path::new("out/b.png"));
        let p = build_output_path(Path::new("a/b.png"), Some(Path::new("c.png")), None).unwrap();
        assert_eq!(p, Path::new("c.png"));
    }
}
