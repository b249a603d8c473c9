// ============================================================================
// EFFECTS — polymorphic layer effects and the ordered effect stack
// ============================================================================
//
// Every effect is a trait object created through `create_effect` with a
// stable registration id (used for persistence and lookup). Effects mutate a
// BGRA buffer in place and must self-guard on their enabled flag. The
// parameter bridge (`params` / `set_param`) exposes each effect's settings as
// string key/value pairs; the host's persistence layer owns the wire format.
//
// Effect catalogue:
//   - palette_quantize: snap RGB to the nearest palette entry
//   - outline:          dilate the opaque silhouette with a solid color
//   - vignette:         tint pixels toward a color by center distance
//   - pixelate:         average n×n blocks into flat cells

pub mod outline;
pub mod palette;
pub mod pixelate;
pub mod vignette;

pub use outline::Outline;
pub use palette::PaletteQuantize;
pub use pixelate::Pixelate;
pub use vignette::Vignette;

/// A single post-processing step in a layer's effect stack.
///
/// `apply` mutates the buffer in place and is a no-op while the effect is
/// disabled. Implementations hold no state between passes; every invocation
/// is a complete, independent application.
pub trait Effect {
    /// Stable registration id, used by the factory and the persistence layer.
    fn id(&self) -> &'static str;

    /// Human-readable name. UI metadata only — no core behavior depends on it.
    fn display_name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Transform `pixels` (flat BGRA, `width * height * 4`) in place.
    fn apply(&self, pixels: &mut [u8], width: u32, height: u32);

    /// Current parameters as key/value pairs for the persistence bridge.
    fn params(&self) -> Vec<(String, String)>;

    /// Set one parameter from its string form. Returns `false` for unknown
    /// keys or unparseable values (the effect is left unchanged).
    fn set_param(&mut self, key: &str, value: &str) -> bool;
}

// ============================================================================
// Registry
// ============================================================================

/// Registration ids of every built-in effect, in catalogue order.
pub const EFFECT_IDS: &[&str] = &[
    palette::EFFECT_ID,
    outline::EFFECT_ID,
    vignette::EFFECT_ID,
    pixelate::EFFECT_ID,
];

/// Factory: instantiate an effect with default parameters from its
/// registration id. Returns `None` for unknown ids.
pub fn create_effect(id: &str) -> Option<Box<dyn Effect>> {
    match id {
        palette::EFFECT_ID => Some(Box::new(PaletteQuantize::default())),
        outline::EFFECT_ID => Some(Box::new(Outline::default())),
        vignette::EFFECT_ID => Some(Box::new(Vignette::default())),
        pixelate::EFFECT_ID => Some(Box::new(Pixelate::default())),
        _ => None,
    }
}

// ============================================================================
// Effect stack
// ============================================================================

/// Ordered list of effects owned by a layer. Index 0 applies first; each
/// effect reads the output of its predecessor.
///
/// Every structural mutation (add / remove / move / enable) bumps a version
/// counter; the render scheduler compares versions instead of subscribing to
/// change events.
#[derive(Default)]
pub struct EffectStack {
    effects: Vec<Box<dyn Effect>>,
    version: u64,
}

impl EffectStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter, bumped by every mutation of the stack.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Effect> {
        self.effects.get(index).map(|e| e.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn Effect>> {
        // Parameter edits go through here; the caller signals them via
        // `mark_changed` (parameter setters have no back-channel to the stack).
        self.effects.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    /// Append an effect at the end of the chain.
    pub fn add(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
        self.version += 1;
    }

    /// Remove and return the effect at `index`, or `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Effect>> {
        if index >= self.effects.len() {
            return None;
        }
        self.version += 1;
        Some(self.effects.remove(index))
    }

    /// Swap the effect at `index` one slot toward the front (applied earlier).
    /// Returns `true` when a move happened.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.effects.len() {
            return false;
        }
        self.effects.swap(index - 1, index);
        self.version += 1;
        true
    }

    /// Swap the effect at `index` one slot toward the back (applied later).
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.effects.len() {
            return false;
        }
        self.effects.swap(index, index + 1);
        self.version += 1;
        true
    }

    /// Enable or disable the effect at `index` without removing it; its
    /// parameters are preserved for later re-enabling.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.effects.get_mut(index) {
            Some(effect) => {
                effect.set_enabled(enabled);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Record an out-of-band parameter edit (done through `get_mut`) so the
    /// render scheduler re-composites.
    pub fn mark_changed(&mut self) {
        self.version += 1;
    }

    /// One complete composite pass: apply every enabled effect in list order,
    /// each observing the previous effect's output.
    pub fn apply_all(&self, pixels: &mut [u8], width: u32, height: u32) {
        for effect in &self.effects {
            effect.apply(pixels, width, height);
        }
    }
}

// ============================================================================
// Shared parameter parsing helpers
// ============================================================================

/// Parse a color parameter: `#RRGGBB`, `#RRGGBBAA`, or a bare decimal u32.
pub(crate) fn parse_color(value: &str) -> Option<u32> {
    if let Some(hex) = value.strip_prefix('#') {
        let (rgb, a) = match hex.len() {
            6 => (u32::from_str_radix(hex, 16).ok()?, 255u32),
            8 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                (v >> 8, v & 0xFF)
            }
            _ => return None,
        };
        let r = (rgb >> 16) & 0xFF;
        let g = (rgb >> 8) & 0xFF;
        let b = rgb & 0xFF;
        Some(crate::color::pack(b as u8, g as u8, r as u8, a as u8))
    } else {
        value.parse::<u32>().ok()
    }
}

/// Format a color parameter as `#RRGGBBAA` (inverse of [`parse_color`]).
pub(crate) fn format_color(color: u32) -> String {
    format!(
        "#{:02X}{:02X}{:02X}{:02X}",
        crate::color::get_r(color),
        crate::color::get_g(color),
        crate::color::get_b(color),
        crate::color::get_a(color),
    )
}
