// ============================================================================
// PixelFE — pixel-art imaging engine
// ============================================================================
//
// Core: a packed 32-bit BGRA color model (`color`), flat-buffer resampling
// and region primitives (`buffer`), and an ordered, extensible effect
// pipeline (`effects`) applied to a layer's rendered pixels before final
// compositing (`layer`).
//
// The engine is single-threaded and purely synchronous: every operation is a
// bounded pure function or in-place mutation over caller-owned buffers. File
// formats exist only at the CLI boundary (`io`, `cli`).

pub mod buffer;
pub mod cli;
pub mod color;
pub mod effects;
pub mod io;
pub mod layer;
pub mod logger;

pub use buffer::CroppedBuffer;
pub use effects::{Effect, EffectStack, create_effect};
pub use layer::Layer;
