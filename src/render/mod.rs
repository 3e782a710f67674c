/// Rendering module
///
/// This module turns editing state into pixels:
/// - Filter primitives, chains and presets (filters.rs)
/// - Frames and backgrounds (decor.rs)
/// - Built-in sticker art (palette.rs)
/// - Sticker sprites and glyphs (sticker.rs)
/// - The compositor that draws everything in order (composite.rs)

pub mod composite;
pub mod decor;
pub mod filters;
pub mod palette;
pub mod sticker;

pub use composite::{composed_filter, render, RenderInput};
pub use decor::{Background, Frame};
pub use filters::{FilterChain, FilterOp, FilterPreset};
pub use sticker::StickerAtlas;
