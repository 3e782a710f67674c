/// Sticker rasterization
///
/// Sticker content is looked up in two places, in order:
/// 1. registered sprites (the built-in palette art, or custom PNGs)
/// 2. glyph outlines from an optional font
///
/// Content found in neither is skipped by the compositor.

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::palette::palette_sprite;
use crate::error::{CoverError, CoverResult};
use crate::state::layer::STICKER_PALETTE;

/// Fill color for font-rendered glyphs
const GLYPH_COLOR: [u8; 3] = [0, 0, 0];

/// Sprite and font sources for sticker content
#[derive(Default, Clone)]
pub struct StickerAtlas {
    sprites: HashMap<String, RgbaImage>,
    font: Option<FontArc>,
}

impl StickerAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atlas with art for every palette sticker
    pub fn with_palette() -> Self {
        let mut atlas = Self::new();
        for content in STICKER_PALETTE {
            let Some(sprite) = palette_sprite(content) else {
                continue;
            };
            let bare: String = content.chars().filter(|c| *c != '\u{FE0F}').collect();
            if bare != content {
                atlas.register(bare, sprite.clone());
            }
            atlas.register(content, sprite);
        }
        debug!("Sticker atlas holds {} built-in sprites", atlas.sprites.len());
        atlas
    }

    /// Register a sprite for a given sticker content
    pub fn register(&mut self, content: impl Into<String>, sprite: RgbaImage) {
        self.sprites.insert(content.into(), sprite);
    }

    /// Use `bytes` (TrueType/OpenType) for content with no sprite
    pub fn set_font(&mut self, bytes: Vec<u8>) -> CoverResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| CoverError::Font)?;
        self.font = Some(font);
        Ok(())
    }

    /// Load a font file for glyph rendering
    pub fn load_font(&mut self, path: &Path) -> CoverResult<()> {
        let bytes = std::fs::read(path)?;
        self.set_font(bytes)?;
        info!("Loaded sticker font from {}", path.display());
        Ok(())
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Rasterize `content` at the given size, or None if it cannot be drawn
    pub fn rasterize(&self, content: &str, width: u32, height: u32) -> Option<RgbaImage> {
        if width == 0 || height == 0 {
            return None;
        }

        if let Some(sprite) = self.sprites.get(content) {
            return Some(imageops::resize(sprite, width, height, FilterType::Triangle));
        }

        let font = self.font.as_ref()?;
        let glyphs = rasterize_text(font, content, height as f32)?;
        Some(imageops::resize(&glyphs, width, height, FilterType::Triangle))
    }
}

impl std::fmt::Debug for StickerAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickerAtlas")
            .field("sprites", &self.sprites.len())
            .field("font", &self.font.is_some())
            .finish()
    }
}

/// Lay out `content` on one line and draw its coverage into a new image
fn rasterize_text(font: &FontArc, content: &str, px: f32) -> Option<RgbaImage> {
    let scaled = font.as_scaled(PxScale::from(px));

    let mut caret = 0.0;
    let mut glyphs = Vec::new();
    for ch in content.chars() {
        // Variation selectors and joiners have no outline of their own
        if ch.is_control() || matches!(ch, '\u{FE0F}' | '\u{200D}') {
            continue;
        }
        let mut glyph = scaled.scaled_glyph(ch);
        glyph.position = point(caret, scaled.ascent());
        caret += scaled.h_advance(glyph.id);
        glyphs.push(glyph);
    }

    let width = caret.ceil() as u32;
    let height = px.ceil() as u32;
    if glyphs.is_empty() || width == 0 || height == 0 {
        return None;
    }

    let mut out = RgbaImage::new(width, height);
    let mut drawn = false;
    for glyph in glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            let pixel = out.get_pixel_mut(x as u32, y as u32);
            if alpha > pixel.0[3] {
                *pixel = Rgba([GLYPH_COLOR[0], GLYPH_COLOR[1], GLYPH_COLOR[2], alpha]);
            }
        });
        drawn = true;
    }

    if !drawn {
        debug!("No outlines for sticker content {:?}", content);
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_sprite_is_resized() {
        let mut atlas = StickerAtlas::new();
        atlas.register("⭐", RgbaImage::from_pixel(8, 8, Rgba([250, 200, 0, 255])));

        let sprite = atlas.rasterize("⭐", 20, 30).unwrap();
        assert_eq!(sprite.dimensions(), (20, 30));
        assert_eq!(sprite.get_pixel(10, 15).0, [250, 200, 0, 255]);
    }

    #[test]
    fn test_unknown_content_without_font() {
        let atlas = StickerAtlas::new();
        assert!(!atlas.has_font());
        assert!(atlas.rasterize("🦀", 60, 60).is_none());
    }

    #[test]
    fn test_palette_atlas_draws_every_palette_sticker() {
        let atlas = StickerAtlas::with_palette();
        assert!(!atlas.has_font());
        for content in STICKER_PALETTE {
            let sprite = atlas.rasterize(content, 60, 60);
            assert!(sprite.is_some_and(|s| s.pixels().any(|p| p.0[3] > 0)), "{} did not render", content);
        }
        // Content typed without the variation selector still resolves
        assert!(atlas.rasterize("❤", 60, 60).is_some());
        assert!(atlas.rasterize("🦀", 60, 60).is_none());
    }

    #[test]
    fn test_zero_size_is_none() {
        let mut atlas = StickerAtlas::new();
        atlas.register("x", RgbaImage::new(2, 2));
        assert!(atlas.rasterize("x", 0, 10).is_none());
    }

    #[test]
    fn test_invalid_font_bytes() {
        let mut atlas = StickerAtlas::new();
        assert!(matches!(atlas.set_font(vec![0, 1, 2, 3]), Err(CoverError::Font)));
        assert!(!atlas.has_font());
    }
}
