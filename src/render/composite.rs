/// Compositing the editing session into a bitmap
///
/// Rendering is a pure function of its inputs. Drawing order:
/// 1. background fill (if any)
/// 2. base image through the composed filter chain (preset, then sliders)
/// 3. layers, in list order, each positioned and rotated independently
/// 4. frame stroke
/// 5. noise post-process, when the noise adjustment is nonzero

use cgmath::{Matrix2, Rad, Vector2};
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use super::filters::FilterChain;
use super::sticker::StickerAtlas;
use crate::state::data::EditState;
use crate::state::layer::{Layer, Sticker};

/// Everything the compositor reads
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Base image, already scaled to the canvas size
    pub image: &'a RgbaImage,
    pub state: &'a EditState,
    /// Seed for the noise post-process
    pub noise_seed: u64,
}

/// The filter chain drawn over the base image: preset first, then sliders
pub fn composed_filter(state: &EditState) -> FilterChain {
    state.preset.chain().then(state.adjustments.filter_ops())
}

/// Render the composite bitmap
pub fn render(input: RenderInput<'_>, atlas: &StickerAtlas) -> RgbaImage {
    let mut base = input.image.clone();
    composed_filter(input.state).apply(&mut base);

    let mut canvas = match &input.state.background {
        None => base,
        Some(background) => {
            let (width, height) = base.dimensions();
            let mut canvas = RgbaImage::new(width, height);
            background.fill(&mut canvas);
            for (dst, src) in canvas.pixels_mut().zip(base.pixels()) {
                blend(dst, *src);
            }
            canvas
        }
    };

    for layer in &input.state.layers {
        draw_layer(&mut canvas, layer, atlas);
    }

    input.state.frame.draw(&mut canvas);

    if input.state.adjustments.noise != 0 {
        add_noise(&mut canvas, input.state.adjustments.noise, input.noise_seed);
    }

    canvas
}

fn draw_layer(canvas: &mut RgbaImage, layer: &Layer, atlas: &StickerAtlas) {
    match layer {
        Layer::Sticker(sticker) => draw_sticker(canvas, sticker, atlas),
    }
}

/// Draw a sticker centered on (x, y), rotated about its center
fn draw_sticker(canvas: &mut RgbaImage, sticker: &Sticker, atlas: &StickerAtlas) {
    let w = sticker.width.round().max(0.0) as u32;
    let h = sticker.height.round().max(0.0) as u32;
    let Some(sprite) = atlas.rasterize(&sticker.content, w, h) else {
        warn!("Skipping sticker {} ({:?}): no sprite or font glyph", sticker.id, sticker.content);
        return;
    };

    // Map each canvas pixel back into sprite space with the inverse rotation
    let inverse = Matrix2::from_angle(Rad(-sticker.rotation));
    let (half_w, half_h) = (w as f32 / 2.0, h as f32 / 2.0);

    // Bounding box of the rotated sprite; the diagonal bounds any rotation
    let reach = (half_w * half_w + half_h * half_h).sqrt();
    let min_x = (sticker.x - reach).floor().max(0.0) as u32;
    let min_y = (sticker.y - reach).floor().max(0.0) as u32;
    let max_x = ((sticker.x + reach).ceil().max(0.0) as u32).min(canvas.width());
    let max_y = ((sticker.y + reach).ceil().max(0.0) as u32).min(canvas.height());

    for cy in min_y..max_y {
        for cx in min_x..max_x {
            let offset = Vector2::new(cx as f32 + 0.5 - sticker.x, cy as f32 + 0.5 - sticker.y);
            let local = inverse * offset;
            let sx = local.x + half_w;
            let sy = local.y + half_h;
            if sx < 0.0 || sy < 0.0 || sx >= w as f32 || sy >= h as f32 {
                continue;
            }
            let src = *sprite.get_pixel(sx as u32, sy as u32);
            blend(canvas.get_pixel_mut(cx, cy), src);
        }
    }
}

/// Source-over alpha blending
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let s = src.0[i] as f32 / 255.0;
        let d = dst.0[i] as f32 / 255.0;
        let c = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst.0[i] = (c * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

/// Shift each pixel's R, G and B by one shared random amount in
/// [-noise/2, noise/2], clamped to [0, 255]. Alpha is untouched.
fn add_noise(canvas: &mut RgbaImage, noise: i32, seed: u64) {
    let amplitude = noise as f32;
    let mut rng = StdRng::seed_from_u64(seed);
    for pixel in canvas.pixels_mut() {
        let shift = (rng.gen::<f32>() - 0.5) * amplitude;
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (*channel as f32 + shift).round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::decor::{Background, Frame};
    use crate::render::filters::{FilterOp, FilterPreset};
    use crate::state::layer::LayerId;

    fn gray(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([128, 128, 128, 255]))
    }

    fn red_atlas() -> StickerAtlas {
        let mut atlas = StickerAtlas::new();
        atlas.register("🔴", RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        atlas
    }

    #[test]
    fn test_neutral_state_reproduces_image() {
        let image = gray(16, 12);
        let state = EditState::default();
        let out = render(RenderInput { image: &image, state: &state, noise_seed: 1 }, &StickerAtlas::new());
        assert_eq!(out, image);
    }

    #[test]
    fn test_preset_then_sliders() {
        let mut state = EditState::default();
        state.preset = FilterPreset::Sepia;
        state.adjustments.brightness = 50;
        assert_eq!(
            composed_filter(&state).ops,
            vec![FilterOp::Sepia(1.0), FilterOp::Brightness(0.5)]
        );
    }

    #[test]
    fn test_background_shows_through_transparency() {
        let image = RgbaImage::new(8, 8);
        let mut state = EditState::default();
        state.background = Some(Background::Color { rgba: [10, 20, 30, 255] });
        let out = render(RenderInput { image: &image, state: &state, noise_seed: 0 }, &StickerAtlas::new());
        assert_eq!(out.get_pixel(4, 4).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_sticker_drawn_at_position() {
        let image = gray(100, 100);
        let mut state = EditState::default();
        let mut sticker = Sticker::centered(LayerId(1), "🔴", 30.0, 70.0);
        sticker.width = 10.0;
        sticker.height = 10.0;
        state.layers.push(sticker.into());

        let out = render(RenderInput { image: &image, state: &state, noise_seed: 0 }, &red_atlas());
        assert_eq!(out.get_pixel(30, 70).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(50, 50).0, [128, 128, 128, 255]);
        assert_eq!(out.get_pixel(30, 80).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_rotated_sticker_changes_footprint() {
        let image = gray(100, 100);
        let mut state = EditState::default();
        let mut sticker = Sticker::centered(LayerId(1), "🔴", 50.0, 50.0);
        sticker.width = 40.0;
        sticker.height = 4.0;
        state.layers.push(sticker.clone().into());

        let flat = render(RenderInput { image: &image, state: &state, noise_seed: 0 }, &red_atlas());
        assert_eq!(flat.get_pixel(65, 50).0, [255, 0, 0, 255]);
        assert_eq!(flat.get_pixel(50, 65).0, [128, 128, 128, 255]);

        sticker.rotation = std::f32::consts::FRAC_PI_2;
        state.layers = vec![sticker.into()];
        let turned = render(RenderInput { image: &image, state: &state, noise_seed: 0 }, &red_atlas());
        assert_eq!(turned.get_pixel(50, 65).0, [255, 0, 0, 255]);
        assert_eq!(turned.get_pixel(65, 50).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_unresolvable_sticker_is_skipped() {
        let image = gray(20, 20);
        let mut state = EditState::default();
        state.layers.push(Sticker::centered(LayerId(1), "🦀", 10.0, 10.0).into());
        let out = render(RenderInput { image: &image, state: &state, noise_seed: 0 }, &StickerAtlas::new());
        assert_eq!(out, image);
    }

    #[test]
    fn test_frame_drawn_over_layers() {
        let image = gray(50, 50);
        let mut state = EditState::default();
        state.frame = Frame::Modern;
        state.layers.push(Sticker::centered(LayerId(1), "🔴", 2.0, 2.0).into());
        let out = render(RenderInput { image: &image, state: &state, noise_seed: 0 }, &red_atlas());
        assert_eq!(out.get_pixel(2, 2).0, [0x2c, 0x3e, 0x50, 255]);
    }

    #[test]
    fn test_noise_is_bounded_and_deterministic() {
        let image = gray(32, 32);
        let mut state = EditState::default();
        state.adjustments.noise = 40;

        let input = RenderInput { image: &image, state: &state, noise_seed: 99 };
        let a = render(input, &StickerAtlas::new());
        let b = render(input, &StickerAtlas::new());
        assert_eq!(a, b);
        assert_ne!(a, image);

        for pixel in a.pixels() {
            let [r, g, bl, alpha] = pixel.0;
            assert!((108..=148).contains(&r));
            assert_eq!(r, g);
            assert_eq!(g, bl);
            assert_eq!(alpha, 255);
        }
    }

    #[test]
    fn test_noise_clamps_at_extremes() {
        let image = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 255, 255]));
        let mut state = EditState::default();
        state.adjustments.noise = 600;
        let out = render(RenderInput { image: &image, state: &state, noise_seed: 5 }, &StickerAtlas::new());
        // Stored value is never clamped; only the derived pixels are
        assert_eq!(state.adjustments.noise, 600);
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }
}
