/// Built-in sticker art
///
/// Each emoji in the sticker palette gets a small procedural sprite, so
/// stickers render without a font. Shapes are tested in normalized
/// coordinates (-1..1 on both axes, y down) and supersampled for soft edges.

use image::{Rgba, RgbaImage};
use std::f32::consts::{PI, TAU};

/// Edge length of generated sprites
pub const SPRITE_SIZE: u32 = 64;

/// Samples per axis per pixel
const SAMPLES: u32 = 4;

const FACE: [u8; 4] = [0xff, 0xcc, 0x4d, 255];
const INK: [u8; 4] = [0x3d, 0x2b, 0x1f, 255];
const FLAME: [u8; 4] = [0xff, 0x6b, 0x1a, 255];
const FLAME_CORE: [u8; 4] = [0xff, 0xd2, 0x3f, 255];
const SUN: [u8; 4] = [0xff, 0xb3, 0x00, 255];
const MOON: [u8; 4] = [0xf1, 0xc4, 0x0f, 255];
const BOLT: [u8; 4] = [0xf7, 0xd0, 0x2c, 255];
const RAINBOW: [[u8; 4]; 4] = [
    [0xe7, 0x4c, 0x3c, 255],
    [0xf3, 0x9c, 0x12, 255],
    [0x2e, 0xcc, 0x71, 255],
    [0x34, 0x98, 0xdb, 255],
];

/// Lightning bolt outline, clockwise
const BOLT_OUTLINE: [(f32, f32); 6] = [
    (0.15, -0.95),
    (-0.55, 0.1),
    (-0.05, 0.1),
    (-0.2, 0.95),
    (0.55, -0.15),
    (0.05, -0.15),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Art {
    Face,
    Heart([u8; 4]),
    Star { color: [u8; 4], points: u32, inner: f32 },
    Disc([u8; 4]),
    Flame,
    Sun,
    Moon,
    Bolt,
    Rainbow,
}

/// Variation selectors don't change which art is drawn
fn art_for(content: &str) -> Option<Art> {
    let key: String = content.trim().chars().filter(|c| *c != '\u{FE0F}').collect();
    let art = match key.as_str() {
        "😀" | "😂" | "🥰" | "😎" | "🤔" | "😴" | "🤗" | "🙃" => Art::Face,
        "❤" => Art::Heart([0xe7, 0x4c, 0x3c, 255]),
        "💕" => Art::Heart([0xff, 0x6b, 0x9d, 255]),
        "💖" => Art::Heart([0xff, 0x4d, 0xa6, 255]),
        "⭐" => Art::Star { color: [0xff, 0xcc, 0x00, 255], points: 5, inner: 0.45 },
        "🌟" => Art::Star { color: [0xff, 0xd7, 0x00, 255], points: 5, inner: 0.55 },
        "✨" => Art::Star { color: [0xff, 0xe0, 0x66, 255], points: 4, inner: 0.3 },
        "💯" => Art::Disc([0xe7, 0x4c, 0x3c, 255]),
        "🎉" => Art::Disc([0xf3, 0x9c, 0x12, 255]),
        "🎊" => Art::Disc([0x9b, 0x59, 0xb6, 255]),
        "🎈" => Art::Disc([0xe7, 0x4c, 0x3c, 255]),
        "🎀" => Art::Disc([0xff, 0x6b, 0x9d, 255]),
        "🔥" => Art::Flame,
        "☀" => Art::Sun,
        "🌙" => Art::Moon,
        "⚡" => Art::Bolt,
        "🌈" => Art::Rainbow,
        _ => return None,
    };
    Some(art)
}

/// Sprite for a palette sticker, None for anything else
pub fn palette_sprite(content: &str) -> Option<RgbaImage> {
    art_for(content).map(|art| draw(art, SPRITE_SIZE))
}

fn draw(art: Art, size: u32) -> RgbaImage {
    let total = SAMPLES * SAMPLES;
    RgbaImage::from_fn(size, size, |px, py| {
        let mut sum = [0u32; 3];
        let mut hits = 0u32;
        for sy in 0..SAMPLES {
            for sx in 0..SAMPLES {
                let x = (px as f32 + (sx as f32 + 0.5) / SAMPLES as f32) / size as f32 * 2.0 - 1.0;
                let y = (py as f32 + (sy as f32 + 0.5) / SAMPLES as f32) / size as f32 * 2.0 - 1.0;
                if let Some(color) = sample(art, x, y) {
                    for (acc, c) in sum.iter_mut().zip(color) {
                        *acc += c as u32;
                    }
                    hits += 1;
                }
            }
        }
        if hits == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([
            (sum[0] / hits) as u8,
            (sum[1] / hits) as u8,
            (sum[2] / hits) as u8,
            (hits * 255 / total) as u8,
        ])
    })
}

fn sample(art: Art, x: f32, y: f32) -> Option<[u8; 4]> {
    let r = (x * x + y * y).sqrt();
    match art {
        Art::Disc(color) => (r <= 0.85).then_some(color),
        Art::Face => {
            if r > 0.9 {
                return None;
            }
            let eye = |ex: f32| ((x - ex).powi(2) + (y + 0.25).powi(2)).sqrt() <= 0.12;
            let mouth = y > 0.15 && (0.45..=0.6).contains(&r);
            Some(if eye(-0.32) || eye(0.32) || mouth { INK } else { FACE })
        }
        Art::Heart(color) => in_heart(x, y).then_some(color),
        Art::Star { color, points, inner } => in_polygon(x, y, &star_outline(points, 0.95, 0.95 * inner)).then_some(color),
        Art::Flame => {
            let body = (x * x + (y - 0.3).powi(2)).sqrt() <= 0.6;
            let tip = (-0.95..0.3).contains(&y) && x.abs() <= 0.6 * (y + 0.95) / 1.25;
            if !(body || tip) {
                return None;
            }
            let core = (x * x + (y - 0.4).powi(2)).sqrt() <= 0.3;
            Some(if core { FLAME_CORE } else { FLAME })
        }
        Art::Sun => {
            if r <= 0.5 {
                return Some(SUN);
            }
            // Eight rays, each centered in its sector
            let sector = TAU / 8.0;
            let off_center = (y.atan2(x).rem_euclid(sector) - sector / 2.0).abs();
            ((0.6..=0.92).contains(&r) && off_center < 0.14).then_some(SUN)
        }
        Art::Moon => {
            let bite = ((x - 0.35).powi(2) + (y + 0.2).powi(2)).sqrt();
            (r <= 0.85 && bite > 0.65).then_some(MOON)
        }
        Art::Bolt => in_polygon(x, y, &BOLT_OUTLINE).then_some(BOLT),
        Art::Rainbow => {
            // Arcs centered below the middle, red outermost
            let ry = (x * x + (y - 0.35).powi(2)).sqrt();
            if y > 0.35 || !(0.35..0.95).contains(&ry) {
                return None;
            }
            let band = (((ry - 0.35) / 0.15) as usize).min(3);
            Some(RAINBOW[3 - band])
        }
    }
}

/// Implicit heart curve (x²+y²-1)³ - x²y³ <= 0, point down
fn in_heart(x: f32, y: f32) -> bool {
    let scale = 0.95 / 1.2;
    let nx = x.abs() / scale;
    let ny = -y / scale + 0.2;
    let a = nx * nx + ny * ny - 1.0;
    a * a * a - nx * nx * ny * ny * ny <= 0.0
}

/// Star with `points` tips, first tip pointing up
fn star_outline(points: u32, outer: f32, inner: f32) -> Vec<(f32, f32)> {
    (0..points * 2)
        .map(|i| {
            let angle = -PI / 2.0 + i as f32 * PI / points as f32;
            let radius = if i % 2 == 0 { outer } else { inner };
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Even-odd ray casting
fn in_polygon(x: f32, y: f32, outline: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = outline.len() - 1;
    for i in 0..outline.len() {
        let (xi, yi) = outline[i];
        let (xj, yj) = outline[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
