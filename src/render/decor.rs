/// Frames and backgrounds
///
/// A background fills the canvas behind the base image (visible through
/// transparent pixels). A frame is a stroke drawn around the canvas edge on
/// top of everything but the noise post-process.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::{lerp_rgba, parse_hex};
use crate::error::CoverError;

/// Base stroke width of the frames, in canvas pixels
const FRAME_WIDTH: f32 = 10.0;

/// Solid colors offered as backgrounds
pub const BACKGROUND_COLORS: [&str; 15] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#feca57", "#a8e6cf",
    "#f8b500", "#ff9ff3", "#54a0ff", "#5f27cd", "#00d2d3",
    "#ff9f43", "#ff6348", "#2ed573", "#3742fa", "#f1c40f",
];

/// Gradients offered as backgrounds
pub const BACKGROUND_GRADIENTS: [&str; 8] = [
    "linear-gradient(45deg, #ff6b6b, #feca57)",
    "linear-gradient(45deg, #4ecdc4, #45b7d1)",
    "linear-gradient(45deg, #a8e6cf, #dcedc8)",
    "linear-gradient(45deg, #ff9a9e, #fecfef)",
    "linear-gradient(45deg, #667eea, #764ba2)",
    "linear-gradient(45deg, #f093fb, #f5576c)",
    "linear-gradient(45deg, #4facfe, #00f2fe)",
    "linear-gradient(45deg, #43e97b, #38f9d7)",
];

/// Frame styles
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    #[default]
    None,
    Classic,
    Modern,
    Vintage,
}

impl Frame {
    pub const ALL: [Frame; 4] = [Frame::None, Frame::Classic, Frame::Modern, Frame::Vintage];

    /// Look up a frame by name. Unknown names give no frame.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Frame::Classic,
            "modern" => Frame::Modern,
            "vintage" => Frame::Vintage,
            _ => Frame::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Frame::None => "none",
            Frame::Classic => "classic",
            Frame::Modern => "modern",
            Frame::Vintage => "vintage",
        }
    }

    /// Stroke the frame onto the canvas
    pub fn draw(self, canvas: &mut RgbaImage) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let half = FRAME_WIDTH / 2.0;
        match self {
            Frame::None => {}
            Frame::Classic => {
                let brown = [0x8B, 0x45, 0x13, 255];
                stroke_rect(canvas, (half, half, w - FRAME_WIDTH, h - FRAME_WIDTH), FRAME_WIDTH, |_, _| brown);
            }
            Frame::Modern => {
                let slate = [0x2c, 0x3e, 0x50, 255];
                stroke_rect(canvas, (half, half, w - FRAME_WIDTH, h - FRAME_WIDTH), FRAME_WIDTH, |_, _| slate);
            }
            Frame::Vintage => {
                let from = [0x8B, 0x45, 0x13, 255];
                let to = [0xDE, 0xB8, 0x87, 255];
                let width = FRAME_WIDTH * 1.5;
                let rect = (half, half, w - width, h - width);
                // Gradient runs along the top-left to bottom-right diagonal
                let norm = (w * w + h * h).max(1.0);
                stroke_rect(canvas, rect, width, |x, y| {
                    lerp_rgba(from, to, (x * w + y * h) / norm)
                });
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Paint every pixel whose center lies within `line_width / 2` of the
/// outline of `rect` (x, y, width, height)
fn stroke_rect(
    canvas: &mut RgbaImage,
    rect: (f32, f32, f32, f32),
    line_width: f32,
    paint: impl Fn(f32, f32) -> [u8; 4],
) {
    let (rx, ry, rw, rh) = rect;
    let half = line_width / 2.0;
    let (left, top, right, bottom) = (rx, ry, rx + rw, ry + rh);

    for (px, py, pixel) in canvas.enumerate_pixels_mut() {
        let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
        let within_outer = x >= left - half && x <= right + half && y >= top - half && y <= bottom + half;
        let within_inner = x > left + half && x < right - half && y > top + half && y < bottom - half;
        if within_outer && !within_inner {
            *pixel = Rgba(paint(x, y));
        }
    }
}

/// Canvas background fill
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Background {
    Color { rgba: [u8; 4] },
    Gradient { angle: f32, stops: Vec<[u8; 4]> },
}

impl Background {
    /// Fill the whole canvas
    pub fn fill(&self, canvas: &mut RgbaImage) {
        match self {
            Background::Color { rgba } => {
                for pixel in canvas.pixels_mut() {
                    *pixel = Rgba(*rgba);
                }
            }
            Background::Gradient { angle, stops } => {
                let (w, h) = (canvas.width() as f32, canvas.height() as f32);
                // CSS convention: 0deg points up, angles grow clockwise
                let (sin, cos) = angle.to_radians().sin_cos();
                let (dx, dy) = (sin, -cos);
                let length = (w * sin).abs() + (h * cos).abs();
                let (cx, cy) = (w / 2.0, h / 2.0);

                for (px, py, pixel) in canvas.enumerate_pixels_mut() {
                    let (x, y) = (px as f32 + 0.5 - cx, py as f32 + 0.5 - cy);
                    let t = if length > 0.0 {
                        (x * dx + y * dy) / length + 0.5
                    } else {
                        0.0
                    };
                    *pixel = Rgba(sample_stops(stops, t));
                }
            }
        }
    }
}

/// Evenly spaced stops, as in a CSS gradient without explicit positions
fn sample_stops(stops: &[[u8; 4]], t: f32) -> [u8; 4] {
    match stops {
        [] => [0, 0, 0, 0],
        [only] => *only,
        _ => {
            let segments = (stops.len() - 1) as f32;
            let scaled = t.clamp(0.0, 1.0) * segments;
            let index = (scaled.floor() as usize).min(stops.len() - 2);
            lerp_rgba(stops[index], stops[index + 1], scaled - index as f32)
        }
    }
}

impl FromStr for Background {
    type Err = CoverError;

    /// Accepts `#rrggbb` or `linear-gradient(<angle>deg, #c1, #c2, ...)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rgba) = parse_hex(s) {
            return Ok(Background::Color { rgba });
        }

        let inner = s
            .strip_prefix("linear-gradient(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| CoverError::parse(format!("unsupported background: {}", s)))?;

        let mut parts = inner.split(',').map(str::trim).peekable();
        let mut angle = 180.0;
        if let Some(first) = parts.peek() {
            if let Some(degrees) = first.strip_suffix("deg") {
                angle = degrees
                    .trim()
                    .parse()
                    .map_err(|_| CoverError::parse(format!("invalid gradient angle: {}", first)))?;
                parts.next();
            }
        }

        let stops = parts
            .map(|part| {
                parse_hex(part).ok_or_else(|| CoverError::parse(format!("invalid gradient color: {}", part)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if stops.len() < 2 {
            return Err(CoverError::parse("a gradient needs at least two colors"));
        }

        Ok(Background::Gradient { angle, stops })
    }
}
