/// Filter primitives, filter chains and named presets
///
/// A filter chain is an ordered list of primitives written the way a CSS
/// `filter` property is written, e.g. `sepia(0.5) contrast(1.2)`. Presets
/// are fixed chains looked up by name.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color;
use crate::error::{CoverError, CoverResult};

/// A single filter primitive
///
/// Amounts are factors (1.0 = unchanged) except `HueRotate` (degrees) and
/// `Blur` (radius in pixels).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "op", content = "amount", rename_all = "kebab-case")]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Grayscale(f32),
    Sepia(f32),
    HueRotate(f32),
    Blur(f32),
}

impl FilterOp {
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
            FilterOp::HueRotate(_) => "hue-rotate",
            FilterOp::Blur(_) => "blur",
        }
    }

    /// Apply this primitive to every pixel of `image` in place.
    /// Alpha is left untouched.
    pub fn apply(&self, image: &mut RgbaImage) {
        match *self {
            FilterOp::Blur(radius) => {
                if radius > 0.0 {
                    *image = imageops::blur(&*image, radius);
                }
            }
            FilterOp::Brightness(amount) => {
                map_channels(image, |v| v * amount.max(0.0));
            }
            FilterOp::Contrast(amount) => {
                let amount = amount.max(0.0);
                map_channels(image, |v| (v - 0.5) * amount + 0.5);
            }
            FilterOp::Saturate(amount) => map_matrix(image, &color::saturate_matrix(amount)),
            FilterOp::Grayscale(amount) => map_matrix(image, &color::grayscale_matrix(amount)),
            FilterOp::Sepia(amount) => map_matrix(image, &color::sepia_matrix(amount)),
            FilterOp::HueRotate(degrees) => map_matrix(image, &color::hue_rotate_matrix(degrees)),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::Brightness(v)
            | FilterOp::Contrast(v)
            | FilterOp::Saturate(v)
            | FilterOp::Grayscale(v)
            | FilterOp::Sepia(v) => write!(f, "{}({})", self.name(), v),
            FilterOp::HueRotate(v) => write!(f, "hue-rotate({}deg)", v),
            FilterOp::Blur(v) => write!(f, "blur({}px)", v),
        }
    }
}

impl FromStr for FilterOp {
    type Err = CoverError;

    /// Parse one primitive such as `contrast(120%)` or `hue-rotate(30deg)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, rest) = s
            .split_once('(')
            .ok_or_else(|| CoverError::parse(format!("expected '(' in filter: {}", s)))?;
        let arg = rest
            .strip_suffix(')')
            .ok_or_else(|| CoverError::parse(format!("expected ')' in filter: {}", s)))?
            .trim();

        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "brightness" => Ok(FilterOp::Brightness(parse_amount(arg)?)),
            "contrast" => Ok(FilterOp::Contrast(parse_amount(arg)?)),
            "saturate" => Ok(FilterOp::Saturate(parse_amount(arg)?)),
            "grayscale" => Ok(FilterOp::Grayscale(parse_amount(arg)?)),
            "sepia" => Ok(FilterOp::Sepia(parse_amount(arg)?)),
            "hue-rotate" => Ok(FilterOp::HueRotate(parse_number(
                arg.strip_suffix("deg").unwrap_or(arg),
            )?)),
            "blur" => Ok(FilterOp::Blur(parse_number(
                arg.strip_suffix("px").unwrap_or(arg),
            )?)),
            other => Err(CoverError::parse(format!("unknown filter primitive: {}", other))),
        }
    }
}

fn parse_number(text: &str) -> CoverResult<f32> {
    text.trim()
        .parse::<f32>()
        .map_err(|_| CoverError::parse(format!("invalid number: {}", text)))
}

/// `1.2` and `120%` both mean a factor of 1.2
fn parse_amount(text: &str) -> CoverResult<f32> {
    match text.strip_suffix('%') {
        Some(percent) => Ok(parse_number(percent)? / 100.0),
        None => parse_number(text),
    }
}

fn map_channels(image: &mut RgbaImage, f: impl Fn(f32) -> f32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let v = f(*channel as f32 / 255.0).clamp(0.0, 1.0);
            *channel = (v * 255.0).round() as u8;
        }
    }
}

fn map_matrix(image: &mut RgbaImage, matrix: &cgmath::Matrix3<f32>) {
    if color::is_identity_matrix(matrix) {
        return;
    }
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let out = color::apply_matrix(
            matrix,
            [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
        );
        for (channel, v) in pixel.0.iter_mut().zip(out) {
            *channel = (v * 255.0).round() as u8;
        }
    }
}

/// Ordered list of filter primitives
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    pub ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn new(ops: Vec<FilterOp>) -> Self {
        Self { ops }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append another chain after this one
    pub fn then(mut self, other: impl IntoIterator<Item = FilterOp>) -> Self {
        self.ops.extend(other);
        self
    }

    /// Apply every primitive in order. Each step clamps its output, the
    /// same way a browser composes filter functions.
    pub fn apply(&self, image: &mut RgbaImage) {
        for op in &self.ops {
            op.apply(image);
        }
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

impl FromStr for FilterChain {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }

        // Primitives end at ')' so split there rather than on whitespace
        let mut ops = Vec::new();
        let mut rest = s;
        while let Some(end) = rest.find(')') {
            ops.push(rest[..=end].parse()?);
            rest = rest[end + 1..].trim_start();
        }
        if !rest.is_empty() {
            return Err(CoverError::parse(format!("trailing filter text: {}", rest)));
        }
        Ok(Self { ops })
    }
}

/// Named filter presets
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterPreset {
    #[default]
    None,
    Vintage,
    #[serde(alias = "noir")]
    Bw,
    Sepia,
    Vibrant,
    Cool,
    Warm,
    Retro,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 8] = [
        FilterPreset::None,
        FilterPreset::Vintage,
        FilterPreset::Bw,
        FilterPreset::Sepia,
        FilterPreset::Vibrant,
        FilterPreset::Cool,
        FilterPreset::Warm,
        FilterPreset::Retro,
    ];

    /// Look up a preset by name. Unknown names give the identity preset.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "vintage" => FilterPreset::Vintage,
            "bw" | "noir" => FilterPreset::Bw,
            "sepia" => FilterPreset::Sepia,
            "vibrant" => FilterPreset::Vibrant,
            "cool" => FilterPreset::Cool,
            "warm" => FilterPreset::Warm,
            "retro" => FilterPreset::Retro,
            _ => FilterPreset::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterPreset::None => "none",
            FilterPreset::Vintage => "vintage",
            FilterPreset::Bw => "bw",
            FilterPreset::Sepia => "sepia",
            FilterPreset::Vibrant => "vibrant",
            FilterPreset::Cool => "cool",
            FilterPreset::Warm => "warm",
            FilterPreset::Retro => "retro",
        }
    }

    /// Label shown in the gallery
    pub fn display_name(self) -> &'static str {
        match self {
            FilterPreset::None => "Original",
            FilterPreset::Vintage => "Vintage",
            FilterPreset::Bw => "B&W",
            FilterPreset::Sepia => "Sepia",
            FilterPreset::Vibrant => "Vibrant",
            FilterPreset::Cool => "Cool",
            FilterPreset::Warm => "Warm",
            FilterPreset::Retro => "Retro",
        }
    }

    pub fn ops(self) -> Vec<FilterOp> {
        use FilterOp::*;
        match self {
            FilterPreset::None => vec![],
            FilterPreset::Vintage => vec![Sepia(0.5), Contrast(1.2), Brightness(0.9)],
            FilterPreset::Bw => vec![Grayscale(1.0), Contrast(1.1)],
            FilterPreset::Sepia => vec![Sepia(1.0)],
            FilterPreset::Vibrant => vec![Saturate(1.5), Contrast(1.2), Brightness(1.1)],
            FilterPreset::Cool => vec![HueRotate(180.0), Saturate(1.2)],
            FilterPreset::Warm => vec![HueRotate(30.0), Saturate(1.1)],
            FilterPreset::Retro => vec![Sepia(0.3), Saturate(1.4), Contrast(1.1)],
        }
    }

    pub fn chain(self) -> FilterChain {
        FilterChain::new(self.ops())
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba(rgba))
    }

    #[test]
    fn test_preset_css_strings() {
        assert_eq!(
            FilterPreset::Vintage.chain().to_string(),
            "sepia(0.5) contrast(1.2) brightness(0.9)"
        );
        assert_eq!(FilterPreset::Cool.chain().to_string(), "hue-rotate(180deg) saturate(1.2)");
        assert_eq!(FilterPreset::None.chain().to_string(), "none");
    }

    #[test]
    fn test_unknown_preset_falls_back_to_none() {
        assert_eq!(FilterPreset::from_name("polaroid"), FilterPreset::None);
        assert_eq!(FilterPreset::from_name("NOIR"), FilterPreset::Bw);
        assert_eq!(FilterPreset::from_name("custom").display_name(), "Original");
    }

    #[test]
    fn test_parse_chain() {
        let chain: FilterChain = "brightness(120%) hue-rotate(30deg)  blur(2px)".parse().unwrap();
        assert_eq!(
            chain.ops,
            vec![FilterOp::Brightness(1.2), FilterOp::HueRotate(30.0), FilterOp::Blur(2.0)]
        );
        assert!("none".parse::<FilterChain>().unwrap().is_empty());
        assert!("brightness(1.2) bogus".parse::<FilterChain>().is_err());
        assert!("wobble(3)".parse::<FilterChain>().is_err());
    }

    #[test]
    fn test_every_preset_string_parses_back() {
        for preset in FilterPreset::ALL {
            let text = preset.chain().to_string();
            let parsed: FilterChain = text.parse().unwrap();
            assert_eq!(parsed, preset.chain(), "preset {}", preset);
        }
    }

    #[test]
    fn test_brightness_scales_and_clamps() {
        let mut img = solid([100, 200, 50, 255]);
        FilterOp::Brightness(2.0).apply(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [200, 255, 100, 255]);
    }

    #[test]
    fn test_contrast_zero_gives_mid_gray() {
        let mut img = solid([10, 240, 77, 128]);
        FilterOp::Contrast(0.0).apply(&mut img);
        assert_eq!(img.get_pixel(1, 1).0, [128, 128, 128, 128]);
    }

    #[test]
    fn test_grayscale_preset_removes_color() {
        let mut img = solid([200, 40, 90, 255]);
        FilterOp::Grayscale(1.0).apply(&mut img);
        let [r, g, b, a] = img.get_pixel(2, 2).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let mut img = solid([10, 20, 30, 255]);
        FilterOp::Blur(2.0).apply(&mut img);
        assert_eq!(img.dimensions(), (4, 4));
    }
}
