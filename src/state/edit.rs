/// Adjustment parameters for the editing session
///
/// The adjustment set is the slider state of the editor. Every parameter
/// is always present; there is no partial set. Values are stored exactly as
/// given, even outside the slider ranges: clamping happens on derived pixel
/// values during rendering, never on the stored parameter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoverError;
use crate::render::filters::FilterOp;

/// All slider adjustments for an image
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentSet {
    // ========== Tone ==========

    /// Brightness in percent (100 = unchanged)
    pub brightness: i32,

    /// Contrast in percent (100 = unchanged)
    pub contrast: i32,

    // ========== Color ==========

    /// Saturation in percent
    /// - 0 = grayscale, 100 = original, 200 = double saturation
    pub saturation: i32,

    /// Hue rotation in degrees (0 = unchanged)
    pub hue: i32,

    // ========== Effects ==========

    /// Noise amplitude (0 = off). Each pixel is shifted by a random
    /// amount in [-noise/2, noise/2].
    pub noise: i32,

    /// Blur radius in pixels (0 = off)
    pub blur: i32,
}

impl Default for AdjustmentSet {
    /// Neutral adjustments: percentages at 100, offsets at 0
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
            hue: 0,
            noise: 0,
            blur: 0,
        }
    }
}

impl AdjustmentSet {
    pub fn get(&self, kind: AdjustmentKind) -> i32 {
        match kind {
            AdjustmentKind::Brightness => self.brightness,
            AdjustmentKind::Contrast => self.contrast,
            AdjustmentKind::Saturation => self.saturation,
            AdjustmentKind::Hue => self.hue,
            AdjustmentKind::Noise => self.noise,
            AdjustmentKind::Blur => self.blur,
        }
    }

    pub fn set(&mut self, kind: AdjustmentKind, value: i32) {
        let slot = match kind {
            AdjustmentKind::Brightness => &mut self.brightness,
            AdjustmentKind::Contrast => &mut self.contrast,
            AdjustmentKind::Saturation => &mut self.saturation,
            AdjustmentKind::Hue => &mut self.hue,
            AdjustmentKind::Noise => &mut self.noise,
            AdjustmentKind::Blur => &mut self.blur,
        };
        *slot = value;
    }

    /// Filter primitives for every non-neutral slider, in slider order.
    ///
    /// Noise is not a filter primitive; the compositor applies it as a
    /// post-process.
    pub fn filter_ops(&self) -> Vec<FilterOp> {
        let mut ops = Vec::new();
        if self.brightness != 100 {
            ops.push(FilterOp::Brightness(self.brightness as f32 / 100.0));
        }
        if self.contrast != 100 {
            ops.push(FilterOp::Contrast(self.contrast as f32 / 100.0));
        }
        if self.saturation != 100 {
            ops.push(FilterOp::Saturate(self.saturation as f32 / 100.0));
        }
        if self.hue != 0 {
            ops.push(FilterOp::HueRotate(self.hue as f32));
        }
        if self.blur > 0 {
            ops.push(FilterOp::Blur(self.blur as f32));
        }
        ops
    }
}

/// Names of the adjustable parameters
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Noise,
    Blur,
}

impl AdjustmentKind {
    pub const ALL: [AdjustmentKind; 6] = [
        AdjustmentKind::Brightness,
        AdjustmentKind::Contrast,
        AdjustmentKind::Saturation,
        AdjustmentKind::Hue,
        AdjustmentKind::Noise,
        AdjustmentKind::Blur,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AdjustmentKind::Brightness => "brightness",
            AdjustmentKind::Contrast => "contrast",
            AdjustmentKind::Saturation => "saturation",
            AdjustmentKind::Hue => "hue",
            AdjustmentKind::Noise => "noise",
            AdjustmentKind::Blur => "blur",
        }
    }

    /// Slider range offered to the user. Not enforced on stored values.
    pub fn range(self) -> (i32, i32) {
        match self {
            AdjustmentKind::Brightness
            | AdjustmentKind::Contrast
            | AdjustmentKind::Saturation => (0, 200),
            AdjustmentKind::Hue => (-180, 180),
            AdjustmentKind::Noise => (0, 100),
            AdjustmentKind::Blur => (0, 20),
        }
    }

    /// Whether `value` lies within the slider range
    pub fn in_range(self, value: i32) -> bool {
        let (min, max) = self.range();
        (min..=max).contains(&value)
    }

    pub fn neutral(self) -> i32 {
        AdjustmentSet::default().get(self)
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdjustmentKind {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        AdjustmentKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| CoverError::parse(format!("unknown adjustment: {}", s)))
    }
}
