/// Overlay layers composited above the base image
///
/// Layers are owned by the editing session. New layer kinds are added as
/// enum variants so every match over layers must handle them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default sticker edge length in canvas pixels
pub const DEFAULT_STICKER_SIZE: f32 = 60.0;

/// Emoji offered in the sticker picker
pub const STICKER_PALETTE: [&str; 24] = [
    "😀", "😂", "🥰", "😎", "🤔", "😴", "🤗", "🙃",
    "❤️", "💕", "💖", "💯", "🔥", "⭐", "✨", "🌟",
    "🎉", "🎊", "🎈", "🎀", "🌈", "☀️", "🌙", "⚡",
];

/// Layer identifier, derived from the creation time in milliseconds
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct LayerId(pub i64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A positioned glyph overlay
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sticker {
    pub id: LayerId,
    /// Glyph or short text drawn by the sticker
    pub content: String,
    /// Center position in canvas pixels
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation around the center, in radians
    pub rotation: f32,
}

impl Sticker {
    /// A default-sized, unrotated sticker centered at (x, y)
    pub fn centered(id: LayerId, content: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id,
            content: content.into(),
            x,
            y,
            width: DEFAULT_STICKER_SIZE,
            height: DEFAULT_STICKER_SIZE,
            rotation: 0.0,
        }
    }
}

/// Overlay layer kinds
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Sticker(Sticker),
}

impl Layer {
    pub fn id(&self) -> LayerId {
        match self {
            Layer::Sticker(sticker) => sticker.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Sticker(_) => "sticker",
        }
    }
}

impl From<Sticker> for Layer {
    fn from(sticker: Sticker) -> Self {
        Layer::Sticker(sticker)
    }
}
