/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the storage layer, the editing session and the renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::edit::AdjustmentSet;
use super::layer::Layer;
use crate::error::CoverError;
use crate::render::decor::{Background, Frame};
use crate::render::filters::FilterPreset;

/// Everything the user can edit and undo
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EditState {
    pub adjustments: AdjustmentSet,
    /// Active filter preset
    pub preset: FilterPreset,
    pub frame: Frame,
    pub background: Option<Background>,
    /// Overlays, drawn in order
    pub layers: Vec<Layer>,
}

/// A saved creation in the gallery
///
/// Field names match the persisted layout, so existing gallery data
/// keeps loading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    /// Unique ID (e.g. "img-1718000000000")
    pub id: String,
    /// Inline image payload (data URI)
    pub data_url: String,
    /// Save time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Name of the applied filter preset
    pub filter: String,
    /// Name of the applied frame
    pub frame: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub downloads: u32,
    #[serde(default)]
    pub shares: u32,
}

impl GalleryItem {
    /// Gallery label for the stored filter name
    pub fn filter_label(&self) -> &'static str {
        FilterPreset::from_name(&self.filter).display_name()
    }
}

/// What the editor hands to the gallery on save
#[derive(Debug, Clone, PartialEq)]
pub struct NewGalleryItem {
    pub data_url: String,
    pub filter: String,
    pub frame: String,
}

/// Gallery views
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GalleryFilter {
    #[default]
    All,
    /// Saved within the last 7 days
    Recent,
    Favorites,
}

impl FromStr for GalleryFilter {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(GalleryFilter::All),
            "recent" => Ok(GalleryFilter::Recent),
            "favorites" => Ok(GalleryFilter::Favorites),
            other => Err(CoverError::parse(format!("unknown gallery filter: {}", other))),
        }
    }
}

impl fmt::Display for GalleryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GalleryFilter::All => "all",
            GalleryFilter::Recent => "recent",
            GalleryFilter::Favorites => "favorites",
        })
    }
}

/// Totals shown above the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GalleryStats {
    pub photos: usize,
    pub downloads: u64,
    pub shares: u64,
}

/// Usage counters for simulated contact submissions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub messages: u32,
    pub last_contact: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_item_storage_layout() {
        let json = r#"{
            "id": "img-1",
            "dataUrl": "data:image/png;base64,AAAA",
            "timestamp": 1700000000000,
            "filter": "noir",
            "frame": "modern",
            "favorite": true,
            "downloads": 5,
            "shares": 3
        }"#;
        let item: GalleryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.data_url, "data:image/png;base64,AAAA");
        assert_eq!(item.filter_label(), "B&W");
        assert!(item.favorite);

        let out = serde_json::to_value(&item).unwrap();
        assert!(out.get("dataUrl").is_some());
        assert!(out.get("data_url").is_none());
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let json = r#"{"id":"a","dataUrl":"x","timestamp":0,"filter":"none","frame":"none"}"#;
        let item: GalleryItem = serde_json::from_str(json).unwrap();
        assert!(!item.favorite);
        assert_eq!(item.downloads, 0);
        assert_eq!(item.shares, 0);
    }

    #[test]
    fn test_contact_stats_layout() {
        let stats: ContactStats = serde_json::from_str(r#"{"messages": 0, "lastContact": null}"#).unwrap();
        assert_eq!(stats, ContactStats::default());
    }

    #[test]
    fn test_gallery_filter_parsing() {
        assert_eq!("Recent".parse::<GalleryFilter>().unwrap(), GalleryFilter::Recent);
        assert!("oldest".parse::<GalleryFilter>().is_err());
        assert_eq!(GalleryFilter::Favorites.to_string(), "favorites");
    }
}
