/// The gallery of saved creations
///
/// The whole list lives under one key and is rewritten on every mutation.
/// Items are kept most-recent-first. Actions on an unknown id are no-ops:
/// the item is treated as already deleted. A mutation takes effect in
/// memory only once the store has accepted the new list.

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};

use super::data::{GalleryFilter, GalleryItem, GalleryStats, NewGalleryItem};
use super::storage::KeyValueStore;
use crate::error::CoverResult;

/// Storage key of the gallery list
pub const GALLERY_KEY: &str = "coverme-gallery";

/// Age limit of the "recent" view, in milliseconds (7 days)
pub const RECENT_WINDOW_MS: i64 = 7 * 24 * 3600 * 1000;

/// Saved creations backed by a key-value store
#[derive(Debug)]
pub struct Gallery<S: KeyValueStore> {
    store: S,
    items: Vec<GalleryItem>,
}

impl<S: KeyValueStore> Gallery<S> {
    /// Load the gallery from `store`. A missing key is an empty gallery;
    /// unparseable stored data is an error.
    pub fn open(store: S) -> CoverResult<Self> {
        let items = match store.get(GALLERY_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        let gallery = Self { store, items };
        debug!("Gallery loaded with {} items", gallery.items.len());
        Ok(gallery)
    }

    /// Write `items` to the store, then make them the current list
    fn commit(&mut self, items: Vec<GalleryItem>) -> CoverResult<()> {
        let json = serde_json::to_string(&items)?;
        self.store.set(GALLERY_KEY, &json)?;
        self.items = items;
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Save a new creation at the front of the list. Returns its id.
    pub fn save(&mut self, item: NewGalleryItem) -> CoverResult<String> {
        self.save_at(item, Utc::now())
    }

    pub fn save_at(&mut self, item: NewGalleryItem, now: DateTime<Utc>) -> CoverResult<String> {
        let timestamp = now.timestamp_millis();
        let id = self.unique_id(timestamp);

        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(GalleryItem {
            id: id.clone(),
            data_url: item.data_url,
            timestamp,
            filter: item.filter,
            frame: item.frame,
            favorite: false,
            downloads: 0,
            shares: 0,
        });
        items.extend(self.items.iter().cloned());
        self.commit(items)?;

        info!("Saved {} to gallery ({} items)", id, self.items.len());
        Ok(id)
    }

    /// `img-<ms>`, with a suffix when several saves share a millisecond
    fn unique_id(&self, timestamp: i64) -> String {
        let base = format!("img-{}", timestamp);
        if self.get(&base).is_none() {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Flip the favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> CoverResult<Option<bool>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut items = self.items.clone();
        items[index].favorite = !items[index].favorite;
        let favorite = items[index].favorite;
        self.commit(items)?;
        Ok(Some(favorite))
    }

    /// Count a download. Returns the new count.
    pub fn increment_download(&mut self, id: &str) -> CoverResult<Option<u32>> {
        self.bump(id, |item| &mut item.downloads)
    }

    /// Count a share. Returns the new count.
    pub fn increment_share(&mut self, id: &str) -> CoverResult<Option<u32>> {
        self.bump(id, |item| &mut item.shares)
    }

    fn bump(
        &mut self,
        id: &str,
        counter: impl Fn(&mut GalleryItem) -> &mut u32,
    ) -> CoverResult<Option<u32>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut items = self.items.clone();
        let slot = counter(&mut items[index]);
        *slot = slot.saturating_add(1);
        let value = *slot;
        self.commit(items)?;
        Ok(Some(value))
    }

    /// Remove one item. Confirmation is up to the caller.
    pub fn delete(&mut self, id: &str) -> CoverResult<bool> {
        if self.position(id).is_none() {
            return Ok(false);
        }
        let items = self.items.iter().filter(|item| item.id != id).cloned().collect();
        self.commit(items)?;
        info!("Deleted {} from gallery", id);
        Ok(true)
    }

    /// Remove every item
    pub fn clear(&mut self) -> CoverResult<()> {
        self.commit(Vec::new())?;
        info!("Gallery cleared");
        Ok(())
    }

    /// A fresh view, newest first. The stored list is untouched.
    pub fn filter(&self, criterion: GalleryFilter) -> Vec<GalleryItem> {
        self.filter_at(criterion, Utc::now())
    }

    pub fn filter_at(&self, criterion: GalleryFilter, now: DateTime<Utc>) -> Vec<GalleryItem> {
        let now_ms = now.timestamp_millis();
        let mut view: Vec<GalleryItem> = self
            .items
            .iter()
            .filter(|item| match criterion {
                GalleryFilter::All => true,
                GalleryFilter::Recent => now_ms - item.timestamp <= RECENT_WINDOW_MS,
                GalleryFilter::Favorites => item.favorite,
            })
            .cloned()
            .collect();
        view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        view
    }

    pub fn get(&self, id: &str) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items in stored order
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn stats(&self) -> GalleryStats {
        GalleryStats {
            photos: self.items.len(),
            downloads: self.items.iter().map(|item| item.downloads as u64).sum(),
            shares: self.items.iter().map(|item| item.shares as u64).sum(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Human-readable age of a timestamp ("3 days ago", "2h ago", "just now")
pub fn time_ago(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let saved = Utc
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .unwrap_or(now);
    let elapsed = now.signed_duration_since(saved);

    let days = elapsed.num_days();
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();
    if days > 0 {
        format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}min ago", minutes)
    } else {
        "just now".to_string()
    }
}
