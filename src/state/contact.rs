/// Contact form usage counters
///
/// Stored under their own key, independent of the gallery.

use chrono::{DateTime, Utc};
use tracing::info;

use super::data::ContactStats;
use super::storage::KeyValueStore;
use crate::error::CoverResult;

/// Storage key of the contact counters
pub const CONTACT_STATS_KEY: &str = "coverme-contact-stats";

/// Current counters; zero when nothing was stored yet
pub fn load_contact_stats(store: &impl KeyValueStore) -> CoverResult<ContactStats> {
    match store.get(CONTACT_STATS_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(ContactStats::default()),
    }
}

/// Count one submitted message
pub fn record_contact(store: &impl KeyValueStore) -> CoverResult<ContactStats> {
    record_contact_at(store, Utc::now())
}

pub fn record_contact_at(store: &impl KeyValueStore, now: DateTime<Utc>) -> CoverResult<ContactStats> {
    let mut stats = load_contact_stats(store)?;
    stats.messages = stats.messages.saturating_add(1);
    stats.last_contact = Some(now);
    store.set(CONTACT_STATS_KEY, &serde_json::to_string(&stats)?)?;

    info!("Contact message recorded ({} total)", stats.messages);
    Ok(stats)
}
