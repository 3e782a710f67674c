/// Simulated delivery
///
/// Nothing is actually sent anywhere. Each action records its effect and
/// waits a fixed delay so callers can show progress feedback.

use std::time::Duration;
use tracing::info;

use crate::error::CoverResult;
use crate::state::contact;
use crate::state::data::ContactStats;
use crate::state::gallery::Gallery;
use crate::state::session::EditingSession;
use crate::state::storage::KeyValueStore;

/// Time to "send" a contact message
pub const CONTACT_SEND_DELAY: Duration = Duration::from_secs(2);
/// Feedback shown after saving to the gallery
pub const SAVE_FEEDBACK_DELAY: Duration = Duration::from_secs(1);
/// Time to "share" a gallery item
pub const SHARE_DELAY: Duration = Duration::from_millis(1500);

/// Count a share, then wait. Returns the new share count.
pub async fn share<S: KeyValueStore>(
    gallery: &mut Gallery<S>,
    id: &str,
    delay: Duration,
) -> CoverResult<Option<u32>> {
    let shares = gallery.increment_share(id)?;
    if shares.is_some() {
        info!("Sharing {}...", id);
        tokio::time::sleep(delay).await;
    }
    Ok(shares)
}

/// Wait, then count the message as delivered
pub async fn submit_contact(store: &impl KeyValueStore, delay: Duration) -> CoverResult<ContactStats> {
    info!("Sending message...");
    tokio::time::sleep(delay).await;
    contact::record_contact(store)
}

/// Save the session to the gallery, then hold for the feedback delay
pub async fn save_with_feedback<S: KeyValueStore>(
    session: &EditingSession,
    gallery: &mut Gallery<S>,
    delay: Duration,
) -> CoverResult<Option<String>> {
    let id = session.save_to(gallery)?;
    if id.is_some() {
        tokio::time::sleep(delay).await;
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::NewGalleryItem;
    use crate::state::storage::MemoryStore;
    use image::{DynamicImage, RgbaImage};
    use tokio::time::Instant;

    fn gallery_with_item(store: &MemoryStore) -> (Gallery<&MemoryStore>, String) {
        let mut gallery = Gallery::open(store).unwrap();
        let id = gallery
            .save(NewGalleryItem {
                data_url: "data:image/png;base64,AAAA".to_string(),
                filter: "none".to_string(),
                frame: "none".to_string(),
            })
            .unwrap();
        (gallery, id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_share_counts_then_waits() {
        let store = MemoryStore::new();
        let (mut gallery, id) = gallery_with_item(&store);

        let start = Instant::now();
        assert_eq!(share(&mut gallery, &id, SHARE_DELAY).await.unwrap(), Some(1));
        assert!(start.elapsed() >= SHARE_DELAY);
        assert_eq!(Gallery::open(&store).unwrap().get(&id).unwrap().shares, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_share_unknown_id_returns_immediately() {
        let store = MemoryStore::new();
        let (mut gallery, _) = gallery_with_item(&store);

        let start = Instant::now();
        assert_eq!(share(&mut gallery, "img-0", SHARE_DELAY).await.unwrap(), None);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_contact_waits_then_records() {
        let store = MemoryStore::new();
        let start = Instant::now();
        let stats = submit_contact(&store, CONTACT_SEND_DELAY).await.unwrap();
        assert!(start.elapsed() >= CONTACT_SEND_DELAY);
        assert_eq!(stats.messages, 1);
        assert!(stats.last_contact.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_with_feedback() {
        let store = MemoryStore::new();
        let mut gallery = Gallery::open(&store).unwrap();
        let mut session = EditingSession::default();

        assert_eq!(save_with_feedback(&session, &mut gallery, SAVE_FEEDBACK_DELAY).await.unwrap(), None);

        session.load_image(&DynamicImage::ImageRgba8(RgbaImage::new(8, 8)));
        let start = Instant::now();
        let id = save_with_feedback(&session, &mut gallery, SAVE_FEEDBACK_DELAY).await.unwrap();
        assert!(start.elapsed() >= SAVE_FEEDBACK_DELAY);
        assert!(gallery.get(&id.unwrap()).is_some());
    }
}
