/// The editing session
///
/// Owns the loaded image, the editable state and the undo history. Every
/// edit that changes the state records a history entry; undo and redo
/// restore the state captured in an entry.
///
/// Operations that need an image are no-ops until one is loaded.

use chrono::Utc;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::data::{EditState, NewGalleryItem};
use super::edit::AdjustmentKind;
use super::gallery::Gallery;
use super::history::{History, HistoryEntry};
use super::layer::{Layer, LayerId, Sticker};
use super::storage::KeyValueStore;
use crate::config::Config;
use crate::error::CoverResult;
use crate::render::{self, Background, FilterPreset, Frame, RenderInput, StickerAtlas};
use crate::source::{self, ImageSource};

#[derive(Debug)]
pub struct EditingSession {
    /// Base image, already fitted to the canvas
    image: Option<Arc<RgbaImage>>,
    state: EditState,
    history: History<HistoryEntry>,
    atlas: StickerAtlas,
    /// Noise seed of the loaded image
    noise_seed: u64,
    max_width: u32,
    max_height: u32,
    sticker_size: f32,
    /// Newest layer id handed out
    last_layer_id: i64,
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl EditingSession {
    pub fn new(config: &Config) -> Self {
        Self {
            image: None,
            state: EditState::default(),
            history: History::new(config.history_capacity),
            atlas: StickerAtlas::with_palette(),
            noise_seed: 0,
            max_width: config.max_width,
            max_height: config.max_height,
            sticker_size: config.sticker_size,
            last_layer_id: 0,
        }
    }

    // ========== Image ==========

    /// Replace the current image. Layers and history are cleared and the
    /// fresh state becomes the first history entry.
    pub fn load_image(&mut self, image: &DynamicImage) {
        let fitted = source::fit_to_canvas(image, self.max_width, self.max_height);
        info!(
            "Loaded image {}x{} (canvas {}x{})",
            image.width(),
            image.height(),
            fitted.width(),
            fitted.height()
        );

        self.image = Some(Arc::new(fitted));
        self.noise_seed = rand::random();
        self.state.layers.clear();
        self.history.clear();
        self.push_history();
    }

    /// Decode and load `source`. Returns false, leaving the session
    /// untouched, when it cannot be decoded.
    pub fn load_source(&mut self, source: ImageSource<'_>) -> bool {
        match source.decode() {
            Ok(image) => {
                self.load_image(&image);
                true
            }
            Err(e) => {
                warn!("Ignoring undecodable image: {}", e);
                false
            }
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Canvas size, once an image is loaded
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| image.dimensions())
    }

    // ========== Edits ==========

    /// Store a slider value as given; out-of-range values are kept
    pub fn set_adjustment(&mut self, kind: AdjustmentKind, value: i32) {
        self.state.adjustments.set(kind, value);
        self.push_history();
    }

    /// Activate a preset by name. Unknown names select no filter.
    /// Slider values are kept.
    pub fn apply_filter_preset(&mut self, name: &str) -> FilterPreset {
        let preset = FilterPreset::from_name(name);
        self.state.preset = preset;
        self.push_history();
        preset
    }

    pub fn set_frame(&mut self, name: &str) -> Frame {
        let frame = Frame::from_name(name);
        self.state.frame = frame;
        self.push_history();
        frame
    }

    pub fn set_background(&mut self, background: Background) {
        self.state.background = Some(background);
        self.push_history();
    }

    pub fn clear_background(&mut self) {
        if self.state.background.take().is_some() {
            self.push_history();
        }
    }

    // ========== Layers ==========

    /// Millisecond timestamp, bumped past the previous id when needed
    fn next_layer_id(&mut self) -> LayerId {
        let id = Utc::now().timestamp_millis().max(self.last_layer_id + 1);
        self.last_layer_id = id;
        LayerId(id)
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.last_layer_id = self.last_layer_id.max(layer.id().0);
        self.state.layers.push(layer);
        self.push_history();
    }

    /// Add a default-sized sticker at the center of the canvas
    pub fn add_sticker(&mut self, content: &str) -> LayerId {
        let (w, h) = self
            .canvas_size()
            .unwrap_or((self.max_width, self.max_height));
        let id = self.next_layer_id();

        let mut sticker = Sticker::centered(id, content, w as f32 / 2.0, h as f32 / 2.0);
        sticker.width = self.sticker_size;
        sticker.height = self.sticker_size;
        self.add_layer(sticker.into());
        id
    }

    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let before = self.state.layers.len();
        self.state.layers.retain(|layer| layer.id() != id);
        if self.state.layers.len() == before {
            return false;
        }
        self.push_history();
        true
    }

    // ========== History ==========

    /// Record the current state as the newest history entry
    pub fn push_history(&mut self) {
        let Some(snapshot) = self.render() else {
            return;
        };
        self.history.push(HistoryEntry {
            snapshot: Arc::new(snapshot),
            state: self.state.clone(),
        });
        debug!(
            "History entry {} of {}",
            self.history.cursor().map_or(0, |c| c + 1),
            self.history.len()
        );
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo() else {
            return false;
        };
        self.state = entry.state.clone();
        debug!("Undo to entry {:?}", self.history.cursor());
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo() else {
            return false;
        };
        self.state = entry.state.clone();
        debug!("Redo to entry {:?}", self.history.cursor());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History<HistoryEntry> {
        &self.history
    }

    // ========== Output ==========

    /// Composite of the current state
    pub fn render(&self) -> Option<RgbaImage> {
        let image = self.image.as_ref()?;
        let input = RenderInput {
            image,
            state: &self.state,
            noise_seed: self.noise_seed,
        };
        Some(render::render(input, &self.atlas))
    }

    /// Save the composite to the gallery. Returns the new item id.
    pub fn save_to<S: KeyValueStore>(&self, gallery: &mut Gallery<S>) -> CoverResult<Option<String>> {
        let Some(composite) = self.render() else {
            warn!("Nothing to save: no image loaded");
            return Ok(None);
        };
        let item = NewGalleryItem {
            data_url: source::encode_data_uri(&composite)?,
            filter: self.state.preset.name().to_string(),
            frame: self.state.frame.name().to_string(),
        };
        gallery.save(item).map(Some)
    }

    /// Write the composite as a PNG file
    pub fn export_png(&self, path: &Path) -> CoverResult<bool> {
        let Some(composite) = self.render() else {
            return Ok(false);
        };
        composite.save_with_format(path, ImageFormat::Png)?;
        info!("Exported {}", path.display());
        Ok(true)
    }

    /// Drop the image and every edit
    pub fn reset(&mut self) {
        self.image = None;
        self.state = EditState::default();
        self.history.clear();
        info!("Session reset");
    }

    // ========== Accessors ==========

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn atlas_mut(&mut self) -> &mut StickerAtlas {
        &mut self.atlas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::GalleryFilter;
    use crate::state::storage::MemoryStore;
    use image::Rgba;

    fn loaded() -> EditingSession {
        let mut session = EditingSession::default();
        let image = RgbaImage::from_pixel(40, 30, Rgba([120, 90, 60, 255]));
        session.load_image(&DynamicImage::ImageRgba8(image));
        session
    }

    #[test]
    fn test_load_fits_canvas_and_starts_history() {
        let mut session = EditingSession::default();
        let big = DynamicImage::ImageRgba8(RgbaImage::new(1600, 900));
        session.load_image(&big);
        assert_eq!(session.canvas_size(), Some((800, 450)));
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_undecodable_source_is_a_noop() {
        let mut session = loaded();
        session.add_sticker("⭐");
        let state = session.state().clone();

        assert!(!session.load_source(ImageSource::Bytes(b"garbage")));
        assert!(!session.load_source(ImageSource::DataUri("data:text/plain;base64,aGk=")));
        assert_eq!(session.state(), &state);
        assert_eq!(session.canvas_size(), Some((40, 30)));
    }

    #[test]
    fn test_load_clears_layers_and_history() {
        let mut session = loaded();
        session.add_sticker("⭐");
        session.set_adjustment(AdjustmentKind::Hue, 45);

        let png = source::encode_data_uri(&RgbaImage::new(10, 10)).unwrap();
        assert!(session.load_source(ImageSource::DataUri(&png)));
        assert!(session.state().layers.is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_adjustments_are_stored_unclamped() {
        let mut session = loaded();
        session.set_adjustment(AdjustmentKind::Brightness, 500);
        session.set_adjustment(AdjustmentKind::Noise, -3);
        assert_eq!(session.state().adjustments.brightness, 500);
        assert_eq!(session.state().adjustments.noise, -3);
    }

    #[test]
    fn test_preset_keeps_adjustments() {
        let mut session = loaded();
        session.set_adjustment(AdjustmentKind::Contrast, 150);
        assert_eq!(session.apply_filter_preset("vintage"), FilterPreset::Vintage);
        assert_eq!(session.state().adjustments.contrast, 150);
        assert_eq!(session.apply_filter_preset("unheard-of"), FilterPreset::None);
    }

    #[test]
    fn test_undo_n_times_returns_to_start() {
        let mut session = loaded();
        let initial = session.state().clone();

        session.set_adjustment(AdjustmentKind::Brightness, 120);
        session.apply_filter_preset("cool");
        session.add_sticker("🔥");
        session.set_frame("classic");

        for _ in 0..4 {
            assert!(session.undo());
        }
        assert_eq!(session.state(), &initial);
        assert!(!session.undo());
        assert_eq!(session.state(), &initial);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut session = loaded();
        session.set_adjustment(AdjustmentKind::Saturation, 40);
        session.set_background(Background::Color { rgba: [0, 0, 0, 255] });
        let latest = session.state().clone();

        assert!(session.undo());
        assert!(session.state().background.is_none());
        assert!(session.redo());
        assert_eq!(session.state(), &latest);
        assert!(!session.redo());
    }

    #[test]
    fn test_edit_after_undo_discards_redo() {
        let mut session = loaded();
        session.set_adjustment(AdjustmentKind::Blur, 2);
        session.set_adjustment(AdjustmentKind::Blur, 4);
        session.undo();
        session.set_adjustment(AdjustmentKind::Hue, 90);

        assert!(!session.can_redo());
        assert!(!session.redo());
        assert_eq!(session.state().adjustments.blur, 2);
        assert_eq!(session.state().adjustments.hue, 90);
    }

    #[test]
    fn test_history_is_capped() {
        let mut session = loaded();
        for v in 0..30 {
            session.set_adjustment(AdjustmentKind::Brightness, v);
        }
        assert_eq!(session.history().len(), 20);

        let mut steps = 0;
        while session.undo() {
            steps += 1;
        }
        assert_eq!(steps, 19);
        assert_eq!(session.state().adjustments.brightness, 10);
    }

    #[test]
    fn test_no_history_without_image() {
        let mut session = EditingSession::default();
        session.set_adjustment(AdjustmentKind::Brightness, 130);
        session.add_sticker("😎");
        assert!(session.history().is_empty());
        assert!(session.render().is_none());
        assert!(!session.undo());
    }

    #[test]
    fn test_layer_ids_strictly_increase() {
        let mut session = loaded();
        let ids: Vec<LayerId> = (0..5).map(|_| session.add_sticker("✨")).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

        let Layer::Sticker(sticker) = &session.state().layers[0];
        assert_eq!((sticker.x, sticker.y), (20.0, 15.0));
        assert_eq!((sticker.width, sticker.height), (60.0, 60.0));
        assert_eq!(sticker.rotation, 0.0);
    }

    #[test]
    fn test_remove_layer() {
        let mut session = loaded();
        let id = session.add_sticker("🌈");
        let entries = session.history().len();

        assert!(!session.remove_layer(LayerId(id.0 + 1000)));
        assert_eq!(session.history().len(), entries);
        assert!(session.remove_layer(id));
        assert!(session.state().layers.is_empty());
        assert!(session.undo());
        assert_eq!(session.state().layers.len(), 1);
    }

    #[test]
    fn test_palette_sticker_renders_by_default() {
        let mut session = EditingSession::default();
        let image = RgbaImage::from_pixel(200, 200, Rgba([128, 128, 128, 255]));
        session.load_image(&DynamicImage::ImageRgba8(image));
        let plain = session.render().unwrap();

        session.add_sticker("⭐");
        let with_star = session.render().unwrap();
        assert_ne!(plain, with_star);
        let [r, _, b, _] = with_star.get_pixel(100, 100).0;
        assert!(r > 200 && b < 100, "center was {:?}", with_star.get_pixel(100, 100));
    }

    #[test]
    fn test_clear_background() {
        let mut session = loaded();
        session.clear_background();
        assert_eq!(session.history().len(), 1);

        session.set_background(Background::Color { rgba: [9, 9, 9, 255] });
        session.clear_background();
        assert!(session.state().background.is_none());
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut session = loaded();
        session.set_adjustment(AdjustmentKind::Noise, 30);
        assert_eq!(session.render(), session.render());
    }

    #[test]
    fn test_save_to_gallery() {
        let mut session = loaded();
        session.apply_filter_preset("noir");
        session.set_frame("modern");

        let mut gallery = Gallery::open(MemoryStore::new()).unwrap();
        let id = session.save_to(&mut gallery).unwrap().unwrap();

        let item = gallery.get(&id).unwrap();
        assert_eq!(item.filter, "bw");
        assert_eq!(item.frame, "modern");
        let decoded = source::decode_data_uri(&item.data_url).unwrap();
        assert_eq!(decoded.to_rgba8(), session.render().unwrap());
        assert_eq!(gallery.filter(GalleryFilter::Recent).len(), 1);

        session.reset();
        assert_eq!(session.save_to(&mut gallery).unwrap(), None);
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_export_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");

        assert!(!EditingSession::default().export_png(&path).unwrap());
        let session = loaded();
        assert!(session.export_png(&path).unwrap());
        assert_eq!(image::open(&path).unwrap().to_rgba8().dimensions(), (40, 30));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = loaded();
        session.add_sticker("🎉");
        session.set_frame("vintage");
        session.reset();
        assert!(!session.has_image());
        assert_eq!(session.state(), &EditState::default());
        assert!(session.history().is_empty());
    }
}
