/// State management module
///
/// This module handles all application state, including:
/// - Key-value storage backends (storage.rs)
/// - Shared data structures (data.rs)
/// - Slider adjustments (edit.rs)
/// - Overlay layers (layer.rs)
/// - Undo/redo history (history.rs)
/// - The editing session (session.rs)
/// - The persisted gallery (gallery.rs)
/// - Contact usage counters (contact.rs)

pub mod contact;
pub mod data;
pub mod edit;
pub mod gallery;
pub mod history;
pub mod layer;
pub mod session;
pub mod storage;
