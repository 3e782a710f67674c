/// CoverMe photo editing core
///
/// - `state`: editing session, undo history, gallery and storage
/// - `render`: filters, frames, backgrounds, stickers and compositing
/// - `source`: image decoding and data-URI payloads
/// - `simulate`: delayed share/save/contact delivery
/// - `config`: user configuration

pub mod color;
pub mod config;
pub mod error;
pub mod render;
pub mod simulate;
pub mod source;
pub mod state;

pub use config::Config;
pub use error::{CoverError, CoverResult};
pub use state::gallery::Gallery;
pub use state::session::EditingSession;
pub use state::storage::{KeyValueStore, MemoryStore, SqliteStore};
