/// Error types shared by the library
///
/// Lookup misses (unknown gallery id, unknown layer id) are not errors:
/// those operations return `None` or `false` instead.

pub type CoverResult<T> = Result<T, CoverError>;

#[derive(thiserror::Error, Debug)]
pub enum CoverError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("invalid data URI: {0}")]
    DataUri(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("invalid font data")]
    Font,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("could not determine user data directory")]
    NoDataDir,
}

impl CoverError {
    pub fn data_uri(msg: impl Into<String>) -> Self {
        Self::DataUri(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
