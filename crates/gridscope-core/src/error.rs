use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record file: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid boundary document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("boundary document has no usable region features")]
    EmptyBoundaries,

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}
