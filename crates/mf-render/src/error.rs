use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed data URL: {0}")]
    MalformedDataUrl(String),

    #[error("unsupported image reference: {0}")]
    Unsupported(String),

    #[error("no remote fetcher configured for {0}")]
    MissingFetcher(String),

    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot export onto a {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    #[error("share failed: {0}")]
    Share(String),
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}
