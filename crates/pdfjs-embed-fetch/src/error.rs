use std::path::PathBuf;

/// Errors that abort a fetch run. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to download {url}: HTTP {status}")]
    Download { url: String, status: u16 },

    #[error("failed to download {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid download URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("gave up on {url} after {limit} redirects")]
    TooManyRedirects { url: String, limit: usize },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("fetch task failed: {0}")]
    Task(String),

    #[error("file system error on {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn fs(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| FetchError::FileSystem { path, source }
    }
}
