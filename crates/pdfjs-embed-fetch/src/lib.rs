pub mod download;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod target;

pub use download::{DEFAULT_MAX_REDIRECTS, Downloader};
pub use error::FetchError;
pub use extract::{Extractor, SystemExtractor};
pub use fetcher::{FetchedTarget, Fetcher};
pub use target::{ArchiveTarget, FetchPlan};
