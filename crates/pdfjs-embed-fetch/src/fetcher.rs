use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfjs_embed::Variant;

use crate::download::Downloader;
use crate::error::FetchError;
use crate::extract::{Extractor, SystemExtractor};
use crate::target::{ArchiveTarget, FetchPlan};

/// Outcome for one unpacked archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTarget {
    pub variant: Variant,
    pub extract_dir: PathBuf,
    pub bytes: u64,
}

/// Downloads and unpacks every target of a [`FetchPlan`].
pub struct Fetcher {
    plan: FetchPlan,
    downloader: Downloader,
    extractor: Arc<dyn Extractor>,
}

impl Fetcher {
    pub fn new(plan: FetchPlan, downloader: Downloader) -> Self {
        Self {
            plan,
            downloader,
            extractor: Arc::new(SystemExtractor::new()),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Fetch all targets on their own tasks and wait for every one to finish.
    ///
    /// Fails with the first error (in target order) if any target failed;
    /// the other targets still run to completion.
    pub async fn run(&self) -> Result<Vec<FetchedTarget>, FetchError> {
        tracing::info!(version = %self.plan.version(), "fetching pdf.js release");

        let handles: Vec<_> = self
            .plan
            .targets()
            .iter()
            .map(|target| {
                let downloader = self.downloader.clone();
                let extractor = Arc::clone(&self.extractor);
                let target = target.clone();
                tokio::spawn(async move {
                    fetch_target(&downloader, extractor.as_ref(), &target).await
                })
            })
            .collect();

        let mut fetched = Vec::with_capacity(handles.len());
        let mut first_error = None;

        for (target, handle) in self.plan.targets().iter().zip(handles) {
            let result = handle
                .await
                .unwrap_or_else(|e| Err(FetchError::Task(e.to_string())));
            match result {
                Ok(done) => fetched.push(done),
                Err(e) => {
                    tracing::error!(variant = %target.variant, url = %target.url, error = %e, "fetch failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(fetched),
        }
    }
}

/// Download, replace the vendor directory, unpack, remove the archive.
///
/// The old directory is only removed once the download succeeded, so a
/// failed download leaves the previous snapshot in place.
async fn fetch_target(
    downloader: &Downloader,
    extractor: &dyn Extractor,
    target: &ArchiveTarget,
) -> Result<FetchedTarget, FetchError> {
    tracing::info!(variant = %target.variant, url = %target.url, "downloading");
    let bytes = downloader
        .download(&target.url, &target.local_zip_path)
        .await?;

    remove_dir_if_present(&target.extract_dir).await?;
    tokio::fs::create_dir_all(&target.extract_dir)
        .await
        .map_err(FetchError::fs(&target.extract_dir))?;

    tracing::info!(variant = %target.variant, dir = %target.extract_dir.display(), "extracting");
    extractor
        .extract(&target.local_zip_path, &target.extract_dir)
        .await?;

    tokio::fs::remove_file(&target.local_zip_path)
        .await
        .map_err(FetchError::fs(&target.local_zip_path))?;

    Ok(FetchedTarget {
        variant: target.variant,
        extract_dir: target.extract_dir.clone(),
        bytes,
    })
}

async fn remove_dir_if_present(dir: &Path) -> Result<(), FetchError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FetchError::FileSystem {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removing_absent_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_dir_if_present(&dir.path().join("never-created"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn removing_dir_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("pdfjs");
        std::fs::create_dir_all(target.join("web/cmaps")).unwrap();
        std::fs::write(target.join("web/cmaps/stale.bcmap"), b"old").unwrap();

        remove_dir_if_present(&target).await.unwrap();
        assert!(!target.exists());
    }
}
