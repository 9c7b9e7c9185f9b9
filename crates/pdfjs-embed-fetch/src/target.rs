use std::path::{Path, PathBuf};

use pdfjs_embed::{RELEASE_BASE_URL, Variant, VendorLayout, VersionTag};

/// One archive to download and unpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    pub variant: Variant,
    pub url: String,
    /// Temporary download location, removed after extraction.
    pub local_zip_path: PathBuf,
    /// Vendor directory replaced by the archive contents.
    pub extract_dir: PathBuf,
}

/// Everything a fetch run needs, built from a single version tag so both
/// variants always come from the same release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    version: VersionTag,
    targets: Vec<ArchiveTarget>,
}

impl FetchPlan {
    pub fn new(
        version: VersionTag,
        base_url: &str,
        layout: &VendorLayout,
        temp_dir: &Path,
    ) -> Self {
        let targets = Variant::ALL
            .into_iter()
            .map(|variant| ArchiveTarget {
                variant,
                url: variant.archive_url(base_url, &version),
                local_zip_path: temp_dir.join(format!("pdfjs-{}-{}.zip", variant.label(), version)),
                extract_dir: layout.variant_dir(variant),
            })
            .collect();

        Self { version, targets }
    }

    /// The upstream release, system temp dir, and `vendor` layout.
    pub fn release(version: VersionTag, layout: &VendorLayout) -> Self {
        Self::new(version, RELEASE_BASE_URL, layout, &std::env::temp_dir())
    }

    pub fn version(&self) -> &VersionTag {
        &self.version
    }

    pub fn targets(&self) -> &[ArchiveTarget] {
        &self.targets
    }
}
