use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The PDF.js release vendored by default.
pub const PDFJS_VERSION: &str = "5.4.296";

/// GitHub release download base for the upstream project.
pub const RELEASE_BASE_URL: &str = "https://github.com/mozilla/pdf.js/releases/download";

/// Relative path of the viewer's main script inside a variant directory.
pub const VIEWER_SCRIPT: &str = "web/viewer.mjs";

/// Relative path of the viewer's HTML entry inside a variant directory.
pub const VIEWER_HTML: &str = "web/viewer.html";

/// Upstream release identifier, e.g. `5.4.296`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        // Accept `v5.4.296` as well; the `v` belongs to the URL, not the tag.
        match tag.strip_prefix('v') {
            Some(rest) => Self(rest.to_owned()),
            None => Self(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionTag {
    fn default() -> Self {
        Self::new(PDFJS_VERSION)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two parallel builds published for every release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Build targeting current browser engines.
    Modern,
    /// Build targeting older browser engines.
    Legacy,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Modern, Variant::Legacy];

    /// Directory name under the vendor root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Variant::Modern => "pdfjs",
            Variant::Legacy => "pdfjs-legacy",
        }
    }

    /// Label used in logs and temporary file names.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Modern => "modern",
            Variant::Legacy => "legacy",
        }
    }

    /// Release asset file name for `version`.
    pub fn archive_name(self, version: &VersionTag) -> String {
        match self {
            Variant::Modern => format!("pdfjs-{version}-dist.zip"),
            Variant::Legacy => format!("pdfjs-{version}-legacy-dist.zip"),
        }
    }

    /// Full download URL below `base` (no trailing slash expected).
    pub fn archive_url(self, base: &str, version: &VersionTag) -> String {
        format!(
            "{}/v{}/{}",
            base.trim_end_matches('/'),
            version,
            self.archive_name(version)
        )
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// On-disk layout of the vendor directory.
///
/// Written by the fetcher, read by the plugin adapter:
/// - `root/pdfjs/**`
/// - `root/pdfjs-legacy/**`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorLayout {
    root: PathBuf,
}

impl VendorLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn variant_dir(&self, variant: Variant) -> PathBuf {
        self.root.join(variant.dir_name())
    }
}

impl Default for VendorLayout {
    fn default() -> Self {
        Self::new("vendor")
    }
}
