use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::patch::Transform;
use crate::rename::relative_destination;

/// Which files a copy rule picks up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CopySource {
    /// Every file below `root`, the equivalent of `root/**/*`.
    Tree { root: PathBuf },
    /// Exactly these files. Missing files are an error at copy time.
    Files { files: Vec<PathBuf> },
}

impl CopySource {
    /// Glob form of the source, with `/` separators.
    pub fn patterns(&self) -> Vec<String> {
        match self {
            CopySource::Tree { root } => vec![format!("{}/**/*", normalize(root))],
            CopySource::Files { files } => files.iter().map(|f| normalize(f)).collect(),
        }
    }
}

/// Maps absolute source paths to destination-relative paths.
///
/// Every rule produced for one plugin shares the same `Rename`, so a file
/// lands on the same destination whether it is copied verbatim or patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    root: PathBuf,
}

impl Rename {
    pub fn relative_to(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn apply(&self, full_path: &Path) -> Option<String> {
        relative_destination(&self.root, full_path)
    }
}

/// One copy instruction for the static-asset pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyRule {
    pub source: CopySource,
    /// Directory inside the build output.
    pub dest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    pub rename: Rename,
}

impl CopyRule {
    pub fn tree(root: impl Into<PathBuf>, dest: impl Into<String>, rename: Rename) -> Self {
        Self {
            source: CopySource::Tree { root: root.into() },
            dest: dest.into(),
            transform: None,
            rename,
        }
    }

    pub fn file(
        file: impl Into<PathBuf>,
        dest: impl Into<String>,
        transform: Transform,
        rename: Rename,
    ) -> Self {
        Self {
            source: CopySource::Files {
                files: vec![file.into()],
            },
            dest: dest.into(),
            transform: Some(transform),
            rename,
        }
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
