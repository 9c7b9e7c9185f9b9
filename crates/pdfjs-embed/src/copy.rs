//! Executes copy rules against a build output directory.
//!
//! Rules are expanded in registration order and keyed by destination. When
//! two rules produce the same destination the later one replaces the earlier
//! one, which is how the patched viewer files win over the bulk copy.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::patch::{PatchError, PatchMode, PatchOutcome, Transform};
use crate::plugin::PluginDescriptor;
use crate::rule::{CopyRule, CopySource};

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("copy source not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("{} is outside the rename root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("copy destination `{0}` must be a relative path inside the output directory")]
    InvalidDestination(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 and cannot be patched", .0.display())]
    NotUtf8(PathBuf),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// A single file scheduled for copying.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Destination relative to the rule's output directory.
    pub relative: String,
    pub transform: Option<Transform>,
    /// Position of the producing rule in registration order.
    pub rule_index: usize,
}

/// A patch whose anchor text was missing; the file was copied unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedPatch {
    pub file: String,
    pub needle: &'static str,
}

#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: usize,
    pub patched: usize,
    /// Destinations claimed by more than one rule.
    pub overridden: usize,
    pub missed: Vec<MissedPatch>,
}

#[derive(Debug, Default)]
pub struct CopyPlan {
    entries: Vec<PlannedCopy>,
    by_destination: HashMap<PathBuf, usize>,
    overridden: usize,
}

impl CopyPlan {
    /// Plan every copy rule carried by `plugins`.
    pub fn from_plugins(plugins: &[PluginDescriptor], out_dir: &Path) -> Result<Self, CopyError> {
        let rules: Vec<CopyRule> = plugins
            .iter()
            .flat_map(|p| p.copy_rules().iter().cloned())
            .collect();
        Self::from_rules(&rules, out_dir)
    }

    pub fn from_rules(rules: &[CopyRule], out_dir: &Path) -> Result<Self, CopyError> {
        let mut plan = Self::default();

        for (rule_index, rule) in rules.iter().enumerate() {
            check_destination(&rule.dest)?;
            for source in expand(&rule.source)? {
                let relative = rule.rename.apply(&source).ok_or_else(|| CopyError::OutsideRoot {
                    path: source.clone(),
                    root: rule.rename.root().to_path_buf(),
                })?;
                let destination = out_dir.join(&rule.dest).join(&relative);

                plan.insert(PlannedCopy {
                    source,
                    destination,
                    relative,
                    transform: rule.transform.clone(),
                    rule_index,
                });
            }
        }

        Ok(plan)
    }

    fn insert(&mut self, entry: PlannedCopy) {
        match self.by_destination.get(&entry.destination) {
            Some(&existing) => {
                tracing::debug!(
                    destination = %entry.destination.display(),
                    replaced_rule = self.entries[existing].rule_index,
                    rule = entry.rule_index,
                    "later rule takes over destination"
                );
                self.entries[existing] = entry;
                self.overridden += 1;
            }
            None => {
                self.by_destination
                    .insert(entry.destination.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn entries(&self) -> &[PlannedCopy] {
        &self.entries
    }

    /// The entry that will be written to `destination`, if any.
    pub fn get(&self, destination: &Path) -> Option<&PlannedCopy> {
        self.by_destination
            .get(destination)
            .map(|&idx| &self.entries[idx])
    }

    /// Write every planned file. Parent directories are created as needed.
    pub fn execute(&self, mode: PatchMode) -> Result<CopyReport, CopyError> {
        let mut report = CopyReport {
            overridden: self.overridden,
            ..Default::default()
        };

        for entry in &self.entries {
            if let Some(parent) = entry.destination.parent() {
                std::fs::create_dir_all(parent).map_err(|source| CopyError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            match &entry.transform {
                None => {
                    std::fs::copy(&entry.source, &entry.destination).map_err(|source| {
                        CopyError::Io {
                            path: entry.source.clone(),
                            source,
                        }
                    })?;
                }
                Some(transform) => {
                    let content = read_text(&entry.source)?;
                    let patched = transform.apply(&entry.relative, &content, mode)?;

                    match patched.outcome {
                        PatchOutcome::Applied => report.patched += 1,
                        PatchOutcome::TargetMissing { needle } => report.missed.push(MissedPatch {
                            file: entry.relative.clone(),
                            needle,
                        }),
                        PatchOutcome::Skipped => {}
                    }

                    std::fs::write(&entry.destination, patched.content).map_err(|source| {
                        CopyError::Io {
                            path: entry.destination.clone(),
                            source,
                        }
                    })?;
                }
            }

            tracing::debug!(file = %entry.relative, "copied");
            report.copied += 1;
        }

        tracing::info!(
            copied = report.copied,
            patched = report.patched,
            missed = report.missed.len(),
            "viewer files copied"
        );

        Ok(report)
    }
}

/// Rule destinations are joined onto the output directory and must stay in it.
fn check_destination(dest: &str) -> Result<(), CopyError> {
    let contained = Path::new(dest)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if contained {
        Ok(())
    } else {
        Err(CopyError::InvalidDestination(dest.to_owned()))
    }
}

/// Expand a copy source into concrete file paths, sorted for stable output.
fn expand(source: &CopySource) -> Result<Vec<PathBuf>, CopyError> {
    match source {
        CopySource::Tree { root } => {
            if !root.is_dir() {
                return Err(CopyError::MissingSource(root.clone()));
            }

            let mut files = Vec::new();
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.map_err(|e| CopyError::Io {
                    path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                    source: e.into(),
                })?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Ok(files)
        }
        CopySource::Files { files } => {
            for file in files {
                if !file.is_file() {
                    return Err(CopyError::MissingSource(file.clone()));
                }
            }
            Ok(files.clone())
        }
    }
}

fn read_text(path: &Path) -> Result<String, CopyError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::InvalidData {
            CopyError::NotUtf8(path.to_path_buf())
        } else {
            CopyError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::rule::Rename;

    use super::*;

    fn write(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn later_rule_replaces_earlier_destination() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let script = vendor.path().join("web/viewer.mjs");
        write(&script, b"a();validateFileURL(file);b();");

        let rename = Rename::relative_to(vendor.path());
        let rules = vec![
            CopyRule::tree(vendor.path(), "pdfjs", rename.clone()),
            CopyRule::file(
                &script,
                "pdfjs",
                Transform::StripCrossOriginCheck { enabled: true },
                rename,
            ),
        ];

        let plan = CopyPlan::from_rules(&rules, out.path()).unwrap();
        assert_eq!(plan.entries().len(), 1);
        let entry = plan.get(&out.path().join("pdfjs").join("web/viewer.mjs")).unwrap();
        assert_eq!(entry.rule_index, 1);

        let report = plan.execute(PatchMode::Lenient).unwrap();
        assert_eq!(report.overridden, 1);
        assert_eq!(report.patched, 1);
        assert_eq!(
            std::fs::read_to_string(out.path().join("pdfjs/web/viewer.mjs")).unwrap(),
            "a();b();"
        );
    }

    #[test]
    fn registration_order_decides_the_winner() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let script = vendor.path().join("web/viewer.mjs");
        write(&script, b"a();validateFileURL(file);b();");

        // Patch first, bulk copy last: the verbatim copy wins.
        let rename = Rename::relative_to(vendor.path());
        let rules = vec![
            CopyRule::file(
                &script,
                "pdfjs",
                Transform::StripCrossOriginCheck { enabled: true },
                rename.clone(),
            ),
            CopyRule::tree(vendor.path(), "pdfjs", rename),
        ];

        let report = CopyPlan::from_rules(&rules, out.path())
            .unwrap()
            .execute(PatchMode::Lenient)
            .unwrap();
        assert_eq!(report.patched, 0);
        assert_eq!(
            std::fs::read_to_string(out.path().join("pdfjs/web/viewer.mjs")).unwrap(),
            "a();validateFileURL(file);b();"
        );
    }

    #[test]
    fn binary_files_are_copied_verbatim() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let bytes = [0u8, 159, 146, 150, 255];
        write(&vendor.path().join("web/cmaps/78-H.bcmap"), &bytes);

        let rules = vec![CopyRule::tree(
            vendor.path(),
            "pdfjs",
            Rename::relative_to(vendor.path()),
        )];
        CopyPlan::from_rules(&rules, out.path())
            .unwrap()
            .execute(PatchMode::Lenient)
            .unwrap();

        assert_eq!(
            std::fs::read(out.path().join("pdfjs/web/cmaps/78-H.bcmap")).unwrap(),
            bytes
        );
    }

    #[test]
    fn missing_patch_target_file_is_an_error() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let rules = vec![CopyRule::file(
            vendor.path().join("web/viewer.mjs"),
            "pdfjs",
            Transform::StripCrossOriginCheck { enabled: false },
            Rename::relative_to(vendor.path()),
        )];
        let err = CopyPlan::from_rules(&rules, out.path()).unwrap_err();
        assert!(matches!(err, CopyError::MissingSource(_)));
    }

    #[test]
    fn missing_tree_root_is_an_error() {
        let out = tempfile::tempdir().unwrap();
        let root = out.path().join("not-fetched");
        let rules = vec![CopyRule::tree(&root, "pdfjs", Rename::relative_to(&root))];
        let err = CopyPlan::from_rules(&rules, out.path()).unwrap_err();
        assert!(matches!(err, CopyError::MissingSource(p) if p == root));
    }

    #[test]
    fn file_outside_rename_root_is_rejected() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let stray = vendor.path().join("stray.js");
        write(&stray, b"x");

        let rules = vec![CopyRule::file(
            &stray,
            "pdfjs",
            Transform::StripCrossOriginCheck { enabled: false },
            Rename::relative_to(vendor.path().join("web")),
        )];
        let err = CopyPlan::from_rules(&rules, out.path()).unwrap_err();
        assert!(matches!(err, CopyError::OutsideRoot { .. }));
    }

    #[test]
    fn non_utf8_patch_source_is_reported() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let html = vendor.path().join("web/viewer.html");
        write(&html, &[0xff, 0xfe, 0x00]);

        let rules = vec![CopyRule::file(
            &html,
            "pdfjs",
            Transform::InjectViewerConfig {
                options: Default::default(),
                open_options: Default::default(),
            },
            Rename::relative_to(vendor.path()),
        )];
        let err = CopyPlan::from_rules(&rules, out.path())
            .unwrap()
            .execute(PatchMode::Lenient)
            .unwrap_err();
        assert!(matches!(err, CopyError::NotUtf8(_)));
    }

    #[test]
    fn destination_must_stay_inside_output_dir() {
        let vendor = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(&vendor.path().join("LICENSE"), b"Apache-2.0");

        for dest in ["../escape", "pdfjs/../../escape", "/var/www/pdfjs"] {
            let rules = vec![CopyRule::tree(
                vendor.path(),
                dest,
                Rename::relative_to(vendor.path()),
            )];
            let err = CopyPlan::from_rules(&rules, out.path()).unwrap_err();
            assert!(
                matches!(&err, CopyError::InvalidDestination(d) if d == dest),
                "{dest}: {err}"
            );
        }
        assert!(!out.path().parent().unwrap().join("escape").exists());

        let rules = vec![CopyRule::tree(
            vendor.path(),
            "./static/pdfjs",
            Rename::relative_to(vendor.path()),
        )];
        CopyPlan::from_rules(&rules, out.path())
            .unwrap()
            .execute(PatchMode::Lenient)
            .unwrap();
        assert!(out.path().join("static/pdfjs/LICENSE").is_file());
    }
}
