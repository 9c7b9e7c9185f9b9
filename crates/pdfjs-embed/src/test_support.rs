use tempfile::TempDir;

use crate::layout::{VIEWER_HTML, VIEWER_SCRIPT, Variant, VendorLayout};

/// Minimal stand-in for `web/viewer.mjs`.
pub const SAMPLE_VIEWER_SCRIPT: &str = "const file = params.get(\"file\");\ntry {\n  validateFileURL(file);\n} catch (e) {}\nPDFViewerApplication.run();\n";

/// Minimal stand-in for `web/viewer.html`.
pub const SAMPLE_VIEWER_HTML: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>PDF.js viewer</title>\n<script src=\"viewer.mjs\" type=\"module\"></script>\n</head>\n<body></body>\n</html>\n";

/// A vendor directory in a temp dir, populated like an unpacked release.
pub struct VendorFixture {
    dir: TempDir,
}

impl VendorFixture {
    /// Both variants with the viewer files, a build file and a cmap.
    pub fn new() -> Self {
        let fixture = Self::empty();
        for variant in Variant::ALL {
            fixture.write(variant, VIEWER_SCRIPT, SAMPLE_VIEWER_SCRIPT.as_bytes());
            fixture.write(variant, VIEWER_HTML, SAMPLE_VIEWER_HTML.as_bytes());
            fixture.write(variant, "build/pdf.mjs", format!("// {variant} build\n").as_bytes());
            fixture.write(variant, "web/cmaps/78-H.bcmap", &[0xe0, 0x01, 0xff]);
        }
        fixture
    }

    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create vendor temp dir"),
        }
    }

    pub fn layout(&self) -> VendorLayout {
        VendorLayout::new(self.dir.path())
    }

    /// Write `relative` under the variant directory, creating parents.
    pub fn write(&self, variant: Variant, relative: &str, content: &[u8]) {
        let path = self.layout().variant_dir(variant).join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
    }
}

impl Default for VendorFixture {
    fn default() -> Self {
        Self::new()
    }
}
